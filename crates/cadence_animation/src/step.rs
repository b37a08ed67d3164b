//! Sequence steps

use std::fmt;

use smallvec::SmallVec;

use crate::tween::Tween;

/// An action run when a callback step is reached
pub type Action = Box<dyn FnMut() + Send>;

/// One unit of a playback sequence
pub enum Step<F> {
    /// Fields tweened concurrently; done when every field reaches progress 1
    Tween(FieldTweens<F>),
    /// Invoked once when reached, takes no time
    Callback(Action),
    /// Wait, in seconds
    Delay(f32),
}

impl<F> Step<F> {
    /// Create a tween step from `(field, tween)` pairs
    pub fn tween(fields: impl IntoIterator<Item = (F, Tween)>) -> Self
    where
        F: PartialEq,
    {
        Step::Tween(fields.into_iter().collect())
    }

    /// Create a callback step
    pub fn callback<A: FnMut() + Send + 'static>(action: A) -> Self {
        Step::Callback(Box::new(action))
    }

    /// Create a delay step. Negative or NaN durations become `0.0`.
    pub fn delay(seconds: f32) -> Self {
        Step::Delay(if seconds.is_nan() { 0.0 } else { seconds.max(0.0) })
    }

    /// Time this step takes at most, `0.0` for callbacks
    pub fn duration(&self) -> f32 {
        match self {
            Step::Tween(fields) => fields.duration(),
            Step::Callback(_) => 0.0,
            Step::Delay(d) => *d,
        }
    }
}

impl<F: fmt::Debug> fmt::Debug for Step<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Tween(fields) => f.debug_tuple("Tween").field(fields).finish(),
            Step::Callback(_) => f.write_str("Callback"),
            Step::Delay(d) => f.debug_tuple("Delay").field(d).finish(),
        }
    }
}

/// Field tweens of one step, unique by field
#[derive(Clone, Debug)]
pub struct FieldTweens<F> {
    entries: SmallVec<[(F, Tween); 4]>,
}

impl<F> FieldTweens<F> {
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Add a field tween. A field that is already present has its tween
    /// replaced in place.
    pub fn insert(&mut self, field: F, tween: Tween)
    where
        F: PartialEq,
    {
        match self.entries.iter_mut().find(|(existing, _)| *existing == field) {
            Some(entry) => entry.1 = tween,
            None => self.entries.push((field, tween)),
        }
    }

    /// Builder: add a field tween
    pub fn with(mut self, field: F, tween: Tween) -> Self
    where
        F: PartialEq,
    {
        self.insert(field, tween);
        self
    }

    pub fn get(&self, field: &F) -> Option<&Tween>
    where
        F: PartialEq,
    {
        self.entries
            .iter()
            .find(|(existing, _)| existing == field)
            .map(|(_, tween)| tween)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&F, &Tween)> {
        self.entries.iter().map(|(field, tween)| (field, tween))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Duration of the longest field
    pub fn duration(&self) -> f32 {
        self.entries
            .iter()
            .map(|(_, tween)| tween.duration())
            .fold(0.0, f32::max)
    }
}

impl<F> Default for FieldTweens<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PartialEq> FromIterator<(F, Tween)> for FieldTweens<F> {
    fn from_iter<I: IntoIterator<Item = (F, Tween)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (field, tween) in iter {
            fields.insert(field, tween);
        }
        fields
    }
}
