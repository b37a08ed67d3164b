//! Records that an animator writes into
//!
//! A target exposes its numeric fields through a typed key instead of
//! reflection. Plain structs usually implement [`TweenTarget`] with a small
//! field enum:
//!
//! ```rust
//! use cadence_animation::TweenTarget;
//!
//! struct Sprite {
//!     x: f32,
//!     alpha: f32,
//! }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum SpriteField {
//!     X,
//!     Alpha,
//! }
//!
//! impl TweenTarget for Sprite {
//!     type Field = SpriteField;
//!
//!     fn write(&mut self, field: &SpriteField, value: f32) {
//!         match field {
//!             SpriteField::X => self.x = value,
//!             SpriteField::Alpha => self.alpha = value,
//!         }
//!     }
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// A mutable record of named numeric fields
pub trait TweenTarget {
    /// Key naming one numeric field of the record
    type Field: Clone + PartialEq + fmt::Debug;

    /// Store `value` into `field`.
    ///
    /// Writes to fields the record does not have should be ignored rather
    /// than panic.
    fn write(&mut self, field: &Self::Field, value: f32);
}

impl<T: TweenTarget + ?Sized> TweenTarget for &mut T {
    type Field = T::Field;

    fn write(&mut self, field: &Self::Field, value: f32) {
        (**self).write(field, value);
    }
}

/// Shared record, for several animators driving one object.
///
/// Writes from different animators are not arbitrated: the last write in a
/// frame wins.
impl<T: TweenTarget> TweenTarget for Rc<RefCell<T>> {
    type Field = T::Field;

    fn write(&mut self, field: &Self::Field, value: f32) {
        self.borrow_mut().write(field, value);
    }
}

/// Indexed record; out-of-range indices are ignored.
impl TweenTarget for Vec<f32> {
    type Field = usize;

    fn write(&mut self, field: &usize, value: f32) {
        if let Some(slot) = self.get_mut(*field) {
            *slot = value;
        }
    }
}

/// A flat record mapping field names to values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap {
    values: FxHashMap<String, f32>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a field
    pub fn with(mut self, name: impl Into<String>, value: f32) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f32) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over fields sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        let mut entries: Vec<_> = self
            .values
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

/// Writing a field the map does not have yet inserts it.
impl TweenTarget for FieldMap {
    type Field = String;

    fn write(&mut self, field: &String, value: f32) {
        match self.values.get_mut(field) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(field.clone(), value);
            }
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
