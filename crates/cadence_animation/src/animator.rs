//! Step sequencing
//!
//! An [`Animator`] walks an ordered list of [`Step`]s, writing tweened
//! values into its target as time advances. It is driven by the host loop
//! calling [`Animator::update`] once per frame with the frame delta.
//!
//! A single update may cross several steps: whatever time is left over
//! when a step completes (the overshoot) is carried into the next one, so
//! playback stays time-accurate at low frame rates.

use crate::easing::Easing;
use crate::step::{Action, FieldTweens, Step};
use crate::target::TweenTarget;
use crate::tween::Tween;

/// Upper bound on step transitions handled within one `update` call.
///
/// Only reachable when a looping sequence consumes no time (all callbacks
/// or zero-length tweens).
pub const MAX_ADVANCES_PER_UPDATE: usize = 1024;

/// Observable playback state, derived from the animator's flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not started, or reset
    Idle,
    Playing,
    /// Started, then stopped; `start` resumes
    Stopped,
    /// Ran past the last step without looping, or terminated.
    /// Only `reset` leaves this state.
    Finished,
}

/// Plays a sequence of steps against a target record
pub struct Animator<T: TweenTarget> {
    target: T,
    steps: Vec<Step<T::Field>>,
    current_step: usize,
    /// Seconds since the current step started
    elapsed: f32,
    started: bool,
    stopped: bool,
    finished: bool,
    looping: bool,
    /// Completed passes through the sequence in loop mode
    cycles: u32,
}

impl<T: TweenTarget> Animator<T> {
    /// Create an animator. With `start` set it plays on the first update.
    pub fn new(target: T, steps: Vec<Step<T::Field>>, start: bool, looping: bool) -> Self {
        Self {
            target,
            steps,
            current_step: 0,
            elapsed: 0.0,
            started: start,
            stopped: false,
            finished: false,
            looping,
            cycles: 0,
        }
    }

    /// Create a builder for an animator over `target`
    pub fn builder(target: T) -> AnimatorBuilder<T> {
        AnimatorBuilder::new(target)
    }

    /// Advance playback by `dt` seconds.
    ///
    /// Does nothing unless playing. Negative deltas count as zero.
    pub fn update(&mut self, dt: f32) {
        if !self.is_playing() {
            return;
        }
        if self.steps.is_empty() {
            tracing::debug!("empty sequence, finishing");
            self.finish();
            return;
        }

        self.elapsed += if dt.is_nan() { 0.0 } else { dt.max(0.0) };

        for _ in 0..MAX_ADVANCES_PER_UPDATE {
            if !self.advance() || !self.is_playing() {
                return;
            }
        }

        tracing::warn!(
            step = self.current_step,
            limit = MAX_ADVANCES_PER_UPDATE,
            "step advance limit reached, deferring to next frame"
        );
    }

    /// Evaluate the current step. Returns true if playback moved on.
    fn advance(&mut self) -> bool {
        let elapsed = self.elapsed;
        let Some(step) = self.steps.get_mut(self.current_step) else {
            self.finish();
            return false;
        };

        let overshoot = match step {
            Step::Delay(duration) => {
                if elapsed <= *duration {
                    return false;
                }
                *duration
            }
            Step::Callback(action) => {
                action();
                0.0
            }
            Step::Tween(fields) => {
                let mut all_done = true;
                let mut longest_done = 0.0_f32;
                for (field, tween) in fields.iter() {
                    let x = tween.progress(elapsed);
                    self.target.write(field, tween.value_at(x));
                    if x >= 1.0 {
                        longest_done = longest_done.max(tween.duration());
                    } else {
                        all_done = false;
                    }
                }
                if !all_done {
                    return false;
                }
                longest_done
            }
        };

        self.skip(overshoot, false);
        true
    }

    /// Move to the next step, carrying `elapsed - overshoot` into it
    /// (nothing when `forced`). Entering a tween step writes every field's
    /// starting value.
    fn skip(&mut self, overshoot: f32, forced: bool) {
        self.current_step += 1;
        let carried = if forced {
            0.0
        } else {
            (self.elapsed - overshoot).max(0.0)
        };

        if self.current_step >= self.steps.len() {
            if !self.looping {
                tracing::debug!("sequence complete");
                self.finish();
                return;
            }
            self.reset();
            self.started = true;
            self.cycles = self.cycles.saturating_add(1);
            tracing::debug!(cycles = self.cycles, "sequence looped");
        }

        self.elapsed = carried;
        tracing::trace!(step = self.current_step, carried, "entered step");

        if let Some(Step::Tween(fields)) = self.steps.get(self.current_step) {
            for (field, tween) in fields.iter() {
                self.target.write(field, tween.from());
            }
        }
    }

    fn finish(&mut self) {
        self.reset();
        self.finished = true;
    }

    /// Begin or resume playback. Ignored once finished.
    pub fn start(&mut self) {
        if !self.finished {
            self.started = true;
            self.stopped = false;
        }
    }

    /// Pause playback; `update` is a no-op until `start` or `reset`.
    /// Ignored once finished.
    pub fn stop(&mut self) {
        if !self.finished {
            self.stopped = true;
        }
    }

    /// Rewind to the first step in the idle state. Field values are left as
    /// they are.
    pub fn reset(&mut self) {
        self.started = false;
        self.stopped = false;
        self.finished = false;
        self.current_step = 0;
        self.elapsed = 0.0;
    }

    /// Abandon the current step and enter the next one from its start.
    pub fn skip_step(&mut self) {
        if self.is_playing() && !self.steps.is_empty() {
            self.skip(0.0, true);
        }
    }

    /// End playback immediately.
    ///
    /// Unless `forced`, every step from the current one to the end is
    /// settled first: callbacks run and tweened fields are written back to
    /// their starting values, so the target never keeps a half-played
    /// value. A forced termination skips all of that.
    pub fn terminate(&mut self, forced: bool) {
        if self.finished {
            return;
        }

        if !forced {
            let start = self.current_step;
            for step in self.steps.iter_mut().skip(start) {
                match step {
                    Step::Callback(action) => action(),
                    Step::Tween(fields) => {
                        for (field, tween) in fields.iter() {
                            self.target.write(field, tween.from());
                        }
                    }
                    Step::Delay(_) => {}
                }
            }
        }

        tracing::debug!(forced, step = self.current_step, "terminated");
        self.started = false;
        self.finished = true;
    }

    pub fn state(&self) -> PlaybackState {
        if self.finished {
            PlaybackState::Finished
        } else if !self.started {
            PlaybackState::Idle
        } else if self.stopped {
            PlaybackState::Stopped
        } else {
            PlaybackState::Playing
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Index of the step being played
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Seconds spent in the current step
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn completed_cycles(&self) -> u32 {
        self.cycles
    }

    pub fn steps(&self) -> &[Step<T::Field>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }
}

/// Fluent construction of an [`Animator`]
///
/// # Example
///
/// ```rust
/// use cadence_animation::{tween, Animator, FieldMap};
///
/// let mut anim = Animator::builder(FieldMap::new())
///     .tween("x".to_string(), tween(0.0, 100.0, 1.0, "rcube"))
///     .delay(0.5)
///     .then(|| println!("done"))
///     .start()
///     .build();
///
/// anim.update(0.5);
/// assert!(anim.target().get("x").unwrap() > 50.0);
/// ```
pub struct AnimatorBuilder<T: TweenTarget> {
    target: T,
    steps: Vec<Step<T::Field>>,
    start: bool,
    looping: bool,
}

impl<T: TweenTarget> AnimatorBuilder<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            steps: Vec::new(),
            start: false,
            looping: false,
        }
    }

    /// Append a step tweening a single field
    pub fn tween(self, field: T::Field, tween: Tween) -> Self {
        self.tweens([(field, tween)])
    }

    /// Append a step tweening several fields at once
    pub fn tweens(mut self, fields: impl IntoIterator<Item = (T::Field, Tween)>) -> Self {
        self.steps
            .push(Step::Tween(fields.into_iter().collect::<FieldTweens<_>>()));
        self
    }

    /// Append a tween step using an explicit curve
    pub fn tween_to(self, field: T::Field, from: f32, to: f32, secs: f32, easing: Easing) -> Self {
        self.tween(field, Tween::from_to_in(from, to, secs, easing))
    }

    /// Append a delay step
    pub fn delay(mut self, secs: f32) -> Self {
        self.steps.push(Step::delay(secs));
        self
    }

    /// Append a callback step
    pub fn then<A: FnMut() + Send + 'static>(mut self, action: A) -> Self {
        self.steps.push(Step::Callback(Box::new(action) as Action));
        self
    }

    /// Append any step
    pub fn step(mut self, step: Step<T::Field>) -> Self {
        self.steps.push(step);
        self
    }

    /// Replay the sequence indefinitely
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Play on the first update
    pub fn start(mut self) -> Self {
        self.start = true;
        self
    }

    pub fn build(self) -> Animator<T> {
        Animator::new(self.target, self.steps, self.start, self.looping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::FieldMap;
    use crate::tween::tween;
    use std::sync::{Arc, Mutex};

    fn name(s: &str) -> String {
        s.to_string()
    }

    fn counter() -> (Arc<Mutex<u32>>, impl FnMut() + Send + 'static) {
        let count = Arc::new(Mutex::new(0));
        let count_clone = count.clone();
        (count, move || *count_clone.lock().unwrap() += 1)
    }

    fn x_of(anim: &Animator<FieldMap>) -> f32 {
        anim.target().get("x").unwrap()
    }

    #[test]
    fn test_single_tween_reaches_target() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(0.5);
        assert_eq!(x_of(&anim), 5.0);
        assert_eq!(anim.state(), PlaybackState::Playing);

        anim.update(0.5);
        assert_eq!(x_of(&anim), 10.0);
        assert_eq!(anim.state(), PlaybackState::Finished);
        assert_eq!(anim.current_step(), 0);
        assert_eq!(anim.elapsed(), 0.0);
    }

    #[test]
    fn test_overshoot_carries_into_next_step() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .tween(name("x"), tween(10.0, 20.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(1.5);
        assert_eq!(anim.current_step(), 1);
        assert_eq!(anim.elapsed(), 0.5);
        assert_eq!(x_of(&anim), 15.0);
    }

    #[test]
    fn test_one_update_can_run_whole_sequence() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .tween(name("x"), tween(10.0, 20.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(2.5);
        assert!(anim.is_finished());
        assert_eq!(x_of(&anim), 20.0);
    }

    #[test]
    fn test_longest_field_sets_overshoot() {
        let mut anim = Animator::builder(FieldMap::new())
            .tweens([
                (name("a"), tween(0.0, 1.0, 0.5, "linear")),
                (name("b"), tween(0.0, 1.0, 1.0, "linear")),
            ])
            .tween(name("x"), tween(0.0, 4.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(0.75);
        assert_eq!(anim.current_step(), 0);
        assert_eq!(anim.target().get("a"), Some(1.0));
        assert_eq!(anim.target().get("b"), Some(0.75));

        anim.update(0.5);
        assert_eq!(anim.current_step(), 1);
        assert_eq!(anim.elapsed(), 0.25);
        assert_eq!(anim.target().get("b"), Some(1.0));
        assert_eq!(x_of(&anim), 1.0);
    }

    #[test]
    fn test_terminate_restores_baseline_and_fires_callbacks() {
        let (count, action) = counter();
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .then(action)
            .start()
            .build();

        anim.update(0.5);
        assert_eq!(x_of(&anim), 5.0);

        anim.terminate(false);
        assert_eq!(x_of(&anim), 0.0);
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(anim.state(), PlaybackState::Finished);

        // already finished, nothing fires again
        anim.terminate(false);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_forced_terminate_skips_cleanup() {
        let (count, action) = counter();
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .then(action)
            .start()
            .build();

        anim.update(0.5);
        anim.terminate(true);
        assert_eq!(x_of(&anim), 5.0);
        assert_eq!(*count.lock().unwrap(), 0);
        assert!(anim.is_finished());

        anim.update(1.0);
        assert_eq!(x_of(&anim), 5.0);
    }

    #[test]
    fn test_loop_never_finishes() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .looping()
            .start()
            .build();

        for cycle in 1..=5 {
            anim.update(1.0);
            assert!(!anim.is_finished());
            assert_eq!(anim.state(), PlaybackState::Playing);
            assert_eq!(anim.current_step(), 0);
            assert_eq!(anim.completed_cycles(), cycle);
            // restarted at the baseline
            assert_eq!(x_of(&anim), 0.0);
        }
    }

    #[test]
    fn test_loop_carries_overshoot_into_first_step() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .looping()
            .start()
            .build();

        anim.update(1.25);
        assert_eq!(anim.current_step(), 0);
        assert_eq!(anim.elapsed(), 0.25);
        assert_eq!(x_of(&anim), 2.5);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .tween(name("x"), tween(10.0, 0.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(1.5);
        anim.stop();

        for _ in 0..2 {
            anim.reset();
            assert!(!anim.is_started());
            assert!(!anim.is_stopped());
            assert!(!anim.is_finished());
            assert_eq!(anim.current_step(), 0);
            assert_eq!(anim.elapsed(), 0.0);
            assert_eq!(anim.state(), PlaybackState::Idle);
        }

        // field values are not restored
        assert_eq!(x_of(&anim), 5.0);
    }

    #[test]
    fn test_zero_duration_tween_completes_on_zero_dt() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 1.0, 0.0, "linear"))
            .start()
            .build();

        anim.update(0.0);
        assert_eq!(x_of(&anim), 1.0);
        assert!(anim.is_finished());
    }

    #[test]
    fn test_delay_waits_strictly_past_duration() {
        let mut anim = Animator::builder(FieldMap::new())
            .delay(1.0)
            .tween(name("x"), tween(0.0, 8.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(1.0);
        assert_eq!(anim.current_step(), 0);
        assert_eq!(anim.target().get("x"), None);

        anim.update(0.25);
        assert_eq!(anim.current_step(), 1);
        assert_eq!(anim.elapsed(), 0.25);
        assert_eq!(x_of(&anim), 2.0);
    }

    #[test]
    fn test_callback_runs_once_and_takes_no_time() {
        let (count, action) = counter();
        let mut anim = Animator::builder(FieldMap::new())
            .then(action)
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(0.5);
        anim.update(0.25);
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(x_of(&anim), 7.5);
    }

    #[test]
    fn test_entering_step_writes_from_values() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .tween(name("y"), tween(100.0, 200.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(0.5);
        assert_eq!(anim.target().get("y"), None);

        anim.update(0.5);
        assert_eq!(anim.current_step(), 1);
        assert_eq!(anim.target().get("y"), Some(100.0));
    }

    #[test]
    fn test_stop_and_resume() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(0.25);
        anim.stop();
        assert_eq!(anim.state(), PlaybackState::Stopped);
        anim.update(0.5);
        assert_eq!(x_of(&anim), 2.5);

        anim.start();
        assert!(!anim.is_stopped());
        anim.update(0.5);
        assert_eq!(x_of(&anim), 7.5);
    }

    #[test]
    fn test_not_started_ignores_updates() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .build();

        anim.update(0.5);
        assert_eq!(anim.state(), PlaybackState::Idle);
        assert!(anim.target().is_empty());

        anim.start();
        anim.update(0.5);
        assert_eq!(x_of(&anim), 5.0);
    }

    #[test]
    fn test_start_after_finish_needs_reset() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(1.0);
        anim.start();
        assert_eq!(anim.state(), PlaybackState::Finished);

        anim.reset();
        anim.start();
        anim.update(0.5);
        assert_eq!(x_of(&anim), 5.0);
    }

    #[test]
    fn test_empty_sequence_finishes() {
        let mut anim: Animator<FieldMap> = Animator::new(FieldMap::new(), Vec::new(), true, true);
        anim.update(1.0);
        assert!(anim.is_finished());
        assert!(anim.is_empty());
    }

    #[test]
    fn test_zero_time_loop_is_bounded() {
        let (count, action) = counter();
        let mut anim = Animator::builder(FieldMap::new())
            .then(action)
            .looping()
            .start()
            .build();

        anim.update(0.0);
        assert_eq!(*count.lock().unwrap() as usize, MAX_ADVANCES_PER_UPDATE);
        assert!(anim.is_playing());
    }

    #[test]
    fn test_skip_step_starts_next_step_fresh() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .tween(name("y"), tween(3.0, 6.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(0.5);
        anim.skip_step();
        assert_eq!(anim.current_step(), 1);
        assert_eq!(anim.elapsed(), 0.0);
        assert_eq!(anim.target().get("y"), Some(3.0));
        assert_eq!(x_of(&anim), 5.0);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut anim = Animator::builder(FieldMap::new())
            .tween(name("x"), tween(0.0, 10.0, 1.0, "linear"))
            .start()
            .build();

        anim.update(0.5);
        anim.update(-1.0);
        assert_eq!(anim.elapsed(), 0.5);
        assert_eq!(x_of(&anim), 5.0);
    }
}
