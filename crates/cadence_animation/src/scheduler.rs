//! Animation scheduler
//!
//! Owns a set of animators over unrelated target types and updates them
//! all once per frame.

use crate::animator::{Animator, PlaybackState};
use crate::target::TweenTarget;
use slotmap::{new_key_type, SlotMap};
use std::time::Instant;

new_key_type! {
    pub struct AnimatorId;
}

/// Type-erased playback controls, implemented by every [`Animator`]
pub trait Playback {
    fn update(&mut self, dt: f32);
    fn start(&mut self);
    fn stop(&mut self);
    fn reset(&mut self);
    fn terminate(&mut self, forced: bool);
    fn state(&self) -> PlaybackState;
}

impl<T: TweenTarget> Playback for Animator<T> {
    fn update(&mut self, dt: f32) {
        Animator::update(self, dt);
    }

    fn start(&mut self) {
        Animator::start(self);
    }

    fn stop(&mut self) {
        Animator::stop(self);
    }

    fn reset(&mut self) {
        Animator::reset(self);
    }

    fn terminate(&mut self, forced: bool) {
        Animator::terminate(self, forced);
    }

    fn state(&self) -> PlaybackState {
        Animator::state(self)
    }
}

/// The animation scheduler that updates all registered animators
pub struct AnimationScheduler {
    animators: SlotMap<AnimatorId, Box<dyn Playback>>,
    last_frame: Instant,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            animators: SlotMap::with_key(),
            last_frame: Instant::now(),
        }
    }

    pub fn add<P: Playback + 'static>(&mut self, animator: P) -> AnimatorId {
        self.animators.insert(Box::new(animator))
    }

    pub fn remove(&mut self, id: AnimatorId) -> Option<Box<dyn Playback>> {
        self.animators.remove(id)
    }

    pub fn contains(&self, id: AnimatorId) -> bool {
        self.animators.contains_key(id)
    }

    pub fn state(&self, id: AnimatorId) -> Option<PlaybackState> {
        self.animators.get(id).map(|a| a.state())
    }

    /// Start an animator. Returns false if the id is unknown.
    pub fn start(&mut self, id: AnimatorId) -> bool {
        self.with(id, |a| a.start())
    }

    pub fn stop(&mut self, id: AnimatorId) -> bool {
        self.with(id, |a| a.stop())
    }

    pub fn reset(&mut self, id: AnimatorId) -> bool {
        self.with(id, |a| a.reset())
    }

    pub fn terminate(&mut self, id: AnimatorId, forced: bool) -> bool {
        self.with(id, |a| a.terminate(forced))
    }

    fn with(&mut self, id: AnimatorId, f: impl FnOnce(&mut dyn Playback)) -> bool {
        match self.animators.get_mut(id) {
            Some(animator) => {
                f(animator.as_mut());
                true
            }
            None => false,
        }
    }

    /// Update all animators with the wall-clock time since the last tick
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.tick_by(dt);
    }

    /// Update all animators by an explicit delta in seconds
    pub fn tick_by(&mut self, dt: f32) {
        for (_, animator) in self.animators.iter_mut() {
            animator.update(dt);
        }
    }

    /// Check if any animator is still playing
    pub fn has_active_animations(&self) -> bool {
        self.animators
            .iter()
            .any(|(_, a)| a.state() == PlaybackState::Playing)
    }

    /// Drop finished animators, returning how many were removed
    pub fn prune_finished(&mut self) -> usize {
        let before = self.animators.len();
        self.animators
            .retain(|_, a| a.state() != PlaybackState::Finished);
        let removed = before - self.animators.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned finished animators");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.animators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::FieldMap;
    use crate::tween::tween;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn one_second(looping: bool) -> (Rc<RefCell<FieldMap>>, Animator<Rc<RefCell<FieldMap>>>) {
        let record = Rc::new(RefCell::new(FieldMap::new()));
        let mut builder = Animator::builder(record.clone())
            .tween("x".to_string(), tween(0.0, 10.0, 1.0, "linear"))
            .start();
        if looping {
            builder = builder.looping();
        }
        (record, builder.build())
    }

    #[test]
    fn test_tick_updates_every_animator() {
        let mut scheduler = AnimationScheduler::new();
        let (a, anim_a) = one_second(false);
        let (b, anim_b) = one_second(true);
        scheduler.add(anim_a);
        scheduler.add(anim_b);

        scheduler.tick_by(0.5);
        assert_eq!(a.borrow().get("x"), Some(5.0));
        assert_eq!(b.borrow().get("x"), Some(5.0));
        assert!(scheduler.has_active_animations());
    }

    #[test]
    fn test_prune_finished() {
        let mut scheduler = AnimationScheduler::new();
        let (_, once) = one_second(false);
        let (_, forever) = one_second(true);
        let once_id = scheduler.add(once);
        let forever_id = scheduler.add(forever);

        scheduler.tick_by(1.0);
        assert_eq!(scheduler.state(once_id), Some(PlaybackState::Finished));
        assert_eq!(scheduler.state(forever_id), Some(PlaybackState::Playing));

        assert_eq!(scheduler.prune_finished(), 1);
        assert!(!scheduler.contains(once_id));
        assert!(scheduler.contains(forever_id));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_controls_by_id() {
        let mut scheduler = AnimationScheduler::new();
        let (record, anim) = one_second(false);
        let id = scheduler.add(anim);

        assert!(scheduler.stop(id));
        scheduler.tick_by(0.5);
        assert_eq!(record.borrow().get("x"), None);
        assert!(!scheduler.has_active_animations());

        assert!(scheduler.start(id));
        scheduler.tick_by(0.5);
        assert_eq!(record.borrow().get("x"), Some(5.0));

        assert!(scheduler.terminate(id, false));
        assert_eq!(record.borrow().get("x"), Some(0.0));
        assert_eq!(scheduler.state(id), Some(PlaybackState::Finished));

        scheduler.remove(id);
        assert!(!scheduler.start(id));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_shared_target_last_write_wins() {
        let record = Rc::new(RefCell::new(FieldMap::new()));
        let first = Animator::builder(record.clone())
            .tween("x".to_string(), tween(0.0, 10.0, 1.0, "linear"))
            .start()
            .build();
        let second = Animator::builder(record.clone())
            .tween("x".to_string(), tween(100.0, 200.0, 1.0, "linear"))
            .start()
            .build();

        let mut scheduler = AnimationScheduler::new();
        scheduler.add(first);
        scheduler.add(second);
        scheduler.tick_by(0.5);

        let x = record.borrow().get("x").unwrap();
        assert!(x == 5.0 || x == 150.0);
    }
}
