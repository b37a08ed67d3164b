//! Cadence Animation
//!
//! Tween sequencing: play an ordered list of steps against a record of
//! numeric fields, one frame at a time.
//!
//! # Features
//!
//! - **Field tweens**: several fields per step, each with its own duration
//!   and easing curve
//! - **Callbacks and delays**: zero-time actions and pauses between tweens
//! - **Overshoot carry**: one frame can cross several short steps without
//!   losing time
//! - **Looping and termination**: replay forever, or end early while
//!   restoring untouched fields
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{tween, Animator, FieldMap, PlaybackState};
//!
//! let mut anim = Animator::builder(FieldMap::new().with("x", 0.0))
//!     .tween("x".to_string(), tween(0.0, 10.0, 1.0, "linear"))
//!     .tween("x".to_string(), tween(10.0, 20.0, 1.0, "linear"))
//!     .start()
//!     .build();
//!
//! anim.update(1.5);
//! assert_eq!(anim.current_step(), 1);
//! assert_eq!(anim.target().get("x"), Some(15.0));
//!
//! anim.update(1.0);
//! assert_eq!(anim.state(), PlaybackState::Finished);
//! ```

pub mod animator;
pub mod easing;
pub mod error;
pub mod scheduler;
pub mod step;
pub mod target;
pub mod tween;

pub use animator::{Animator, AnimatorBuilder, PlaybackState, MAX_ADVANCES_PER_UPDATE};
pub use easing::Easing;
pub use error::{Result, TweenError};
pub use scheduler::{AnimationScheduler, AnimatorId, Playback};
pub use step::{Action, FieldTweens, Step};
pub use target::{FieldMap, TweenTarget};
pub use tween::{tween, Tween};
