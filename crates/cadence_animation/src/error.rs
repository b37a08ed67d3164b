//! Tween construction errors
//!
//! Playback itself never fails. These errors only come out of the strict
//! construction paths used when a sequence is described by data.

use thiserror::Error;

/// Errors from strict tween and easing construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// Easing preset name not recognized
    #[error("unknown easing preset: {0:?}")]
    UnknownEasing(String),

    /// Duration is negative, NaN or infinite
    #[error("invalid duration: {0} (must be finite and non-negative)")]
    InvalidDuration(f32),

    /// A tween step was declared without any fields
    #[error("tween step has no fields")]
    EmptyTweenStep,
}

/// Result type for tween construction
pub type Result<T> = std::result::Result<T, TweenError>;
