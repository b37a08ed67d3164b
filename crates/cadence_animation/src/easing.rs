//! Easing functions for tweens
//!
//! Every curve maps normalized progress `x` in `0.0..=1.0` to an eased
//! progress. Curves are not required to stay inside `0.0..=1.0` (`Fse`
//! slightly overshoots both ends), so callers must not clamp the result.

use std::str::FromStr;

use crate::error::TweenError;

/// Easing function type
#[derive(Clone, Copy, Debug, Default)]
pub enum Easing {
    /// `x`
    #[default]
    Linear,
    /// `x³`, slow start
    Cube,
    /// `(x - 1)³ + 1`, slow finish
    RCube,
    /// Tangent ease: `(tan(2.5x - 1.25) + 3) / 6`, fast at both ends and
    /// flat through the middle
    Fse,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    CubicBezier(f32, f32, f32, f32),
    /// Caller-supplied pure curve
    Custom(fn(f32) -> f32),
}

impl Easing {
    /// Named presets accepted by [`Easing::from_name`], in display order.
    pub const PRESETS: &'static [(&'static str, Easing)] = &[
        ("linear", Easing::Linear),
        ("cube", Easing::Cube),
        ("rcube", Easing::RCube),
        ("fse", Easing::Fse),
        ("ease-in-quad", Easing::EaseInQuad),
        ("ease-out-quad", Easing::EaseOutQuad),
        ("ease-in-out-quad", Easing::EaseInOutQuad),
        ("ease-in-out-cubic", Easing::EaseInOutCubic),
        ("ease-in-quart", Easing::EaseInQuart),
        ("ease-out-quart", Easing::EaseOutQuart),
        ("ease-in-out-quart", Easing::EaseInOutQuart),
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            Easing::Linear => x,
            Easing::Cube => x * x * x,
            Easing::RCube => (x - 1.0).powi(3) + 1.0,
            Easing::Fse => ((x * 2.5 - 1.25).tan() + 3.0) / 6.0,
            Easing::EaseInQuad => x * x,
            Easing::EaseOutQuad => 1.0 - (1.0 - x) * (1.0 - x),
            Easing::EaseInOutQuad => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInOutCubic => {
                if x < 0.5 {
                    4.0 * x * x * x
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => x * x * x * x,
            Easing::EaseOutQuart => 1.0 - (1.0 - x).powi(4),
            Easing::EaseInOutQuart => {
                if x < 0.5 {
                    8.0 * x * x * x * x
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(4) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(x, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(x),
        }
    }

    /// Resolve a preset by name, falling back to [`Easing::Linear`] for
    /// anything unknown.
    ///
    /// Matching ignores ASCII case and treats `_` like `-`. The common
    /// aliases `ease-in`, `ease-out`, `ease-in-out` and the `*-cubic`
    /// spellings map onto `Cube`, `RCube` and `EaseInOutCubic`.
    pub fn from_name(name: &str) -> Easing {
        lookup(name).unwrap_or_else(|| {
            tracing::debug!(name, "unknown easing preset, using linear");
            Easing::Linear
        })
    }

    /// Preset name for this curve, `None` for bezier and custom curves.
    pub fn name(&self) -> Option<&'static str> {
        Self::PRESETS
            .iter()
            .find(|(_, easing)| same_preset(easing, self))
            .map(|(name, _)| *name)
    }
}

impl FromStr for Easing {
    type Err = TweenError;

    /// Strict lookup: unknown names are an error instead of `Linear`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s).ok_or_else(|| TweenError::UnknownEasing(s.to_string()))
    }
}

fn lookup(name: &str) -> Option<Easing> {
    let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
    let easing = match normalized.as_str() {
        "ease-in" | "ease-in-cubic" => Easing::Cube,
        "ease-out" | "ease-out-cubic" => Easing::RCube,
        "ease-in-out" => Easing::EaseInOutCubic,
        other => {
            return Easing::PRESETS
                .iter()
                .find(|(preset, _)| *preset == other)
                .map(|(_, easing)| *easing)
        }
    };
    Some(easing)
}

fn same_preset(a: &Easing, b: &Easing) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
        && !matches!(a, Easing::CubicBezier(..) | Easing::Custom(_))
}

/// Cubic bezier easing calculation (matches CSS `cubic-bezier()` as browsers implement it).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
/// Computes in f64 internally to avoid f32 precision jitter at high frame rates.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t as f64;
    let x1 = x1 as f64;
    let y1 = y1 as f64;
    let x2 = x2 as f64;
    let y2 = y2 as f64;

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
