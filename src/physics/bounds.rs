//! Bounded quantities
//!
//! Physical saturation limits are expressed as a closed interval
//! `[lower, upper]`. Clamping is a min/max composition: continuous, but
//! not differentiable where the value crosses either limit. Integrators
//! near saturation see a kink in the right-hand side, which is why the
//! saturation state is exposed rather than hidden in inline comparisons.

use std::fmt;

/// Where a raw value sits relative to a [`ClosedRange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saturation {
    /// Below the lower limit (clamped up)
    Lower,
    /// Inside the interval (passed through)
    Interior,
    /// Above the upper limit (clamped down)
    Upper,
}

impl Saturation {
    /// True when the value was clamped
    pub fn is_saturated(self) -> bool {
        self != Saturation::Interior
    }
}

/// Closed interval `[lower, upper]` used to clamp derived quantities
///
/// # Example
///
/// ```rust
/// use membrane_rs::physics::{ClosedRange, Saturation};
///
/// let range = ClosedRange::new(0.0, 2.0);
/// assert_eq!(range.clamp(-1.0), 0.0);
/// assert_eq!(range.clamp(1.5), 1.5);
/// assert_eq!(range.clamp(3.0), 2.0);
/// assert_eq!(range.saturation(3.0), Saturation::Upper);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedRange {
    lower: f64,
    upper: f64,
}

impl ClosedRange {
    /// Create a range
    ///
    /// An inverted pair (`upper < lower`) collapses to the single point
    /// `lower`, so that `clamp` never panics the way `f64::clamp` does.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper: upper.max(lower),
        }
    }

    /// Range `[0, upper]`
    pub fn non_negative(upper: f64) -> Self {
        Self::new(0.0, upper)
    }

    /// Lower limit
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper limit
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Width of the interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Restrict `value` to the interval with `min(max(value, lower), upper)`
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }

    /// Classify `value` against the limits
    pub fn saturation(&self, value: f64) -> Saturation {
        if value < self.lower {
            Saturation::Lower
        } else if value > self.upper {
            Saturation::Upper
        } else {
            Saturation::Interior
        }
    }

    /// Whether `value` lies in the closed interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl fmt::Display for ClosedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
