//! Feed pressure signals
//!
//! Defines how the total pressure on the feed side of the membrane varies
//! with TIME. The separator evaluates the signal at the time stamped in the
//! state metadata before every derivative evaluation.
//!
//! # Example
//!
//! ```rust
//! use membrane_rs::models::PressureSignal;
//!
//! // 1 bar, stepping to 1.5 bar at t = 5 s
//! let signal = PressureSignal::step(5.0, 1e5, 5e4);
//!
//! assert_eq!(signal.evaluate(0.0), 1e5);
//! assert_eq!(signal.evaluate(4.999), 1e5);
//! assert_eq!(signal.evaluate(5.0), 1.5e5);
//! ```

use std::sync::Arc;

/// Feed-side total pressure as a function of time [Pa]
///
/// # Types
///
/// - **Constant**: Fixed pressure for the whole run
/// - **Step**: Offset plus a height switched on at a start time
/// - **Ramp**: Offset plus a height reached linearly over a duration
/// - **Custom**: User-defined pressure history
pub enum PressureSignal {
    /// Constant pressure
    ///
    /// # Parameters
    ///
    /// - `pressure` : Feed pressure \[Pa\]
    Constant { pressure: f64 },

    /// Step change
    ///
    /// # Formula
    ///
    /// ```text
    /// P(t) = base                 t < start
    /// P(t) = base + height        t ≥ start
    /// ```
    Step { start: f64, base: f64, height: f64 },

    /// Linear ramp
    ///
    /// # Formula
    ///
    /// ```text
    /// P(t) = base + height · clamp((t - start) / duration, 0, 1)
    /// ```
    Ramp {
        start: f64,
        duration: f64,
        base: f64,
        height: f64,
    },

    /// Custom pressure history from a user function
    ///
    /// # Example
    ///
    /// ```rust
    /// use membrane_rs::models::PressureSignal;
    /// let signal = PressureSignal::custom(|t| 1e5 + 1e3 * (0.1 * t).sin());
    /// assert_eq!(signal.evaluate(0.0), 1e5);
    /// ```
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

// ==================== Manual Clone Implementation ====================

impl Clone for PressureSignal {
    fn clone(&self) -> Self {
        match self {
            Self::Constant { pressure } => Self::Constant { pressure: *pressure },
            Self::Step { start, base, height } => Self::Step {
                start: *start,
                base: *base,
                height: *height,
            },
            Self::Ramp { start, duration, base, height } => Self::Ramp {
                start: *start,
                duration: *duration,
                base: *base,
                height: *height,
            },
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

// ==================== Manual Debug Implementation ====================

impl std::fmt::Debug for PressureSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant { pressure } => f
                .debug_struct("Constant")
                .field("pressure", pressure)
                .finish(),
            Self::Step { start, base, height } => f
                .debug_struct("Step")
                .field("start", start)
                .field("base", base)
                .field("height", height)
                .finish(),
            Self::Ramp { start, duration, base, height } => f
                .debug_struct("Ramp")
                .field("start", start)
                .field("duration", duration)
                .field("base", base)
                .field("height", height)
                .finish(),
            Self::Custom(_) => f
                .debug_struct("Custom")
                .field("function", &"<user-defined>")
                .finish(),
        }
    }
}

// ==================== Implementation ====================

impl PressureSignal {
    /// Constant feed pressure \[Pa\]
    pub fn constant(pressure: f64) -> Self {
        Self::Constant { pressure }
    }

    /// Step of `height` on top of `base`, switched on at `start`
    ///
    /// # Arguments
    ///
    /// * `start` - Switching time \[s\]
    /// * `base` - Pressure before the step \[Pa\]
    /// * `height` - Pressure increment \[Pa\] (may be negative)
    pub fn step(start: f64, base: f64, height: f64) -> Self {
        Self::Step { start, base, height }
    }

    /// Linear ramp from `base` to `base + height` over `duration`
    ///
    /// A non-positive duration degenerates to a step.
    pub fn ramp(start: f64, duration: f64, base: f64, height: f64) -> Self {
        Self::Ramp {
            start,
            duration,
            base,
            height,
        }
    }

    /// Custom pressure history
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Pressure at time `t` \[Pa\]
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            Self::Constant { pressure } => *pressure,

            Self::Step { start, base, height } => {
                if t < *start {
                    *base
                } else {
                    base + height
                }
            }

            Self::Ramp { start, duration, base, height } => {
                if *duration <= 0.0 {
                    return if t < *start { *base } else { base + height };
                }
                let progress = ((t - start) / duration).max(0.0).min(1.0);
                base + height * progress
            }

            Self::Custom(f) => f(t),
        }
    }

    /// Evaluate at multiple time points
    pub fn evaluate_series(&self, times: &[f64]) -> Vec<f64> {
        times.iter().map(|&t| self.evaluate(t)).collect()
    }

    /// Pressure after all scheduled changes have taken effect \[Pa\]
    ///
    /// `None` for custom signals, whose long-time value is unknown.
    pub fn settled_value(&self) -> Option<f64> {
        match self {
            Self::Constant { pressure } => Some(*pressure),
            Self::Step { base, height, .. } | Self::Ramp { base, height, .. } => Some(base + height),
            Self::Custom(_) => None,
        }
    }
}

impl Default for PressureSignal {
    /// One atmosphere-like bar, held constant
    fn default() -> Self {
        Self::constant(1e5)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
