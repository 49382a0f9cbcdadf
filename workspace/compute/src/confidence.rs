//! Horizon-based confidence heuristic and the simple growth range.
//!
//! Neither value comes from the estimator: they are fixed formulas over the
//! horizon or the prediction itself and are always shown with
//! [`CONFIDENCE_NOTE`].

use crate::error::{ComputeError, Result};

/// Default `k` of `1 / (1 + k·horizon)`.
pub const DEFAULT_DECAY: f64 = 0.05;

/// Default half-width of the growth range, in percentage points.
pub const DEFAULT_RANGE_MARGIN: f64 = 1.5;

pub const CONFIDENCE_NOTE: &str = "Nota: el nivel de confianza es ilustrativo y disminuye a medida \
que se predicen más años en el futuro; no es un intervalo estadístico calibrado.";

/// `confidence(h) = 1 / (1 + k·h)`: 1.0 at horizon 0, strictly decreasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceHeuristic {
    decay: f64,
}

impl ConfidenceHeuristic {
    pub fn new(decay: f64) -> Result<Self> {
        if !(decay > 0.0 && decay.is_finite()) {
            return Err(ComputeError::InvalidRequest(format!(
                "confidence decay must be a positive number, got {}",
                decay
            )));
        }
        Ok(Self { decay })
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn confidence(&self, horizon: u32) -> f64 {
        1.0 / (1.0 + self.decay * f64::from(horizon))
    }
}

impl Default for ConfidenceHeuristic {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthRange {
    pub lower: f64,
    pub upper: f64,
}

/// `growth ± margin`.
pub fn growth_range(growth_percent: f64, margin: f64) -> GrowthRange {
    GrowthRange {
        lower: growth_percent - margin,
        upper: growth_percent + margin,
    }
}
