use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Relative importance of each optimization objective when ranking candidates.
///
/// Weights must be non-negative and sum to 1.0. Cost and energy are treated
/// as penalties: their weight rewards *low* cost and energy scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObjectiveWeights {
    pub speed: f32,
    pub quality: f32,
    pub cost: f32,
    pub safety: f32,
    pub energy: f32,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            speed: 0.25,
            quality: 0.30,
            cost: 0.20,
            safety: 0.15,
            energy: 0.10,
        }
    }
}

impl ObjectiveWeights {
    pub fn sum(&self) -> f32 {
        self.speed + self.quality + self.cost + self.safety + self.energy
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("speed", self.speed),
            ("quality", self.quality),
            ("cost", self.cost),
            ("safety", self.safety),
            ("energy", self.energy),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ValidationError::WeightOutOfRange { name, value });
            }
        }

        // Tolerance wide enough for f32 round-trips through JSON
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-4 {
            return Err(ValidationError::WeightsSum(sum));
        }

        Ok(())
    }
}

/// Tunable knobs for a single `assign` call.
///
/// Validated eagerly when the optimizer is constructed, so a bad config is
/// rejected before any scoring begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizationConfig {
    pub weights: ObjectiveWeights,
    /// How many ranked runner-ups to report alongside the primary decision.
    pub max_alternatives: usize,
    /// Safety-rating threshold below which safety-critical tasks penalize
    /// the agent's safety score and flag a high-severity risk.
    pub safety_floor: f32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            weights: ObjectiveWeights::default(),
            max_alternatives: 5,
            safety_floor: 0.9,
        }
    }
}

impl OptimizationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.safety_floor) || !self.safety_floor.is_finite() {
            return Err(ValidationError::SafetyFloorOutOfRange(self.safety_floor));
        }
        Ok(())
    }
}
