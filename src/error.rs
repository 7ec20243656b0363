use thiserror::Error;

/// Input rejection raised before any scoring takes place.
///
/// These are distinct from an unassignable outcome: a valid task with no
/// eligible agents still produces an `Ok` result with no primary decision.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("objective weights must sum to 1.0, got {0}")]
    WeightsSum(f32),

    #[error("objective weight '{name}' out of range: {value}")]
    WeightOutOfRange { name: &'static str, value: f32 },

    #[error("safety floor must be in [0, 1], got {0}")]
    SafetyFloorOutOfRange(f32),

    #[error("invalid task '{id}': {reason}")]
    InvalidTask { id: String, reason: String },

    #[error("invalid agent '{id}': {reason}")]
    InvalidAgent { id: String, reason: String },

    #[error("duplicate agent id '{0}' in candidate pool")]
    DuplicateAgentId(String),
}
