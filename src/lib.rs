pub mod config;
pub mod error;
pub mod optimizer;

pub use config::{ObjectiveWeights, OptimizationConfig};
pub use error::ValidationError;
pub use optimizer::engine::AssignmentOptimizer;
pub use optimizer::{
    Agent, AgentKind, AgentStatus, AssignmentDecision, AssignmentResult, Capability,
    EfficiencyAnalysis, EfficiencyFactor, Requirement, RiskAssessment, RiskFactor, Severity, Task,
    TaskPriority,
};

/// Assign a task with the default optimization config.
pub async fn assign(task: &Task, agents: &[Agent]) -> Result<AssignmentResult, ValidationError> {
    AssignmentOptimizer::default().assign(task, agents).await
}
