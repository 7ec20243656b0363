pub mod efficiency;
pub mod engine;
pub mod matcher;
pub mod risk;
pub mod scoring;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ValidationError;

/// A candidate worker: human, robot, AI system, or a hybrid team.
///
/// Agents are registered and mutated by an external fleet registry; the
/// optimizer only ever reads a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub kind: AgentKind,
    /// Capability name -> proficiency record.
    pub capabilities: HashMap<String, Capability>,
    pub status: AgentStatus,
    pub location: String,
    pub cost_per_hour: f32,
    /// Energy consumption rate while working, in arbitrary units per hour.
    pub energy_rate: f32,
    pub safety_rating: f32,
    /// Fraction of the agent's capacity currently committed, 0.0 = idle.
    pub workload: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Robot,
    Human,
    AiSystem,
    Hybrid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Available,
    Busy,
}

/// One skill an agent holds, with how well and how certainly it holds it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Capability {
    pub proficiency: f32,
    pub confidence: f32,
    pub last_assessed: DateTime<Utc>,
}

/// A unit of work awaiting assignment. Created by an external task store;
/// consumed read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub task_type: String,
    pub priority: TaskPriority,
    pub requirements: Vec<Requirement>,
    pub estimated_duration_mins: f32,
    pub deadline: Option<DateTime<Utc>>,
    pub complexity: f32,
    pub safety_critical: bool,
    pub location: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    SafetyCritical,
    QualityCritical,
    EfficiencyCritical,
    Standard,
}

/// A single capability demand: the agent must hold `requirement_type` at
/// proficiency >= `min_proficiency` to be eligible at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub requirement_type: String,
    pub min_proficiency: f32,
    /// Relative importance when blending match quality into the quality
    /// objective. Must be in (0, 1].
    pub weight: f32,
}

/// Per-objective normalized scores for one (task, agent) pairing.
///
/// All five lie in [0, 1]. Cost and energy are penalties: lower is better,
/// and they enter the ranking composite inverted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObjectiveScores {
    pub speed: f32,
    pub quality: f32,
    pub cost: f32,
    pub safety: f32,
    pub energy: f32,
}

/// One ranked candidate in an assignment result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub agent_id: String,
    pub scores: ObjectiveScores,
    /// Weighted blend of the objective scores used for ranking.
    pub composite: f32,
    /// Winner's margin over the runner-up; 0.5 for a forced choice.
    pub confidence: f32,
    pub reasoning: String,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub description: String,
    pub severity: Severity,
    pub mitigation: String,
}

/// Risk review of the winning assignment. Overall risk is the maximum
/// severity across triggered factors, or low when none triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall: Severity,
    pub factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    /// Neutral assessment used when there is nothing to assess.
    pub fn none() -> Self {
        Self {
            overall: Severity::Low,
            factors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyFactor {
    pub factor: String,
    pub contribution: f32,
    pub description: String,
}

/// Expected business efficiency of the winning assignment, decomposed into
/// per-objective contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyAnalysis {
    pub expected_efficiency: f32,
    pub factors: Vec<EfficiencyFactor>,
    pub suggestions: Vec<String>,
}

impl EfficiencyAnalysis {
    pub fn neutral() -> Self {
        Self {
            expected_efficiency: 0.0,
            factors: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// Everything `assign` produces for one task.
///
/// `primary` is `None` only when no agent in the pool was eligible — a
/// legitimate terminal outcome, not an error. `forced_choice` marks the
/// degenerate case of exactly one eligible candidate, where confidence is
/// the conservative 0.5 default rather than a real margin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub primary: Option<AssignmentDecision>,
    pub alternatives: Vec<AssignmentDecision>,
    pub risk: RiskAssessment,
    pub efficiency: EfficiencyAnalysis,
    pub recommendations: Vec<String>,
    pub forced_choice: bool,
}

fn in_unit(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

impl Agent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidAgent {
            id: self.id.clone(),
            reason,
        };

        if self.id.is_empty() {
            return Err(ValidationError::InvalidAgent {
                id: "<empty>".to_string(),
                reason: "agent id must not be empty".to_string(),
            });
        }
        if !self.cost_per_hour.is_finite() || self.cost_per_hour <= 0.0 {
            return Err(invalid(format!(
                "cost_per_hour must be positive, got {}",
                self.cost_per_hour
            )));
        }
        if !self.energy_rate.is_finite() || self.energy_rate <= 0.0 {
            return Err(invalid(format!(
                "energy_rate must be positive, got {}",
                self.energy_rate
            )));
        }
        if !in_unit(self.safety_rating) {
            return Err(invalid(format!(
                "safety_rating must be in [0, 1], got {}",
                self.safety_rating
            )));
        }
        if !in_unit(self.workload) {
            return Err(invalid(format!(
                "workload must be in [0, 1], got {}",
                self.workload
            )));
        }
        for (name, cap) in &self.capabilities {
            if !in_unit(cap.proficiency) || !in_unit(cap.confidence) {
                return Err(invalid(format!(
                    "capability '{}' proficiency/confidence must be in [0, 1]",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl Task {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidTask {
            id: self.id.clone(),
            reason,
        };

        if self.id.is_empty() {
            return Err(ValidationError::InvalidTask {
                id: "<empty>".to_string(),
                reason: "task id must not be empty".to_string(),
            });
        }
        if !self.estimated_duration_mins.is_finite() || self.estimated_duration_mins < 0.0 {
            return Err(invalid(format!(
                "estimated_duration_mins must be non-negative, got {}",
                self.estimated_duration_mins
            )));
        }
        if !in_unit(self.complexity) {
            return Err(invalid(format!(
                "complexity must be in [0, 1], got {}",
                self.complexity
            )));
        }
        for req in &self.requirements {
            if !in_unit(req.min_proficiency) {
                return Err(invalid(format!(
                    "requirement '{}' min_proficiency must be in [0, 1]",
                    req.requirement_type
                )));
            }
            if !req.weight.is_finite() || req.weight <= 0.0 || req.weight > 1.0 {
                return Err(invalid(format!(
                    "requirement '{}' weight must be in (0, 1]",
                    req.requirement_type
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Utc;

    pub fn capability(proficiency: f32, confidence: f32) -> Capability {
        Capability {
            proficiency,
            confidence,
            last_assessed: Utc::now(),
        }
    }

    pub fn agent(id: &str, caps: &[(&str, f32, f32)]) -> Agent {
        Agent {
            id: id.to_string(),
            kind: AgentKind::Robot,
            capabilities: caps
                .iter()
                .map(|(name, p, c)| (name.to_string(), capability(*p, *c)))
                .collect(),
            status: AgentStatus::Available,
            location: "line-1".to_string(),
            cost_per_hour: 30.0,
            energy_rate: 5.0,
            safety_rating: 0.9,
            workload: 0.2,
        }
    }

    pub fn task(id: &str, reqs: &[(&str, f32, f32)]) -> Task {
        Task {
            id: id.to_string(),
            task_type: "assembly".to_string(),
            priority: TaskPriority::Standard,
            requirements: reqs
                .iter()
                .map(|(name, min, weight)| Requirement {
                    requirement_type: name.to_string(),
                    min_proficiency: *min,
                    weight: *weight,
                })
                .collect(),
            estimated_duration_mins: 60.0,
            deadline: None,
            complexity: 0.5,
            safety_critical: false,
            location: "line-1".to_string(),
        }
    }
}
