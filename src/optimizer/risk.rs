use super::{AssignmentDecision, RiskAssessment, RiskFactor, Severity, Task};

/// Inspect the winning assignment for safety-critical or low-confidence
/// conditions.
///
/// Each rule fires independently and may add one factor; overall risk is the
/// maximum severity across triggered rules, or low when none fire.
pub fn assess_risk(task: &Task, decision: &AssignmentDecision, safety_floor: f32) -> RiskAssessment {
    let mut factors = Vec::new();

    if decision.confidence < 0.7 {
        factors.push(RiskFactor {
            description: format!(
                "low confidence assignment (confidence {:.2})",
                decision.confidence
            ),
            severity: Severity::Medium,
            mitigation: "review ranked alternatives before dispatching".to_string(),
        });
    }

    if task.safety_critical && decision.scores.safety < safety_floor {
        factors.push(RiskFactor {
            description: format!(
                "safety-critical task with moderate safety score ({:.2})",
                decision.scores.safety
            ),
            severity: Severity::High,
            mitigation: "require supervisor sign-off and continuous safety monitoring".to_string(),
        });
    }

    if decision.scores.quality < 0.6 {
        factors.push(RiskFactor {
            description: format!(
                "below-average quality expectation (quality {:.2})",
                decision.scores.quality
            ),
            severity: Severity::Medium,
            mitigation: "schedule an inspection step after completion".to_string(),
        });
    }

    let overall = factors
        .iter()
        .map(|f| f.severity)
        .max()
        .unwrap_or(Severity::Low);

    RiskAssessment { overall, factors }
}
