use std::collections::HashMap;

use super::{Agent, AgentStatus, Task};

/// Outcome of matching one agent against a task's requirements.
#[derive(Debug, Clone)]
pub struct CapabilityMatch {
    pub eligible: bool,
    /// Requirement type -> match quality (proficiency x confidence), only
    /// populated for eligible agents.
    pub match_quality: HashMap<String, f32>,
}

impl CapabilityMatch {
    fn ineligible() -> Self {
        Self {
            eligible: false,
            match_quality: HashMap::new(),
        }
    }
}

/// Check a single agent against every requirement of a task.
///
/// Busy agents are ruled out before requirements are considered. An eligible
/// agent must hold every required capability at or above its minimum
/// proficiency. A task with no requirements is vacuously satisfied by every
/// available agent.
pub fn match_capabilities(task: &Task, agent: &Agent) -> CapabilityMatch {
    if agent.status != AgentStatus::Available {
        return CapabilityMatch::ineligible();
    }

    let mut match_quality = HashMap::with_capacity(task.requirements.len());

    for req in &task.requirements {
        match agent.capabilities.get(&req.requirement_type) {
            Some(cap) if cap.proficiency >= req.min_proficiency => {
                match_quality.insert(
                    req.requirement_type.clone(),
                    (cap.proficiency * cap.confidence).clamp(0.0, 1.0),
                );
            }
            _ => return CapabilityMatch::ineligible(),
        }
    }

    CapabilityMatch {
        eligible: true,
        match_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{agent, task};
    use super::*;

    #[test]
    fn eligible_when_all_requirements_met() {
        let t = task("t1", &[("welding", 0.6, 1.0)]);
        let a = agent("a1", &[("welding", 0.8, 0.9)]);

        let m = match_capabilities(&t, &a);
        assert!(m.eligible);
        let q = m.match_quality["welding"];
        assert!((q - 0.72).abs() < 1e-6);
    }

    #[test]
    fn ineligible_when_capability_missing() {
        let t = task("t1", &[("welding", 0.6, 1.0)]);
        let a = agent("a1", &[("painting", 0.9, 0.9)]);

        assert!(!match_capabilities(&t, &a).eligible);
    }

    #[test]
    fn ineligible_when_below_minimum_proficiency() {
        let t = task("t1", &[("welding", 0.6, 1.0)]);
        let a = agent("a1", &[("welding", 0.59, 1.0)]);

        assert!(!match_capabilities(&t, &a).eligible);
    }

    #[test]
    fn proficiency_exactly_at_minimum_is_eligible() {
        let t = task("t1", &[("welding", 0.6, 1.0)]);
        let a = agent("a1", &[("welding", 0.6, 1.0)]);

        assert!(match_capabilities(&t, &a).eligible);
    }

    #[test]
    fn busy_agent_is_excluded_before_matching() {
        let t = task("t1", &[]);
        let mut a = agent("a1", &[]);
        a.status = AgentStatus::Busy;

        assert!(!match_capabilities(&t, &a).eligible);
    }

    #[test]
    fn zero_requirements_vacuously_satisfied() {
        let t = task("t1", &[]);
        let a = agent("a1", &[]);

        let m = match_capabilities(&t, &a);
        assert!(m.eligible);
        assert!(m.match_quality.is_empty());
    }

    #[test]
    fn one_failing_requirement_rules_out_the_agent() {
        let t = task("t1", &[("welding", 0.5, 0.5), ("painting", 0.8, 0.5)]);
        let a = agent("a1", &[("welding", 0.9, 0.9), ("painting", 0.7, 0.9)]);

        assert!(!match_capabilities(&t, &a).eligible);
    }
}
