use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

use super::efficiency::analyze_efficiency;
use super::matcher::{match_capabilities, CapabilityMatch};
use super::risk::assess_risk;
use super::scoring::{composite_score, score_objectives, PoolBounds};
use super::{Agent, AssignmentDecision, AssignmentResult, EfficiencyAnalysis, ObjectiveScores, RiskAssessment, Task};
use crate::config::OptimizationConfig;
use crate::error::ValidationError;

/// Picks the best-fit agent for a task under weighted objectives.
///
/// Stateless and side-effect-free: scoring fans out over tokio tasks and is
/// reduced deterministically, so a given (task, pool, config) always yields
/// the same ranking regardless of scheduling order.
#[derive(Debug, Clone)]
pub struct AssignmentOptimizer {
    config: OptimizationConfig,
}

#[derive(Debug, Clone)]
struct ScoredCandidate {
    agent_id: String,
    scores: ObjectiveScores,
    composite: f32,
}

impl Default for AssignmentOptimizer {
    fn default() -> Self {
        Self {
            config: OptimizationConfig::default(),
        }
    }
}

impl AssignmentOptimizer {
    /// Build an optimizer, rejecting an invalid config before any scoring
    /// can run against it.
    pub fn new(config: OptimizationConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Assign the task to the best-fit agent in the candidate pool.
    ///
    /// Returns `Err` only for malformed inputs. An empty or fully filtered
    /// pool is a normal outcome: the result carries no primary decision and
    /// an explanatory recommendation.
    pub async fn assign(
        &self,
        task: &Task,
        agents: &[Agent],
    ) -> Result<AssignmentResult, ValidationError> {
        task.validate()?;
        let mut seen = HashSet::with_capacity(agents.len());
        for agent in agents {
            agent.validate()?;
            if !seen.insert(agent.id.as_str()) {
                return Err(ValidationError::DuplicateAgentId(agent.id.clone()));
            }
        }

        // Step 1: capability gate
        let eligible: Vec<(Agent, CapabilityMatch)> = agents
            .iter()
            .filter_map(|agent| {
                let matched = match_capabilities(task, agent);
                matched.eligible.then(|| (agent.clone(), matched))
            })
            .collect();

        debug!(
            task = %task.id,
            eligible = eligible.len(),
            pool = agents.len(),
            "filtered candidate pool"
        );

        if eligible.is_empty() {
            warn!(task = %task.id, "no eligible agent in candidate pool");
            return Ok(Self::unassignable(task));
        }

        // Step 2: fan out scoring over the eligible candidates
        let bounds = PoolBounds::from_pool(eligible.iter().map(|(agent, _)| agent))
            .expect("eligible pool is non-empty");
        let shared_task = Arc::new(task.clone());
        let config = Arc::new(self.config.clone());

        let handles = eligible.into_iter().map(|(agent, matched)| {
            let task = Arc::clone(&shared_task);
            let config = Arc::clone(&config);
            tokio::spawn(async move {
                let scores = score_objectives(&task, &agent, &matched, &config, &bounds);
                ScoredCandidate {
                    agent_id: agent.id,
                    composite: composite_score(&scores, &config.weights),
                    scores,
                }
            })
        });

        let mut ranked: Vec<ScoredCandidate> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.expect("scoring task panicked"))
            .collect();

        // Step 3: deterministic reduction
        ranked.sort_by(rank_order);

        let forced_choice = ranked.len() == 1;
        let winner_composite = ranked[0].composite;
        let runner_up_composite = ranked.get(1).map(|c| c.composite);

        // Winner confidence is its margin over the runner-up; a forced
        // choice gets a conservative midpoint instead of full confidence.
        let confidence = match runner_up_composite {
            Some(runner_up) => (winner_composite - runner_up).clamp(0.0, 1.0),
            None => 0.5,
        };

        let decided_at = Utc::now();
        let mut decisions = Vec::with_capacity(ranked.len());
        for (index, candidate) in ranked.iter().enumerate() {
            let (decision_confidence, reasoning) = if index == 0 {
                (confidence, winner_reasoning(task, candidate, confidence))
            } else {
                // Alternatives carry their own margin over the next-ranked
                // candidate, zero for the last one.
                let margin = ranked
                    .get(index + 1)
                    .map(|next| (candidate.composite - next.composite).clamp(0.0, 1.0))
                    .unwrap_or(0.0);
                (
                    margin,
                    format!(
                        "ranked alternative {} for task {} with composite score {:.2}",
                        index, task.id, candidate.composite
                    ),
                )
            };
            decisions.push(AssignmentDecision {
                agent_id: candidate.agent_id.clone(),
                scores: candidate.scores,
                composite: candidate.composite,
                confidence: decision_confidence,
                reasoning,
                decided_at,
            });
        }

        let mut iter = decisions.into_iter();
        let primary = iter.next();
        let alternatives: Vec<AssignmentDecision> =
            iter.take(self.config.max_alternatives).collect();

        // Step 4: risk and efficiency review of the winner only
        let winner = primary.as_ref().expect("ranked pool is non-empty");
        let risk = assess_risk(task, winner, self.config.safety_floor);
        let efficiency = analyze_efficiency(winner);
        let recommendations = build_recommendations(task, winner, &efficiency);

        debug!(
            task = %task.id,
            agent = %winner.agent_id,
            composite = winner.composite,
            confidence = winner.confidence,
            risk = ?risk.overall,
            "assignment decided"
        );

        Ok(AssignmentResult {
            primary,
            alternatives,
            risk,
            efficiency,
            recommendations,
            forced_choice,
        })
    }

    fn unassignable(task: &Task) -> AssignmentResult {
        AssignmentResult {
            primary: None,
            alternatives: Vec::new(),
            risk: RiskAssessment::none(),
            efficiency: EfficiencyAnalysis::neutral(),
            recommendations: vec![format!(
                "no eligible agent for task {}: relax requirements or register more capacity",
                task.id
            )],
            forced_choice: false,
        }
    }
}

/// Total order for ranking: composite descending, then safety descending,
/// then cost ascending, then agent id, so equal-scored candidates come out
/// in a reproducible order.
fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then_with(|| b.scores.safety.total_cmp(&a.scores.safety))
        .then_with(|| a.scores.cost.total_cmp(&b.scores.cost))
        .then_with(|| a.agent_id.cmp(&b.agent_id))
}

fn winner_reasoning(task: &Task, winner: &ScoredCandidate, confidence: f32) -> String {
    let verdict = if confidence > 0.9 {
        "excellent match"
    } else if confidence >= 0.7 {
        "good match"
    } else {
        "moderate match"
    };
    format!(
        "agent {} selected for task {}: {} (composite {:.2}, speed {:.2}, quality {:.2}, cost {:.2}, safety {:.2}, energy {:.2})",
        winner.agent_id,
        task.id,
        verdict,
        winner.composite,
        winner.scores.speed,
        winner.scores.quality,
        winner.scores.cost,
        winner.scores.safety,
        winner.scores.energy,
    )
}

fn build_recommendations(
    task: &Task,
    winner: &AssignmentDecision,
    efficiency: &EfficiencyAnalysis,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if winner.confidence > 0.9 {
        recommendations.push("excellent match: proceed with assignment".to_string());
    } else if winner.confidence >= 0.7 {
        recommendations.push("good match: proceed and monitor progress".to_string());
    } else {
        recommendations.push("moderate match: consider reviewing the ranked alternatives".to_string());
    }

    // Appended for every safety-critical task regardless of score
    if task.safety_critical {
        recommendations.push(format!(
            "safety-critical task: enable continuous safety monitoring for agent {}",
            winner.agent_id
        ));
    }

    recommendations.extend(efficiency.suggestions.iter().cloned());
    recommendations
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{agent, task};
    use super::super::{AgentStatus, Severity};
    use super::*;
    use crate::config::ObjectiveWeights;

    fn optimizer() -> AssignmentOptimizer {
        AssignmentOptimizer::default()
    }

    #[tokio::test]
    async fn empty_pool_is_unassignable_not_an_error() {
        let t = task("t1", &[("welding", 0.5, 1.0)]);
        let result = optimizer().assign(&t, &[]).await.unwrap();

        assert!(result.primary.is_none());
        assert!(result.alternatives.is_empty());
        assert_eq!(result.risk.overall, Severity::Low);
        assert!(result.risk.factors.is_empty());
        assert!(result.efficiency.factors.is_empty());
        assert!(result.recommendations[0].contains("no eligible agent"));
    }

    #[tokio::test]
    async fn ineligible_agents_never_appear_in_the_result() {
        let t = task("t1", &[("welding", 0.7, 1.0)]);
        let qualified = agent("worker", &[("welding", 0.9, 0.9)]);
        let underskilled = agent("novice", &[("welding", 0.5, 0.9)]);
        let unrelated = agent("painter", &[("painting", 0.9, 0.9)]);
        let mut busy = agent("busy", &[("welding", 0.95, 0.95)]);
        busy.status = AgentStatus::Busy;

        let result = optimizer()
            .assign(&t, &[qualified, underskilled, unrelated, busy])
            .await
            .unwrap();

        assert_eq!(result.primary.as_ref().unwrap().agent_id, "worker");
        assert!(result.alternatives.is_empty());
    }

    #[tokio::test]
    async fn single_candidate_is_a_forced_choice_with_conservative_confidence() {
        let t = task("t1", &[("welding", 0.5, 1.0)]);
        let only = agent("solo", &[("welding", 0.8, 0.9)]);

        let result = optimizer().assign(&t, &[only]).await.unwrap();
        let primary = result.primary.unwrap();

        assert!(result.forced_choice);
        assert!((primary.confidence - 0.5).abs() < f32::EPSILON);
        // Normalization against a pool of one lands on the neutral midpoint
        assert!((primary.scores.cost - 0.5).abs() < 1e-6);
        assert!((primary.scores.energy - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn assignment_is_deterministic_under_input_reordering() {
        let t = task("t1", &[("welding", 0.5, 1.0)]);
        let mut pool: Vec<_> = (0..6)
            .map(|i| {
                let mut a = agent(&format!("a-{}", i), &[("welding", 0.6 + 0.05 * i as f32, 0.9)]);
                a.cost_per_hour = 20.0 + 5.0 * i as f32;
                a.workload = 0.1 * i as f32;
                a
            })
            .collect();

        let forward = optimizer().assign(&t, &pool).await.unwrap();
        pool.reverse();
        let backward = optimizer().assign(&t, &pool).await.unwrap();

        let ids = |r: &AssignmentResult| {
            std::iter::once(r.primary.as_ref().unwrap().agent_id.clone())
                .chain(r.alternatives.iter().map(|d| d.agent_id.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&forward), ids(&backward));
        assert_eq!(
            forward.primary.unwrap().composite,
            backward.primary.unwrap().composite
        );
    }

    #[tokio::test]
    async fn all_reported_scores_stay_in_unit_range() {
        let t = task("t1", &[("welding", 0.2, 0.4), ("painting", 0.1, 0.9)]);
        let mut extreme = agent("extreme", &[("welding", 1.0, 1.0), ("painting", 1.0, 0.1)]);
        extreme.cost_per_hour = 500.0;
        extreme.energy_rate = 0.01;
        extreme.workload = 0.95;
        let modest = agent("modest", &[("welding", 0.3, 0.5), ("painting", 0.2, 0.5)]);

        let result = optimizer().assign(&t, &[extreme, modest]).await.unwrap();
        for decision in std::iter::once(result.primary.as_ref().unwrap())
            .chain(result.alternatives.iter())
        {
            let s = decision.scores;
            for value in [s.speed, s.quality, s.cost, s.safety, s.energy, decision.composite, decision.confidence] {
                assert!((0.0..=1.0).contains(&value), "out of range: {}", value);
            }
        }
    }

    #[tokio::test]
    async fn alternatives_are_capped() {
        let t = task("t1", &[]);
        let pool: Vec<_> = (0..9).map(|i| agent(&format!("a-{}", i), &[])).collect();

        let result = optimizer().assign(&t, &pool).await.unwrap();
        assert_eq!(result.alternatives.len(), 5);

        let config = OptimizationConfig {
            max_alternatives: 2,
            ..Default::default()
        };
        let result = AssignmentOptimizer::new(config)
            .unwrap()
            .assign(&t, &pool)
            .await
            .unwrap();
        assert_eq!(result.alternatives.len(), 2);
    }

    #[tokio::test]
    async fn equal_composites_break_ties_on_safety_then_cost_then_id() {
        // Zero safety weight keeps differing ratings out of the composite
        let weights = ObjectiveWeights {
            speed: 0.3,
            quality: 0.3,
            cost: 0.2,
            safety: 0.0,
            energy: 0.2,
        };
        let opt = AssignmentOptimizer::new(OptimizationConfig {
            weights,
            ..Default::default()
        })
        .unwrap();

        let t = task("t1", &[]);
        let mut safer = agent("zz-safer", &[]);
        safer.safety_rating = 0.95;
        let mut riskier = agent("aa-riskier", &[]);
        riskier.safety_rating = 0.7;

        let result = opt.assign(&t, &[riskier, safer]).await.unwrap();
        assert_eq!(result.primary.unwrap().agent_id, "zz-safer");

        // Fully identical agents fall back to id order
        let result = opt
            .assign(&t, &[agent("b-agent", &[]), agent("a-agent", &[])])
            .await
            .unwrap();
        assert_eq!(result.primary.unwrap().agent_id, "a-agent");
    }

    #[tokio::test]
    async fn safety_critical_escalation_produces_high_severity_factor() {
        let mut t = task("t1", &[("handling", 0.5, 1.0)]);
        t.safety_critical = true;
        let mut a = agent("solo", &[("handling", 0.9, 0.9)]);
        a.safety_rating = 0.85;

        let result = optimizer().assign(&t, &[a]).await.unwrap();
        assert_eq!(result.risk.overall, Severity::High);
        let high = result
            .risk
            .factors
            .iter()
            .find(|f| f.severity == Severity::High)
            .unwrap();
        assert!(high.description.contains("safety"));
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("safety monitoring")));
    }

    #[tokio::test]
    async fn doubling_cost_emphasis_never_shifts_toward_the_expensive_agent() {
        let t = task("t1", &[("welding", 0.5, 1.0)]);
        let mut cheap = agent("cheap", &[("welding", 0.7, 0.8)]);
        cheap.cost_per_hour = 25.0;
        cheap.workload = 0.3;
        let mut dear = agent("dear", &[("welding", 0.95, 0.95)]);
        dear.cost_per_hour = 35.0;
        dear.workload = 0.3;

        let result = optimizer()
            .assign(&t, &[cheap.clone(), dear.clone()])
            .await
            .unwrap();
        assert_eq!(result.primary.unwrap().agent_id, "dear");

        let cost_heavy = OptimizationConfig {
            weights: ObjectiveWeights {
                speed: 0.15,
                quality: 0.15,
                cost: 0.50,
                safety: 0.15,
                energy: 0.05,
            },
            ..Default::default()
        };
        let result = AssignmentOptimizer::new(cost_heavy)
            .unwrap()
            .assign(&t, &[cheap, dear])
            .await
            .unwrap();
        assert_eq!(result.primary.unwrap().agent_id, "cheap");
    }

    #[tokio::test]
    async fn precision_assembly_scenario_prefers_the_stronger_match() {
        let mut t = task("t1", &[("precision_assembly", 0.7, 1.0)]);
        t.estimated_duration_mins = 60.0;

        let mut a = agent("agent-a", &[("precision_assembly", 0.9, 0.9)]);
        a.cost_per_hour = 40.0;
        a.workload = 0.1;
        a.safety_rating = 0.95;
        let mut b = agent("agent-b", &[("precision_assembly", 0.75, 0.8)]);
        b.cost_per_hour = 20.0;
        b.workload = 0.5;
        b.safety_rating = 0.9;

        let result = optimizer().assign(&t, &[b, a]).await.unwrap();
        let primary = result.primary.unwrap();

        assert_eq!(primary.agent_id, "agent-a");
        assert!((primary.scores.quality - 0.81).abs() < 1e-3);
        assert!(primary.confidence > 0.0);
        assert_eq!(result.alternatives[0].agent_id, "agent-b");
        assert!((result.alternatives[0].scores.quality - 0.6).abs() < 1e-3);
        assert!(!result
            .risk
            .factors
            .iter()
            .any(|f| f.severity == Severity::High));
    }

    #[tokio::test]
    async fn duplicate_agent_ids_are_rejected_before_scoring() {
        let t = task("t1", &[]);
        let result = optimizer()
            .assign(&t, &[agent("dup", &[]), agent("dup", &[])])
            .await;
        assert!(matches!(result, Err(ValidationError::DuplicateAgentId(_))));
    }

    #[tokio::test]
    async fn invalid_task_is_rejected_before_scoring() {
        let mut t = task("t1", &[]);
        t.estimated_duration_mins = -5.0;
        let result = optimizer().assign(&t, &[agent("a1", &[])]).await;
        assert!(matches!(result, Err(ValidationError::InvalidTask { .. })));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = OptimizationConfig {
            weights: ObjectiveWeights {
                speed: 0.9,
                quality: 0.9,
                cost: 0.0,
                safety: 0.0,
                energy: 0.0,
            },
            ..Default::default()
        };
        assert!(matches!(
            AssignmentOptimizer::new(config),
            Err(ValidationError::WeightsSum(_))
        ));
    }
}
