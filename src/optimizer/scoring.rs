use super::matcher::CapabilityMatch;
use super::{Agent, ObjectiveScores, Task};
use crate::config::{ObjectiveWeights, OptimizationConfig};

/// Cost and energy extremes across the eligible candidate pool, used to
/// normalize each agent's figures into [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct PoolBounds {
    pub cost_min: f32,
    pub cost_max: f32,
    pub energy_min: f32,
    pub energy_max: f32,
}

impl PoolBounds {
    /// Scan the eligible agents for min/max cost and energy figures.
    /// Returns `None` for an empty pool.
    pub fn from_pool<'a>(agents: impl Iterator<Item = &'a Agent>) -> Option<Self> {
        let mut bounds: Option<PoolBounds> = None;
        for agent in agents {
            let b = bounds.get_or_insert(PoolBounds {
                cost_min: agent.cost_per_hour,
                cost_max: agent.cost_per_hour,
                energy_min: agent.energy_rate,
                energy_max: agent.energy_rate,
            });
            b.cost_min = b.cost_min.min(agent.cost_per_hour);
            b.cost_max = b.cost_max.max(agent.cost_per_hour);
            b.energy_min = b.energy_min.min(agent.energy_rate);
            b.energy_max = b.energy_max.max(agent.energy_rate);
        }
        bounds
    }
}

/// Normalize a positive figure against the pool extremes.
///
/// `value / (min + max)` keeps lower figures at lower scores and lands a
/// single-candidate pool (min == max == value) on exactly the neutral 0.5,
/// with no division-by-zero special case.
fn pool_normalize(value: f32, min: f32, max: f32) -> f32 {
    let denom = min + max;
    if denom <= 0.0 {
        return 0.5;
    }
    (value / denom).clamp(0.0, 1.0)
}

/// Compute the five objective scores for one (task, agent) pair that has
/// already passed capability matching.
pub fn score_objectives(
    task: &Task,
    agent: &Agent,
    matched: &CapabilityMatch,
    config: &OptimizationConfig,
    bounds: &PoolBounds,
) -> ObjectiveScores {
    ObjectiveScores {
        speed: speed_score(agent),
        quality: quality_score(task, matched),
        cost: pool_normalize(agent.cost_per_hour, bounds.cost_min, bounds.cost_max),
        safety: safety_score(task, agent, config.safety_floor),
        energy: pool_normalize(agent.energy_rate, bounds.energy_min, bounds.energy_max),
    }
}

/// Weighted average of per-requirement match quality. A zero-requirement
/// task scores the neutral 0.5 so it neither rewards nor punishes anyone.
fn quality_score(task: &Task, matched: &CapabilityMatch) -> f32 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for req in &task.requirements {
        if let Some(quality) = matched.match_quality.get(&req.requirement_type) {
            weighted += req.weight * quality;
            total_weight += req.weight;
        }
    }
    if total_weight <= 0.0 {
        return 0.5;
    }
    (weighted / total_weight).clamp(0.0, 1.0)
}

/// Idle agents score higher. No throughput history is carried in the agent
/// snapshot, so speed reduces to remaining capacity.
fn speed_score(agent: &Agent) -> f32 {
    (1.0 - agent.workload).clamp(0.0, 1.0)
}

/// The agent's safety rating, penalized when a safety-critical task meets a
/// rating below the configured floor.
fn safety_score(task: &Task, agent: &Agent, floor: f32) -> f32 {
    let rating = agent.safety_rating.clamp(0.0, 1.0);
    if task.safety_critical && rating < floor {
        (rating * 0.8).clamp(0.0, 1.0)
    } else {
        rating
    }
}

/// Weighted blend of the objective scores used to rank candidates.
///
/// Cost and energy are penalties, so their weight rewards the inverted
/// score. With weights summing to 1 the composite stays in [0, 1].
pub fn composite_score(scores: &ObjectiveScores, weights: &ObjectiveWeights) -> f32 {
    let blended = weights.speed * scores.speed
        + weights.quality * scores.quality
        + weights.cost * (1.0 - scores.cost)
        + weights.safety * scores.safety
        + weights.energy * (1.0 - scores.energy);
    blended.clamp(0.0, 1.0)
}
