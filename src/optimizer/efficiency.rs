use super::{AssignmentDecision, EfficiencyAnalysis, EfficiencyFactor};

// Business-efficiency weights. Deliberately distinct from the ranking
// weights: these express expected operational efficiency, not selection
// priority.
const QUALITY_WEIGHT: f32 = 0.4;
const SPEED_WEIGHT: f32 = 0.3;
const COST_WEIGHT: f32 = 0.2;
const ENERGY_WEIGHT: f32 = 0.1;

/// Decompose the winning assignment into an expected-efficiency breakdown
/// plus improvement suggestions.
pub fn analyze_efficiency(decision: &AssignmentDecision) -> EfficiencyAnalysis {
    let scores = &decision.scores;

    let quality = QUALITY_WEIGHT * scores.quality;
    let speed = SPEED_WEIGHT * scores.speed;
    let cost = COST_WEIGHT * (1.0 - scores.cost);
    let energy = ENERGY_WEIGHT * (1.0 - scores.energy);

    let factors = vec![
        EfficiencyFactor {
            factor: "quality".to_string(),
            contribution: quality,
            description: format!(
                "capability match quality {:.2} weighted at {:.0}%",
                scores.quality,
                QUALITY_WEIGHT * 100.0
            ),
        },
        EfficiencyFactor {
            factor: "speed".to_string(),
            contribution: speed,
            description: format!(
                "available throughput {:.2} weighted at {:.0}%",
                scores.speed,
                SPEED_WEIGHT * 100.0
            ),
        },
        EfficiencyFactor {
            factor: "cost".to_string(),
            contribution: cost,
            description: format!(
                "cost advantage {:.2} weighted at {:.0}%",
                1.0 - scores.cost,
                COST_WEIGHT * 100.0
            ),
        },
        EfficiencyFactor {
            factor: "energy".to_string(),
            contribution: energy,
            description: format!(
                "energy advantage {:.2} weighted at {:.0}%",
                1.0 - scores.energy,
                ENERGY_WEIGHT * 100.0
            ),
        },
    ];

    let mut suggestions = Vec::new();
    if scores.quality < 0.8 {
        suggestions.push(format!(
            "quality score {:.2}: consider capability training for agent {}",
            scores.quality, decision.agent_id
        ));
    }
    if scores.speed < 0.7 {
        suggestions.push(format!(
            "speed score {:.2}: review workload distribution or an alternate agent",
            scores.speed
        ));
    }
    if scores.cost > 0.7 {
        suggestions.push(format!(
            "cost score {:.2}: evaluate more cost-effective alternatives",
            scores.cost
        ));
    }

    EfficiencyAnalysis {
        expected_efficiency: (quality + speed + cost + energy).clamp(0.0, 1.0),
        factors,
        suggestions,
    }
}
