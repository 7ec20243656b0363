use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use taskmatch::{
    Agent, AgentKind, AgentStatus, AssignmentOptimizer, Capability, OptimizationConfig,
    Requirement, Task, TaskPriority,
};

/// JSON envelope accepted on the command line: a task, a candidate pool,
/// and an optional config (defaults apply field by field).
#[derive(Deserialize)]
struct AssignmentRequest {
    task: Task,
    agents: Vec<Agent>,
    #[serde(default)]
    config: OptimizationConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let request = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read request file {}", path))?;
            serde_json::from_str(&raw).context("failed to parse assignment request")?
        }
        None => sample_request(),
    };

    let optimizer = AssignmentOptimizer::new(request.config)?;
    let result = optimizer.assign(&request.task, &request.agents).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// A small built-in fleet so the binary demonstrates a decision without an
/// input file.
fn sample_request() -> AssignmentRequest {
    let capability = |proficiency, confidence| Capability {
        proficiency,
        confidence,
        last_assessed: Utc::now(),
    };

    let task = Task {
        id: Uuid::new_v4().to_string(),
        task_type: "precision_assembly".to_string(),
        priority: TaskPriority::QualityCritical,
        requirements: vec![Requirement {
            requirement_type: "precision_assembly".to_string(),
            min_proficiency: 0.7,
            weight: 1.0,
        }],
        estimated_duration_mins: 60.0,
        deadline: None,
        complexity: 0.6,
        safety_critical: false,
        location: "line-3".to_string(),
    };

    let agents = vec![
        Agent {
            id: Uuid::new_v4().to_string(),
            kind: AgentKind::Robot,
            capabilities: HashMap::from([(
                "precision_assembly".to_string(),
                capability(0.9, 0.9),
            )]),
            status: AgentStatus::Available,
            location: "line-3".to_string(),
            cost_per_hour: 40.0,
            energy_rate: 8.0,
            safety_rating: 0.95,
            workload: 0.1,
        },
        Agent {
            id: Uuid::new_v4().to_string(),
            kind: AgentKind::Human,
            capabilities: HashMap::from([(
                "precision_assembly".to_string(),
                capability(0.75, 0.8),
            )]),
            status: AgentStatus::Available,
            location: "line-3".to_string(),
            cost_per_hour: 20.0,
            energy_rate: 1.0,
            safety_rating: 0.9,
            workload: 0.5,
        },
    ];

    AssignmentRequest {
        task,
        agents,
        config: OptimizationConfig::default(),
    }
}
