//! Command handlers for the `pacemaker` binary

use super::args::{Commands, PlanArgs};
use crate::app::AppConfig;
use crate::config::EngineConfig;
use crate::error::PacemakerError;
use crate::orchestrator::PlanOrchestrator;
use crate::pace::{Pace, RunningType};
use crate::plan::{PlanRequest, ProcessingStatus, RunnerProfile};
use crate::reasoning::ClaudeClient;
use crate::storage::StorageFactory;
use crate::workout::{total_distance_of, TemplateSelector};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Run one parsed command
pub async fn execute(command: Commands, app: &AppConfig) -> Result<()> {
    let config = app
        .engine_config()
        .context("Failed to load engine configuration")?;

    match command {
        Commands::Vdot { mile_pace } => run_vdot(&config, mile_pace),
        Commands::Paces { vdot } => run_paces(&config, vdot),
        Commands::Templates {
            running_type,
            vdot,
            goal_km,
        } => run_templates(&config, running_type, vdot, goal_km),
        Commands::Plan(args) => run_plan(&config, args).await,
        Commands::Status { id } => run_status(&config, &id).await,
        Commands::Delete { running_ids } => run_delete(&config, &running_ids).await,
    }
}

fn run_vdot(config: &EngineConfig, mile_pace: Pace) -> Result<()> {
    let estimator = config.catalog.load_estimator()?;
    println!("{}", estimator.estimate(mile_pace));
    Ok(())
}

fn run_paces(config: &EngineConfig, vdot: u8) -> Result<()> {
    let paces = config.catalog.load_pace_table()?.paces_for(vdot)?;
    for (running_type, pace) in &paces.paces {
        println!("{}  {:<10}  {} /km", running_type, running_type.name(), pace.clock());
    }
    Ok(())
}

fn run_templates(
    config: &EngineConfig,
    running_type: RunningType,
    vdot: u8,
    goal_km: Option<f64>,
) -> Result<()> {
    let catalog = config.catalog.load_workouts()?;
    let paces = config.catalog.load_pace_table()?.paces_for(vdot)?;

    for template in catalog.templates_for(running_type) {
        let meters = total_distance_of(template, &paces)?;
        println!("{:<24} {:>6.2} km  {} sets", template.id, meters / 1000.0, template.sets.len());
    }

    if let Some(goal_km) = goal_km {
        let selected =
            TemplateSelector.select(&catalog, goal_km * 1000.0, running_type, &paces)?;
        println!(
            "\n{} km picks {} (scale {:.3})",
            goal_km, selected.template_id, selected.scale
        );
    }
    Ok(())
}

async fn run_plan(config: &EngineConfig, args: PlanArgs) -> Result<()> {
    let client = ClaudeClient::new(&config.reasoning)?;
    let orchestrator = PlanOrchestrator::from_config(config, Arc::new(client)).await?;

    let profile = RunnerProfile {
        age: args.age,
        gender: args.gender,
        weight_kg: args.weight_kg,
        height_cm: args.height_cm,
        vdot: args.vdot,
        condition: args.condition,
    };
    let mut request = PlanRequest::new(args.runner, args.running_type, args.goal_km);
    if let Some(celsius) = args.temperature {
        request = request.with_temperature(celsius);
    }
    if let Some(pace) = args.mile_pace {
        request = request.with_recent_mile_pace(pace);
    }
    if let Some(running_id) = args.running_id {
        request = request.with_running_id(running_id);
    }

    let handle = orchestrator.submit(profile, request).await?;
    let id = handle.id.clone();
    info!("Submitted pacemaker {}, waiting for reasoning stages", id);

    let status = handle.wait().await?;
    let response = orchestrator.poll(&id).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if status == ProcessingStatus::Failed {
        let reason = orchestrator
            .find(&id)
            .await?
            .and_then(|plan| plan.failure_reason)
            .unwrap_or_else(|| "unknown reason".to_string());
        anyhow::bail!("Pacemaker {} failed: {}", id, reason);
    }
    Ok(())
}

async fn run_status(config: &EngineConfig, id: &str) -> Result<()> {
    let storage = StorageFactory::from_config(&config.storage).await?;
    let plan = storage
        .plans
        .find_by_id(id)
        .await?
        .ok_or_else(|| PacemakerError::not_found(format!("No pacemaker with id {}", id)))?;
    println!("{}", serde_json::to_string_pretty(&plan.poll_response())?);
    Ok(())
}

async fn run_delete(config: &EngineConfig, running_ids: &[String]) -> Result<()> {
    let storage = StorageFactory::from_config(&config.storage).await?;
    let deleted = storage.plans.delete_by_running_ids(running_ids).await?;
    println!("Deleted {} pacemakers", deleted);
    Ok(())
}
