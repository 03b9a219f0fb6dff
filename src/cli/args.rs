//! CLI argument structures
//!
//! Everything the `pacemaker` binary accepts on the command line.

use crate::pace::{Pace, RunningType};
use crate::plan::{Condition, Gender};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate personalised pacemaker plans for runners
#[derive(Parser, Debug)]
#[command(name = "pacemaker")]
#[command(about = "pacemaker - VDOT paces, workout templates and guided run plans", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Engine settings file (TOML)
    #[arg(short = 'c', long, global = true, env = "PACEMAKER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate VDOT from a one-mile pace ("7:49" or "7.49")
    Vdot {
        mile_pace: Pace,
    },

    /// Show the training paces for a VDOT
    Paces {
        #[arg(long)]
        vdot: u8,
    },

    /// List workout templates of one type with their distance at a VDOT
    Templates {
        /// Running type: E, M, T, I or R
        #[arg(long = "type")]
        running_type: RunningType,

        #[arg(long, default_value = "40")]
        vdot: u8,

        /// Also show which template a goal distance would pick
        #[arg(long)]
        goal_km: Option<f64>,
    },

    /// Generate a plan and wait for it to finish
    Plan(PlanArgs),

    /// Show the status of a stored plan
    Status {
        #[arg(long)]
        id: String,
    },

    /// Delete the plans attached to runs
    Delete {
        #[arg(long = "running-id", required = true)]
        running_ids: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long)]
    pub runner: String,

    /// Running type: E, M, T, I or R
    #[arg(long = "type")]
    pub running_type: RunningType,

    #[arg(long)]
    pub goal_km: f64,

    #[arg(long)]
    pub vdot: u8,

    #[arg(long, default_value = "30")]
    pub age: u32,

    #[arg(long, default_value = "other")]
    pub gender: Gender,

    #[arg(long, default_value = "65")]
    pub weight_kg: f64,

    #[arg(long, default_value = "170")]
    pub height_cm: f64,

    /// 1-5 or very-poor .. very-good
    #[arg(long, default_value = "normal")]
    pub condition: Condition,

    /// Air temperature in Celsius
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Recent one-mile pace; re-estimates the VDOT when given
    #[arg(long)]
    pub mile_pace: Option<Pace>,

    #[arg(long)]
    pub running_id: Option<String>,
}
