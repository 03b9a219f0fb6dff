//! # Pacemaker
//!
//! Generation engine for personalised running plans ("pacemakers").
//!
//! A runner's fitness is expressed as a VDOT score, estimated from a recent
//! one-mile pace or taken from their profile. The score selects per-type
//! training paces, which turn time-based workout sets into distances. The
//! nearest workout template is scaled to the requested distance and laid out
//! as kilometer segments, refined by an external reasoning service in two
//! sequential stages, and stored for polling. Each runner gets a small number
//! of plan requests per calendar day.
//!
//! ## Modules
//!
//! - `pace` - pace values, the VDOT pace table and the mile-pace estimator
//! - `workout` - workout catalog, unit conversion and template selection
//! - `plan` - runner profiles, the pacemaker aggregate and draft assembly
//! - `quota` - per-runner daily request quota
//! - `reasoning` - reasoning service contract, HTTP client, prompts and replies
//! - `orchestrator` - the request pipeline tying everything together
//! - `storage` - plan and counter stores (memory, file, redis)
//! - `config` - engine settings from TOML and environment
//! - `error` - coded error type shared by the crate
//! - `app` / `cli` - binary plumbing: logging, fatal errors, commands
//! - `testing` - mock reasoning service and fixtures

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pace;
pub mod plan;
pub mod quota;
pub mod reasoning;
pub mod storage;
pub mod workout;

pub mod testing;

pub use error::{ErrorCode, LibResult, PacemakerError};
pub use orchestrator::{OrchestratorSettings, PlanHandle, PlanOrchestrator};
