//! Command line interface of the `pacemaker` binary

pub mod args;
pub mod handlers;

pub use args::{Cli, Commands, PlanArgs};
pub use handlers::execute;
