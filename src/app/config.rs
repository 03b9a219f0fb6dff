//! Application configuration
//!
//! Settings that belong to the command line process rather than the engine.

use crate::config::EngineConfig;
use crate::error::LibResult;
use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Engine settings file, if one was given
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn,pacemaker=info",
            1 => "info,pacemaker=debug",
            2 => "debug,pacemaker=trace",
            _ => "trace,hyper=debug,reqwest=debug",
        }
    }

    /// Load engine settings from the file (if any) and the environment
    pub fn engine_config(&self) -> LibResult<EngineConfig> {
        EngineConfig::load(self.config_path.as_deref())
    }
}
