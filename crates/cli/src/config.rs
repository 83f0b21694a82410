//! Run settings assembled from command-line arguments and environment

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use envprobe_core::application::DiagnosticPlan;
use envprobe_core::domain::RunContext;

pub const DEFAULT_LOG_PATH: &str = "debug.log";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Session id of ad-hoc (single step) plans
pub const ADHOC_SESSION_ID: &str = "envprobe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_path: PathBuf,
    pub session_id: Option<String>,
    pub run_id: Option<String>,
    pub timeout: Duration,
    pub strict: bool,
    pub json: bool,
}

impl Settings {
    /// Build settings, expanding `~` and `$VARS` in the log path
    pub fn new(
        log_path: &str,
        session_id: Option<String>,
        run_id: Option<String>,
        timeout_secs: u64,
        strict: bool,
        json: bool,
    ) -> Result<Self> {
        let expanded = shellexpand::full(log_path)
            .with_context(|| format!("Invalid log path: {}", log_path))?;

        Ok(Self {
            log_path: PathBuf::from(expanded.into_owned()),
            session_id,
            run_id,
            timeout: Duration::from_secs(timeout_secs),
            strict,
            json,
        })
    }

    /// Ids for this run: explicit settings win over the plan's defaults
    pub fn run_context(&self, plan: &DiagnosticPlan) -> RunContext {
        RunContext::new(
            self.session_id.clone().unwrap_or_else(|| plan.session_id.clone()),
            self.run_id.clone().unwrap_or_else(|| plan.run_id.clone()),
        )
    }
}
