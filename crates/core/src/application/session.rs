// Diagnostic session: runs probe steps in order and logs each one
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::constants::COMPONENT;
use super::plan::{DiagnosticPlan, ProbeStep};
use super::report::{DiagnosticReport, EntryDetail, ReportEntry};
use crate::domain::{LogRecord, PathCheck, PathListing, ProbeRequest, ProbeResult, RunContext};
use crate::port::{CommandProbe, LogSink, PathInspector, TimeProvider};

/// Runs probes sequentially, appending one record per executed probe
///
/// The environment is an explicit input so PATH inspection can be driven
/// by a synthetic map in tests.
pub struct DiagnosticSession {
    probe: Arc<dyn CommandProbe>,
    sink: Arc<dyn LogSink>,
    inspector: Arc<dyn PathInspector>,
    time_provider: Arc<dyn TimeProvider>,
    context: RunContext,
    env: HashMap<String, String>,
}

impl DiagnosticSession {
    /// Create a new session
    ///
    /// # Arguments
    /// * `probe` - Runs external commands
    /// * `sink` - Receives one record per probe
    /// * `inspector` - Checks filesystem paths
    /// * `time_provider` - Record timestamps
    /// * `context` - Session/run ids stamped on every record
    pub fn new(
        probe: Arc<dyn CommandProbe>,
        sink: Arc<dyn LogSink>,
        inspector: Arc<dyn PathInspector>,
        time_provider: Arc<dyn TimeProvider>,
        context: RunContext,
    ) -> Self {
        Self {
            probe,
            sink,
            inspector,
            time_provider,
            context,
            env: HashMap::new(),
        }
    }

    /// Environment that PATH-like variables are read from
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Run every step of `plan`, in order
    pub async fn run(&self, plan: &DiagnosticPlan) -> DiagnosticReport {
        info!(
            plan = %plan.name,
            session_id = %self.context.session_id,
            run_id = %self.context.run_id,
            steps = plan.steps.len(),
            "Starting diagnostic session"
        );

        let mut report = DiagnosticReport::default();

        for step in &plan.steps {
            let detail = match step {
                ProbeStep::Command {
                    hypothesis_id,
                    message,
                    request,
                    requires,
                } => match requires {
                    Some(prerequisite) if !report.command_succeeded(prerequisite) => {
                        debug!(
                            hypothesis_id = %hypothesis_id,
                            requires = %prerequisite,
                            "Skipping step, prerequisite did not succeed"
                        );
                        EntryDetail::Skipped {
                            reason: format!("requires {} to succeed", prerequisite),
                        }
                    }
                    _ => EntryDetail::Command(
                        self.probe_command(hypothesis_id, message, request).await,
                    ),
                },
                ProbeStep::PathVar {
                    hypothesis_id,
                    message,
                    var,
                    keywords,
                } => {
                    let listing = self.probe_path_var(hypothesis_id, message, var, keywords);
                    EntryDetail::PathVar {
                        total: listing.len(),
                        matches: keywords
                            .iter()
                            .map(|keyword| (keyword.clone(), listing.filtered_by(keyword)))
                            .collect::<BTreeMap<_, _>>(),
                    }
                }
                ProbeStep::Location {
                    hypothesis_id,
                    message,
                    path,
                    expected_children,
                } => EntryDetail::Location(self.probe_location(
                    hypothesis_id,
                    message,
                    path,
                    expected_children,
                )),
            };

            report.push(ReportEntry {
                hypothesis_id: step.hypothesis_id().to_string(),
                label: step.label(),
                detail,
            });
        }

        let failures = report.failures().len();
        info!(
            plan = %plan.name,
            failures = failures,
            "Diagnostic session completed"
        );

        report
    }

    /// Run one command probe and log it
    pub async fn probe_command(
        &self,
        hypothesis_id: &str,
        message: &str,
        request: &ProbeRequest,
    ) -> ProbeResult {
        let result = self.probe.run(request).await;

        if !result.available {
            warn!(
                hypothesis_id = %hypothesis_id,
                command = %request.command_line(),
                outcome = result.outcome.as_str(),
                "Command probe failed"
            );
        }

        self.record(
            hypothesis_id,
            "probe_command",
            message,
            json!({
                "command": request.command,
                "args": request.args,
                "result": result,
            }),
        );

        result
    }

    /// Decompose a PATH-like variable from the session environment and log it
    pub fn probe_path_var(
        &self,
        hypothesis_id: &str,
        message: &str,
        var: &str,
        keywords: &[String],
    ) -> PathListing {
        let listing = PathListing::from_env(&self.env, var);

        debug!(
            var = %var,
            entries = listing.len(),
            "PATH variable decomposed"
        );

        self.record(hypothesis_id, "probe_path_var", message, listing.report(keywords));
        listing
    }

    /// Check a filesystem path and log it
    pub fn probe_location(
        &self,
        hypothesis_id: &str,
        message: &str,
        path: &Path,
        expected_children: &[String],
    ) -> PathCheck {
        let check = self.inspector.inspect(path, expected_children);

        self.record(
            hypothesis_id,
            "probe_location",
            message,
            serde_json::to_value(&check).unwrap_or_else(|e| json!({ "error": e.to_string() })),
        );

        check
    }

    fn record(&self, hypothesis_id: &str, operation: &str, message: &str, data: serde_json::Value) {
        let record = LogRecord::new(
            &self.context,
            hypothesis_id,
            format!("{}:{}", COMPONENT, operation),
            message,
            data,
            self.time_provider.now_millis(),
        );
        self.sink.append(&record);
    }
}
