// Diagnostic plans: ordered probe steps run by one session
use std::path::PathBuf;

use super::constants::{
    DEFAULT_ENTRYPOINT, DIAGNOSIS_RUN_ID, DIAGNOSIS_SESSION_ID, RUN_OUTPUT_LIMIT,
    RUN_PROBE_TIMEOUT, VERIFICATION_RUN_ID, VERIFICATION_SESSION_ID,
};
use crate::domain::{ProbeRequest, RunContext, PATH_VAR};
use std::time::Duration;

/// One check within a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStep {
    /// Run an external command
    Command {
        hypothesis_id: String,
        message: String,
        request: ProbeRequest,
        /// Run only if this earlier command step succeeded
        requires: Option<String>,
    },
    /// Decompose a PATH-like variable and filter it by keywords
    PathVar {
        hypothesis_id: String,
        message: String,
        var: String,
        keywords: Vec<String>,
    },
    /// Check that a path exists, with optional expected children
    Location {
        hypothesis_id: String,
        message: String,
        path: PathBuf,
        expected_children: Vec<String>,
    },
}

impl ProbeStep {
    pub fn hypothesis_id(&self) -> &str {
        match self {
            Self::Command { hypothesis_id, .. }
            | Self::PathVar { hypothesis_id, .. }
            | Self::Location { hypothesis_id, .. } => hypothesis_id,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Command { message, .. }
            | Self::PathVar { message, .. }
            | Self::Location { message, .. } => message,
        }
    }

    /// Short label for the console report
    pub fn label(&self) -> String {
        match self {
            Self::Command { request, .. } => request.command_line(),
            Self::PathVar { var, .. } => format!("${}", var),
            Self::Location { path, .. } => path.display().to_string(),
        }
    }

    /// Operation half of the record's `location` tag
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Command { .. } => "probe_command",
            Self::PathVar { .. } => "probe_path_var",
            Self::Location { .. } => "probe_location",
        }
    }
}

/// An ordered list of probe steps plus the ids its records default to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticPlan {
    pub name: String,
    pub session_id: String,
    pub run_id: String,
    pub steps: Vec<ProbeStep>,
}

impl DiagnosticPlan {
    pub fn new(
        name: impl Into<String>,
        session_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            session_id: session_id.into(),
            run_id: run_id.into(),
            steps: Vec::new(),
        }
    }

    pub fn context(&self) -> RunContext {
        RunContext::new(self.session_id.clone(), self.run_id.clone())
    }

    pub fn command(
        mut self,
        hypothesis_id: impl Into<String>,
        message: impl Into<String>,
        request: ProbeRequest,
    ) -> Self {
        self.steps.push(ProbeStep::Command {
            hypothesis_id: hypothesis_id.into(),
            message: message.into(),
            request,
            requires: None,
        });
        self
    }

    /// Command step gated on an earlier command step's success
    pub fn command_requiring(
        mut self,
        hypothesis_id: impl Into<String>,
        message: impl Into<String>,
        request: ProbeRequest,
        requires: impl Into<String>,
    ) -> Self {
        self.steps.push(ProbeStep::Command {
            hypothesis_id: hypothesis_id.into(),
            message: message.into(),
            request,
            requires: Some(requires.into()),
        });
        self
    }

    pub fn path_var<I, S>(
        mut self,
        hypothesis_id: impl Into<String>,
        message: impl Into<String>,
        var: impl Into<String>,
        keywords: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.push(ProbeStep::PathVar {
            hypothesis_id: hypothesis_id.into(),
            message: message.into(),
            var: var.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn location<I, S>(
        mut self,
        hypothesis_id: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        expected_children: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.push(ProbeStep::Location {
            hypothesis_id: hypothesis_id.into(),
            message: message.into(),
            path: path.into(),
            expected_children: expected_children.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Environment diagnosis
    ///
    /// A: is `tool` installed, B: which PATH entries mention python or
    /// `tool`, C: is python available, D: does `project_dir` hold the
    /// server entrypoint, E: is pip available (to install `tool`).
    pub fn environment(tool: &str, project_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::new("environment", DIAGNOSIS_SESSION_ID, DIAGNOSIS_RUN_ID)
            .command(
                "A",
                format!("Check {} command availability", tool),
                ProbeRequest::new(tool, ["--version"], timeout),
            )
            .path_var("B", "Inspect PATH environment variable", PATH_VAR, ["python", tool])
            .command(
                "C",
                "Check python command availability",
                ProbeRequest::new("python", ["--version"], timeout),
            )
            .location(
                "D",
                "Check MCP server directory",
                project_dir,
                [DEFAULT_ENTRYPOINT],
            )
            .command(
                "E",
                format!("Check pip command availability (to install {})", tool),
                ProbeRequest::new("pip", ["--version"], timeout),
            )
    }

    /// Fix verification
    ///
    /// VERIFY_A: is `tool` callable now, VERIFY_B: can it run inside
    /// `project_dir` (only when VERIFY_A passed), VERIFY_C: directory layout.
    pub fn verification(tool: &str, project_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        let project_dir = project_dir.into();
        let dir_arg = project_dir.display().to_string();

        let run_help = ProbeRequest::new(
            tool,
            ["--directory", dir_arg.as_str(), "run", "--help"],
            RUN_PROBE_TIMEOUT,
        )
        .in_dir(project_dir.clone())
        .with_output_limit(RUN_OUTPUT_LIMIT);

        Self::new("verification", VERIFICATION_SESSION_ID, VERIFICATION_RUN_ID)
            .command(
                "VERIFY_A",
                format!("Verify {} command availability after fix", tool),
                ProbeRequest::new(tool, ["--version"], timeout),
            )
            .command_requiring(
                "VERIFY_B",
                format!("Verify {} run works in the MCP directory", tool),
                run_help,
                "VERIFY_A",
            )
            .location(
                "VERIFY_C",
                "Verify MCP server directory structure",
                project_dir,
                [DEFAULT_ENTRYPOINT],
            )
    }
}
