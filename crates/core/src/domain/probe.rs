// Command probe domain types
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ProbeError;

/// Fixed error text reported when the executable cannot be located
pub const COMMAND_NOT_FOUND: &str = "command not found";

/// A single command invocation to probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub command: String,
    pub args: Vec<String>,
    /// Working directory for the child (inherits ours when None)
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
    /// Truncate captured stdout/stderr to this many characters
    pub output_limit: Option<usize>,
}

impl ProbeRequest {
    /// Create a probe request
    ///
    /// # Example
    /// ```text
    /// let request = ProbeRequest::new("uv", ["--version"], Duration::from_secs(5));
    /// ```
    pub fn new<I, S>(command: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
            timeout,
            output_limit: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = Some(limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line as a human would type it
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decode captured bytes, trim, then apply `output_limit`
    pub fn clip(&self, raw: &[u8]) -> String {
        let text = String::from_utf8_lossy(raw);
        let trimmed = text.trim();
        match self.output_limit {
            Some(limit) => trimmed.chars().take(limit).collect(),
            None => trimmed.to_string(),
        }
    }
}

/// Classified probe outcome
///
/// Keeps "found but failed" apart from "not found", which the
/// `available` flag alone cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success,
    FoundButFailed,
    NotFound,
    TimedOut,
    SpawnFailed,
}

impl ProbeOutcome {
    /// True when the executable was located, whatever it returned
    pub fn was_found(self) -> bool {
        matches!(self, Self::Success | Self::FoundButFailed | Self::TimedOut)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::FoundButFailed => "found_but_failed",
            Self::NotFound => "not_found",
            Self::TimedOut => "timed_out",
            Self::SpawnFailed => "spawn_failed",
        }
    }
}

/// Outcome of attempting to run a command
///
/// Invariant: `available == (outcome == Success)`, `output` is set only when
/// available and `error` only when not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub available: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    pub outcome: ProbeOutcome,
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
}

impl ProbeResult {
    /// Process exited with status 0
    pub fn success(output: String, exit_code: Option<i32>, duration_ms: i64) -> Self {
        Self {
            available: true,
            output: Some(output),
            error: None,
            outcome: ProbeOutcome::Success,
            exit_code,
            duration_ms,
        }
    }

    /// Fold a probe failure into a result
    pub fn from_error(err: ProbeError, duration_ms: i64) -> Self {
        let (outcome, exit_code, error) = match err {
            ProbeError::NotFound => (ProbeOutcome::NotFound, None, COMMAND_NOT_FOUND.to_string()),
            ProbeError::NonZeroExit { code, stderr } => {
                (ProbeOutcome::FoundButFailed, code, stderr)
            }
            err @ ProbeError::Timeout(_) => (ProbeOutcome::TimedOut, None, err.to_string()),
            ProbeError::SpawnFailure(reason) => (ProbeOutcome::SpawnFailed, None, reason),
        };

        Self {
            available: false,
            output: None,
            error: Some(error),
            outcome,
            exit_code,
            duration_ms,
        }
    }

    /// Short text for console output: the version line or the error
    pub fn summary(&self) -> &str {
        let text = if self.available {
            self.output.as_deref()
        } else {
            self.error.as_deref()
        };
        text.and_then(|t| t.lines().next()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProbeRequest {
        ProbeRequest::new("uv", ["--version"], Duration::from_secs(5))
    }

    #[test]
    fn test_command_line() {
        assert_eq!(request().command_line(), "uv --version");
        let bare = ProbeRequest::new("pwd", Vec::<String>::new(), Duration::from_secs(1));
        assert_eq!(bare.command_line(), "pwd");
    }

    #[test]
    fn test_clip_trims_and_truncates_by_chars() {
        assert_eq!(request().clip(b"  uv 0.4.1\n"), "uv 0.4.1");

        let limited = request().with_output_limit(3);
        // Multi-byte characters must not be split
        assert_eq!(limited.clip("  命令不存在  ".as_bytes()), "命令不");
    }

    #[test]
    fn test_success_invariants() {
        let result = ProbeResult::success("uv 0.4.1".to_string(), Some(0), 12);
        assert!(result.available);
        assert_eq!(result.outcome, ProbeOutcome::Success);
        assert_eq!(result.output.as_deref(), Some("uv 0.4.1"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_from_error_not_found_uses_sentinel() {
        let result = ProbeResult::from_error(ProbeError::NotFound, 1);
        assert!(!result.available);
        assert!(result.output.is_none());
        assert_eq!(result.error.as_deref(), Some(COMMAND_NOT_FOUND));
        assert_eq!(result.outcome, ProbeOutcome::NotFound);
        assert!(!result.outcome.was_found());
    }

    #[test]
    fn test_from_error_non_zero_keeps_exit_code() {
        let result = ProbeResult::from_error(
            ProbeError::NonZeroExit {
                code: Some(2),
                stderr: "bad flag".to_string(),
            },
            3,
        );
        assert!(!result.available);
        assert_eq!(result.exit_code, Some(2));
        assert_eq!(result.error.as_deref(), Some("bad flag"));
        assert!(result.outcome.was_found());
    }

    #[test]
    fn test_from_error_timeout_describes_limit() {
        let result = ProbeResult::from_error(ProbeError::Timeout(500), 501);
        assert_eq!(result.outcome, ProbeOutcome::TimedOut);
        assert_eq!(result.error.as_deref(), Some("timed out after 500 ms"));
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(ProbeResult::from_error(ProbeError::NotFound, 0)).unwrap();
        assert_eq!(value["available"], false);
        assert_eq!(value["output"], serde_json::Value::Null);
        assert_eq!(value["outcome"], "not_found");
    }

    #[test]
    fn test_summary_takes_first_line() {
        let result = ProbeResult::success("pip 24.0\nfrom /usr/lib".to_string(), Some(0), 1);
        assert_eq!(result.summary(), "pip 24.0");
    }
}
