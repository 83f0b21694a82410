// Diagnostic log record (one JSON line per probe)
use serde::{Deserialize, Serialize};

/// Correlates every record written by one diagnostic session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub session_id: String,
    pub run_id: String,
}

impl RunContext {
    pub fn new(session_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            run_id: run_id.into(),
        }
    }
}

/// One diagnostic event
///
/// Keys are written in camelCase (`sessionId`, `hypothesisId`, ...) so the
/// file stays readable by tools that consume the existing debug logs.
/// Built once right before it is appended, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub session_id: String,
    pub run_id: String,
    pub hypothesis_id: String,
    /// Origin tag, `<component>:<operation>`
    pub location: String,
    pub message: String,
    pub data: serde_json::Value,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

impl LogRecord {
    pub fn new(
        context: &RunContext,
        hypothesis_id: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
        timestamp: i64,
    ) -> Self {
        Self {
            session_id: context.session_id.clone(),
            run_id: context.run_id.clone(),
            hypothesis_id: hypothesis_id.into(),
            location: location.into(),
            message: message.into(),
            data,
            timestamp,
        }
    }
}
