// Diagnostic report: what each step of a session found
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{PathCheck, ProbeResult};

/// What one step found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDetail {
    Command(ProbeResult),
    PathVar {
        total: usize,
        /// Matching entries per keyword
        matches: BTreeMap<String, Vec<String>>,
    },
    Location(PathCheck),
    /// Not run because a prerequisite step failed
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub hypothesis_id: String,
    pub label: String,
    pub detail: EntryDetail,
}

impl ReportEntry {
    /// Whether the checked fact holds
    ///
    /// PATH inspections always pass; they report, they do not assert.
    pub fn passed(&self) -> bool {
        match &self.detail {
            EntryDetail::Command(result) => result.available,
            EntryDetail::PathVar { .. } => true,
            EntryDetail::Location(check) => check.is_complete(),
            EntryDetail::Skipped { .. } => false,
        }
    }
}

/// Entries of one session, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub entries: Vec<ReportEntry>,
}

impl DiagnosticReport {
    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn get(&self, hypothesis_id: &str) -> Option<&ReportEntry> {
        self.entries
            .iter()
            .find(|entry| entry.hypothesis_id == hypothesis_id)
    }

    /// True if the named step was a command that succeeded
    pub fn command_succeeded(&self, hypothesis_id: &str) -> bool {
        matches!(
            self.get(hypothesis_id).map(|entry| &entry.detail),
            Some(EntryDetail::Command(result)) if result.available
        )
    }

    pub fn all_passed(&self) -> bool {
        self.entries.iter().all(ReportEntry::passed)
    }

    pub fn failures(&self) -> Vec<&ReportEntry> {
        self.entries.iter().filter(|entry| !entry.passed()).collect()
    }
}
