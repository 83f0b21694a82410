// Log Sink Port
// Append-only destination for diagnostic records

use crate::domain::LogRecord;

/// Log sink trait
///
/// `append` must never abort the caller: write failures are reported to the
/// console by the implementation and swallowed.
pub trait LogSink: Send + Sync {
    /// Append one record
    fn append(&self, record: &LogRecord);

    /// Human-readable name of the destination (e.g. the file path)
    fn describe(&self) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory sink that keeps every appended record
    #[derive(Default, Clone)]
    pub struct MemoryLogSink {
        records: Arc<Mutex<Vec<LogRecord>>>,
    }

    impl MemoryLogSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<LogRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl LogSink for MemoryLogSink {
        fn append(&self, record: &LogRecord) {
            self.records.lock().unwrap().push(record.clone());
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }
}
