// Command Probe Port
// Abstraction for running one external command under a timeout

use crate::domain::{ProbeRequest, ProbeResult};
use async_trait::async_trait;

/// Command probe trait
///
/// Implementations:
/// - SubprocessProbe: spawns the command as a child process
/// - mocks::MockCommandProbe: canned results for tests
#[async_trait]
pub trait CommandProbe: Send + Sync {
    /// Run the command and classify the outcome
    ///
    /// Never fails: not-found, non-zero exit, timeout and spawn errors are
    /// all reported through the returned `ProbeResult`.
    ///
    /// # Example
    /// ```text
    /// let result = probe.run(&ProbeRequest::new("uv", ["--version"], timeout)).await;
    /// if !result.available {
    ///     println!("uv unavailable: {:?}", result.error);
    /// }
    /// ```
    async fn run(&self, request: &ProbeRequest) -> ProbeResult;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::ProbeError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock probe behavior for one command
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0 with this stdout
        Success(String),
        /// Exit with this code and stderr
        Fail(i32, String),
        /// Timeout after N ms
        Timeout(u64),
    }

    /// Mock Command Probe; commands without a behavior are "not found"
    #[derive(Default)]
    pub struct MockCommandProbe {
        behaviors: Arc<Mutex<HashMap<String, MockBehavior>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockCommandProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(self, command: impl Into<String>, behavior: MockBehavior) -> Self {
            self.behaviors
                .lock()
                .unwrap()
                .insert(command.into(), behavior);
            self
        }

        /// Command lines seen so far, in call order
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandProbe for MockCommandProbe {
        async fn run(&self, request: &ProbeRequest) -> ProbeResult {
            self.calls.lock().unwrap().push(request.command_line());

            let behavior = self.behaviors.lock().unwrap().get(&request.command).cloned();

            match behavior {
                Some(MockBehavior::Success(stdout)) => {
                    ProbeResult::success(request.clip(stdout.as_bytes()), Some(0), 1)
                }
                Some(MockBehavior::Fail(code, stderr)) => ProbeResult::from_error(
                    ProbeError::NonZeroExit {
                        code: Some(code),
                        stderr: request.clip(stderr.as_bytes()),
                    },
                    1,
                ),
                Some(MockBehavior::Timeout(ms)) => {
                    ProbeResult::from_error(ProbeError::Timeout(ms), ms as i64)
                }
                None => ProbeResult::from_error(ProbeError::NotFound, 0),
            }
        }
    }
}
