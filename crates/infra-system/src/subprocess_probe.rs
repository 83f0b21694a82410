// Subprocess probe implementation
// reason: tokio for async process management and timeouts
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{info, warn};

use envprobe_core::application::constants::TERMINATION_GRACE_PERIOD;
use envprobe_core::domain::{ProbeRequest, ProbeResult};
use envprobe_core::port::{CommandProbe, TimeProvider};
use envprobe_core::ProbeError;

/// Exit status plus everything the child wrote
struct CapturedOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Subprocess probe
/// Runs one command per call with piped output and a hard deadline
pub struct SubprocessProbe {
    time_provider: Arc<dyn TimeProvider>,
    grace_period: Duration,
}

impl SubprocessProbe {
    /// Create a new subprocess probe
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let probe = SubprocessProbe::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            grace_period: TERMINATION_GRACE_PERIOD,
        }
    }

    /// Override how long a timed-out child gets between SIGTERM and SIGKILL
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Reject requests that cannot possibly spawn
    fn validate(request: &ProbeRequest) -> Result<(), ProbeError> {
        if request.command.trim().is_empty() {
            return Err(ProbeError::SpawnFailure("empty command".to_string()));
        }
        if request.timeout.is_zero() {
            return Err(ProbeError::SpawnFailure(
                "timeout must be greater than zero".to_string(),
            ));
        }
        // A missing cwd also surfaces as ENOENT from spawn; check first so it
        // is not mistaken for a missing executable.
        if let Some(dir) = &request.working_dir {
            if !dir.is_dir() {
                return Err(ProbeError::SpawnFailure(format!(
                    "working directory {} does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Spawn child process and wait for output, bounded by the request timeout
    async fn spawn_and_wait(&self, request: &ProbeRequest) -> Result<CapturedOutput, ProbeError> {
        Self::validate(request)?;

        // Timeouts past the clock's range mean "no deadline"
        let deadline = Instant::now().checked_add(request.timeout);

        let mut command = Command::new(&request.command);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &request.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(classify_spawn_error)?;

        // Read both pipes concurrently so a chatty child cannot block on a full pipe
        let stdout_reader = PipeReader::spawn(child.stdout.take());
        let stderr_reader = PipeReader::spawn(child.stderr.take());

        let status = match within(deadline, child.wait()).await {
            Some(Ok(status)) => status,
            Some(Err(e)) => {
                stdout_reader.abort();
                stderr_reader.abort();
                return Err(ProbeError::SpawnFailure(format!(
                    "failed waiting for process: {}",
                    e
                )));
            }
            None => {
                stdout_reader.abort();
                stderr_reader.abort();
                self.terminate(&mut child).await;
                return Err(ProbeError::Timeout(
                    u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX),
                ));
            }
        };

        // A grandchild may still hold the pipes open; stop reading at the deadline
        let stdout = stdout_reader.collect(deadline).await;
        let stderr = stderr_reader.collect(deadline).await;

        Ok(CapturedOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// Build probe result from process output
    fn build_result(
        request: &ProbeRequest,
        output: CapturedOutput,
        duration_ms: i64,
    ) -> ProbeResult {
        if output.status.success() {
            ProbeResult::success(
                request.clip(&output.stdout),
                output.status.code(),
                duration_ms,
            )
        } else {
            ProbeResult::from_error(
                ProbeError::NonZeroExit {
                    code: output.status.code(),
                    stderr: request.clip(&output.stderr),
                },
                duration_ms,
            )
        }
    }

    /// Terminate a timed-out child: SIGTERM first, then SIGKILL if needed
    async fn terminate(&self, child: &mut Child) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = child.id() {
                info!(pid = %pid, "Sending SIGTERM to timed-out probe");
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
                    if let Ok(Ok(_)) = timeout(self.grace_period, child.wait()).await {
                        info!(pid = %pid, "Probe exited after SIGTERM");
                        return;
                    }
                    warn!(pid = %pid, "Probe did not exit after SIGTERM, sending SIGKILL");
                }
            }
        }

        // Already-reaped children report an error here; nothing left to do
        if let Err(e) = child.kill().await {
            warn!(error = %e, "Failed to kill timed-out probe");
        }
    }
}

/// Await `fut` until `deadline`; `None` if the deadline passed first
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Background reader that copies a pipe into a shared buffer until EOF
struct PipeReader {
    task: JoinHandle<()>,
    buf: Arc<Mutex<Vec<u8>>>,
}

impl PipeReader {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let shared = buf.clone();
        let task = tokio::spawn(async move {
            let Some(mut pipe) = pipe else { return };
            let mut chunk = [0u8; 4096];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        lock(&shared).extend_from_slice(&chunk[..n]);
                    }
                }
            }
        });
        Self { task, buf }
    }

    fn abort(&self) {
        self.task.abort();
    }

    /// Wait for EOF until `deadline`, then return whatever was read so far
    async fn collect(mut self, deadline: Option<Instant>) -> Vec<u8> {
        if within(deadline, &mut self.task).await.is_none() {
            self.task.abort();
        }
        std::mem::take(&mut *lock(&self.buf))
    }
}

fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn classify_spawn_error(err: io::Error) -> ProbeError {
    match err.kind() {
        io::ErrorKind::NotFound => ProbeError::NotFound,
        io::ErrorKind::PermissionDenied => {
            ProbeError::SpawnFailure(format!("permission denied: {}", err))
        }
        _ => ProbeError::SpawnFailure(err.to_string()),
    }
}

#[async_trait]
impl CommandProbe for SubprocessProbe {
    async fn run(&self, request: &ProbeRequest) -> ProbeResult {
        let start_time = self.time_provider.now_millis();

        info!(
            command = %request.command,
            args = ?request.args,
            working_dir = ?request.working_dir,
            timeout_ms = %request.timeout.as_millis(),
            "Starting command probe"
        );

        let outcome = self.spawn_and_wait(request).await;
        let duration_ms = self.time_provider.now_millis() - start_time;

        let result = match outcome {
            Ok(output) => Self::build_result(request, output, duration_ms),
            Err(e) => ProbeResult::from_error(e, duration_ms),
        };

        info!(
            command = %request.command,
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            outcome = result.outcome.as_str(),
            "Command probe completed"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envprobe_core::domain::{ProbeOutcome, COMMAND_NOT_FOUND};
    use envprobe_core::port::time_provider::SystemTimeProvider;

    fn probe() -> SubprocessProbe {
        SubprocessProbe::new(Arc::new(SystemTimeProvider))
    }

    fn request(command: &str, args: &[&str]) -> ProbeRequest {
        ProbeRequest::new(command, args.iter().copied(), Duration::from_secs(5))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_success() {
        let result = probe().run(&request("echo", &["hello"])).await;

        assert!(result.available);
        assert_eq!(result.outcome, ProbeOutcome::Success);
        assert_eq!(result.output.as_deref(), Some("hello"));
        assert!(result.error.is_none());
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_run_not_found() {
        let result = probe()
            .run(&request("definitely-not-a-real-binary-xyz", &["--version"]))
            .await;

        assert!(!result.available);
        assert_eq!(result.outcome, ProbeOutcome::NotFound);
        assert_eq!(result.error.as_deref(), Some(COMMAND_NOT_FOUND));
        assert!(result.output.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_non_zero_exit() {
        let result = probe()
            .run(&request("sh", &["-c", "echo out; echo oops >&2; exit 3"]))
            .await;

        assert!(!result.available);
        assert_eq!(result.outcome, ProbeOutcome::FoundButFailed);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.error.as_deref(), Some("oops"));
        assert!(result.output.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_timeout() {
        let slow = request("sleep", &["10"]).with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let result = probe().run(&slow).await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(!result.available);
        assert_eq!(result.outcome, ProbeOutcome::TimedOut);
        assert_eq!(result.error.as_deref(), Some("timed out after 200 ms"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_limit_applies() {
        let limited = request("echo", &["abcdefghij"]).with_output_limit(4);
        let result = probe().run(&limited).await;
        assert_eq!(result.output.as_deref(), Some("abcd"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();

        let result = probe().run(&request("pwd", &[]).in_dir(&canonical)).await;

        assert!(result.available);
        assert_eq!(result.output.as_deref(), Some(canonical.to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_missing_working_dir_is_not_command_not_found() {
        let result = probe()
            .run(&request("echo", &["hi"]).in_dir("/definitely/not/a/dir"))
            .await;

        assert_eq!(result.outcome, ProbeOutcome::SpawnFailed);
        assert!(result.error.unwrap().contains("working directory"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_huge_timeout_runs_without_deadline() {
        let unbounded = request("echo", &["hi"]).with_timeout(Duration::from_secs(u64::MAX));
        let result = probe().run(&unbounded).await;

        assert!(result.available);
        assert_eq!(result.output.as_deref(), Some("hi"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_read_before_deadline_is_kept() {
        let background = request("sh", &["-c", "sleep 5 & echo started"])
            .with_timeout(Duration::from_millis(500));

        let started = std::time::Instant::now();
        let result = probe().run(&background).await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(result.available);
        assert_eq!(result.output.as_deref(), Some("started"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sigterm_ignored_escalates_to_kill() {
        let stubborn = request("sh", &["-c", "trap '' TERM; while :; do sleep 0.05; done"])
            .with_timeout(Duration::from_millis(200));
        let probe = probe().with_grace_period(Duration::from_millis(100));

        let started = std::time::Instant::now();
        let result = probe.run(&stubborn).await;
        let elapsed = started.elapsed();

        assert_eq!(result.outcome, ProbeOutcome::TimedOut);
        // Grace period was waited out before SIGKILL
        assert!(elapsed >= Duration::from_millis(300), "took {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_executable_file_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("not-executable.sh");
        std::fs::write(&script, "#!/bin/sh\necho hi\n").unwrap();

        let result = probe()
            .run(&request(script.to_str().unwrap(), &[]))
            .await;

        assert!(!result.available);
        assert_eq!(result.outcome, ProbeOutcome::SpawnFailed);
        let error = result.error.unwrap();
        assert!(error.contains("permission denied"), "{}", error);
        assert_ne!(error, COMMAND_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_absorbed() {
        let zero = request("echo", &[]).with_timeout(Duration::ZERO);
        let result = probe().run(&zero).await;
        assert_eq!(result.outcome, ProbeOutcome::SpawnFailed);

        let empty = request("  ", &[]);
        let result = probe().run(&empty).await;
        assert_eq!(result.error.as_deref(), Some("empty command"));
    }
}
