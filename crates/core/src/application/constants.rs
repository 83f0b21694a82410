// Diagnostic constants (no magic values)
use std::time::Duration;

/// Timeout for `--version` style availability probes (5s)
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for probes that run a tool subcommand inside a project (10s)
pub const RUN_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Characters of stdout/stderr kept from subcommand probes
pub const RUN_OUTPUT_LIMIT: usize = 200;

/// Component prefix of every record's `location` tag
pub const COMPONENT: &str = "envprobe";

/// Tool checked by the built-in plans when none is given
pub const DEFAULT_TOOL: &str = "uv";

/// File expected inside the project directory by the built-in plans
pub const DEFAULT_ENTRYPOINT: &str = "server.py";

/// Session/run ids of the environment diagnosis plan
pub const DIAGNOSIS_SESSION_ID: &str = "mcp-diagnosis";
pub const DIAGNOSIS_RUN_ID: &str = "diagnosis";

/// Session/run ids of the fix verification plan
pub const VERIFICATION_SESSION_ID: &str = "uv-verification";
pub const VERIFICATION_RUN_ID: &str = "verification";

/// Grace period between SIGTERM and SIGKILL for a timed-out probe (500ms)
pub const TERMINATION_GRACE_PERIOD: Duration = Duration::from_millis(500);
