// Domain Layer - Probe results, log records and environment facts

pub mod location;
pub mod path_env;
pub mod probe;
pub mod record;

// Re-exports
pub use location::PathCheck;
pub use path_env::{decompose_path, PathListing, PATH_SEPARATOR, PATH_VAR};
pub use probe::{ProbeOutcome, ProbeRequest, ProbeResult, COMMAND_NOT_FOUND};
pub use record::{LogRecord, RunContext};
