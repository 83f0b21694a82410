// envprobe Infrastructure - System Adapters
// Implements: CommandProbe, LogSink, PathInspector

pub mod fs_inspector;
pub mod jsonl_sink;
pub mod subprocess_probe;

pub use fs_inspector::FsPathInspector;
pub use jsonl_sink::JsonlLogSink;
pub use subprocess_probe::SubprocessProbe;
