// Port Layer - Interfaces for external dependencies

pub mod command_probe;
pub mod id_provider;
pub mod log_sink;
pub mod path_inspector;
pub mod time_provider;

// Re-exports
pub use command_probe::CommandProbe;
pub use id_provider::IdProvider;
pub use log_sink::LogSink;
pub use path_inspector::PathInspector;
pub use time_provider::TimeProvider;
