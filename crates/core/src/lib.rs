// envprobe Core - Domain Types, Ports & Diagnostic Sessions
// NO infrastructure dependencies (hexagonal layout)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{ProbeError, Result, SinkError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
