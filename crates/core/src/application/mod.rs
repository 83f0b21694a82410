// Application Layer - Diagnostic sessions, plans and reports

pub mod constants;
pub mod plan;
pub mod report;
pub mod session;

// Re-exports
pub use plan::{DiagnosticPlan, ProbeStep};
pub use report::{DiagnosticReport, EntryDetail, ReportEntry};
pub use session::DiagnosticSession;
