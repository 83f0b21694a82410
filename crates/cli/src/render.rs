//! Console report (presentational only, not a stable format)

use colored::Colorize;
use tabled::{Table, Tabled};

use envprobe_core::application::{DiagnosticReport, EntryDetail, ReportEntry};
use envprobe_core::domain::RunContext;

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Probe")]
    probe: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn status(entry: &ReportEntry) -> &'static str {
    match &entry.detail {
        EntryDetail::Skipped { .. } => "SKIP",
        EntryDetail::Command(result) if !result.available && result.outcome.was_found() => {
            "FAILED"
        }
        _ if entry.passed() => "OK",
        _ => "MISSING",
    }
}

fn detail(entry: &ReportEntry) -> String {
    match &entry.detail {
        EntryDetail::Command(result) if result.available => result.summary().to_string(),
        EntryDetail::Command(result) => {
            format!("{} ({})", result.summary(), result.outcome.as_str())
        }
        EntryDetail::PathVar { total, matches } => {
            let counts: Vec<String> = matches
                .iter()
                .map(|(keyword, found)| format!("{}: {}", keyword, found.len()))
                .collect();
            if counts.is_empty() {
                format!("{} entries", total)
            } else {
                format!("{} entries; {}", total, counts.join(", "))
            }
        }
        EntryDetail::Location(check) if !check.exists => "does not exist".to_string(),
        EntryDetail::Location(check) => {
            let kind = if check.is_dir { "directory" } else { "file" };
            let mut text = match &check.files {
                Some(files) => format!("{}, {} files", kind, files.len()),
                None => kind.to_string(),
            };
            let missing = check.missing_children();
            if !missing.is_empty() {
                text.push_str(&format!("; missing {}", missing.join(", ")));
            }
            if let Some(error) = &check.error {
                text.push_str(&format!("; {}", error));
            }
            text
        }
        EntryDetail::Skipped { reason } => reason.clone(),
    }
}

/// Table of every entry, in execution order
pub fn render_table(report: &DiagnosticReport) -> String {
    let rows: Vec<Row> = report
        .entries
        .iter()
        .map(|entry| Row {
            id: entry.hypothesis_id.clone(),
            probe: entry.label.clone(),
            status: status(entry),
            detail: detail(entry),
        })
        .collect();

    Table::new(rows).to_string()
}

pub fn print_report(plan: &str, context: &RunContext, report: &DiagnosticReport, log_target: &str) {
    println!("{}", format!("envprobe: {} results", plan).cyan().bold());
    println!(
        "  {} {}  {} {}",
        "Session:".bold(),
        context.session_id,
        "Run:".bold(),
        context.run_id
    );
    println!();
    println!("{}", render_table(report));
    println!();

    let failures = report.failures();
    if failures.is_empty() {
        println!("{}", "✓ All probes passed".green().bold());
    } else {
        let ids: Vec<&str> = failures.iter().map(|e| e.hypothesis_id.as_str()).collect();
        println!(
            "{}",
            format!("✗ {} probe(s) did not pass: {}", failures.len(), ids.join(", "))
                .yellow()
                .bold()
        );
    }
    println!("  {} {}", "Records appended to:".bold(), log_target);
}
