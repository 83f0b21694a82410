//! envprobe CLI - Environment diagnostics with JSON Lines records
//!
//! Runs a fixed sequence of probes (tool availability, PATH contents,
//! directory layout), appends one record per probe to the log file and
//! prints a summary.

mod config;
mod render;
mod telemetry;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use envprobe_core::application::constants::DEFAULT_TOOL;
use envprobe_core::application::{DiagnosticPlan, DiagnosticSession};
use envprobe_core::domain::{ProbeRequest, PATH_VAR};
use envprobe_core::port::id_provider::UuidProvider;
use envprobe_core::port::time_provider::SystemTimeProvider;
use envprobe_core::port::{IdProvider, LogSink};
use envprobe_infra_system::{FsPathInspector, JsonlLogSink, SubprocessProbe};

use config::{Settings, ADHOC_SESSION_ID, DEFAULT_LOG_PATH, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(name = "envprobe")]
#[command(about = "Probe the local environment and log the findings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON Lines file that records are appended to
    #[arg(long, global = true, env = "ENVPROBE_LOG_PATH", default_value = DEFAULT_LOG_PATH)]
    log_path: String,

    /// Session id stamped on every record (default: the plan's)
    #[arg(long, global = true, env = "ENVPROBE_SESSION_ID")]
    session_id: Option<String>,

    /// Run id stamped on every record (default: the plan's)
    #[arg(long, global = true, env = "ENVPROBE_RUN_ID")]
    run_id: Option<String>,

    /// Timeout for each availability probe, in seconds
    #[arg(
        long,
        global = true,
        env = "ENVPROBE_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// Exit with status 1 when any probe does not pass
    #[arg(long, global = true)]
    strict: bool,

    /// Print the report as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose the environment a tool-launched server needs
    Diagnose {
        /// Tool expected on PATH
        #[arg(long, default_value = DEFAULT_TOOL)]
        tool: String,

        /// Project directory that should contain the server entrypoint
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Verify that the tool works, including inside the project directory
    Verify {
        /// Tool expected on PATH
        #[arg(long, default_value = DEFAULT_TOOL)]
        tool: String,

        /// Project directory that should contain the server entrypoint
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Probe a single command
    Probe {
        /// Command to run
        command: String,

        /// Arguments (default: --version)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Working directory for the command
        #[arg(long)]
        cwd: Option<PathBuf>,
    },

    /// Decompose a PATH-like environment variable
    Path {
        /// Variable to decompose
        #[arg(long, default_value = PATH_VAR)]
        var: String,

        /// Keyword to filter entries by (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,
    },

    /// Check that a file or directory exists
    Check {
        /// Path to check
        path: PathBuf,

        /// File expected inside the directory (repeatable)
        #[arg(short, long = "expect")]
        expect: Vec<String>,
    },
}

/// Build the plan for a subcommand
fn build_plan(command: Commands, settings: &Settings, ids: &dyn IdProvider) -> DiagnosticPlan {
    let timeout = settings.timeout;

    match command {
        Commands::Diagnose { tool, dir } => DiagnosticPlan::environment(&tool, dir, timeout),
        Commands::Verify { tool, dir } => DiagnosticPlan::verification(&tool, dir, timeout),
        Commands::Probe { command, args, cwd } => {
            let args = if args.is_empty() {
                vec!["--version".to_string()]
            } else {
                args
            };
            let mut request = ProbeRequest::new(command.clone(), args, timeout);
            if let Some(cwd) = cwd {
                request = request.in_dir(cwd);
            }
            DiagnosticPlan::new("probe", ADHOC_SESSION_ID, ids.generate_id()).command(
                "PROBE",
                format!("Check {} command availability", command),
                request,
            )
        }
        Commands::Path { var, filters } => {
            DiagnosticPlan::new("path", ADHOC_SESSION_ID, ids.generate_id()).path_var(
                "PATH",
                format!("Inspect {} environment variable", var),
                var,
                filters,
            )
        }
        Commands::Check { path, expect } => {
            DiagnosticPlan::new("check", ADHOC_SESSION_ID, ids.generate_id()).location(
                "CHECK",
                format!("Check {}", path.display()),
                path,
                expect,
            )
        }
    }
}

/// Snapshot of the inherited environment; non-UTF-8 values are converted lossily
fn inherited_env() -> HashMap<String, String> {
    std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_logging()?;

    let g = cli.global;
    let settings = Settings::new(
        &g.log_path,
        g.session_id,
        g.run_id,
        g.timeout_secs,
        g.strict,
        g.json,
    )?;

    let plan = build_plan(cli.command, &settings, &UuidProvider);
    let context = settings.run_context(&plan);

    info!(
        plan = %plan.name,
        log_path = %settings.log_path.display(),
        "envprobe v{} starting",
        envprobe_core::VERSION
    );

    // DI wiring
    let time_provider = Arc::new(SystemTimeProvider);
    let sink = Arc::new(JsonlLogSink::new(settings.log_path.clone()));
    let session = DiagnosticSession::new(
        Arc::new(SubprocessProbe::new(time_provider.clone())),
        sink.clone(),
        Arc::new(FsPathInspector::new()),
        time_provider,
        context.clone(),
    )
    .with_env(inherited_env());

    let report = session.run(&plan).await;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&plan.name, &context, &report, &sink.describe());
    }

    if settings.strict && !report.all_passed() {
        std::process::exit(1);
    }

    Ok(())
}
