// crates/connector-sentinel-cli/src/main.rs
// ============================================================================
// Module: Connector Sentinel CLI Entry Point
// Description: Command dispatcher for connector verification runs.
// Purpose: Run verification cases and map their results to an exit code.
// Dependencies: clap, connector-sentinel-*, serde_json, thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! `connector-sentinel run` verifies the configured connectors against the
//! gateway and escalates outages through the configured incident backend.
//! `list` prints the configured connectors and `config check` validates the
//! harness configuration file. Diagnostics go to stderr through `tracing`;
//! results go to stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use connector_sentinel_cli::backend::build_reporter;
use connector_sentinel_cli::runner::run_cases;
use connector_sentinel_config::EnvConfigSource;
use connector_sentinel_config::SentinelConfig;
use connector_sentinel_core::CaseEnvironment;
use connector_sentinel_core::RandomNameGenerator;
use connector_sentinel_gateway::MySqlGateway;
use thiserror::Error;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "connector-sentinel", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify connectors against the gateway.
    Run(RunCommand),
    /// List configured connectors.
    List(ListCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Connector Sentinel configuration file.
    Check(ConfigCheckCommand),
}

/// Arguments for verification runs.
#[derive(Args, Debug)]
struct RunCommand {
    /// Optional config file path (defaults to connector-sentinel.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Connector to verify (repeatable; defaults to all).
    #[arg(long = "connector", value_name = "NAME")]
    connectors: Vec<String>,
    /// Report incidents to stderr instead of the configured backend.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Exit non-zero when any case fails.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
    /// Output format for results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for connector listing.
#[derive(Args, Debug)]
struct ListCommand {
    /// Optional config file path (defaults to connector-sentinel.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to connector-sentinel.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Output formats for run results.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs the stderr log subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("connector-sentinel {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(&command),
        Commands::List(command) => command_list(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let descriptors = config
        .select_connectors(&command.connectors)
        .map_err(|err| CliError::new(err.to_string()))?;
    let lookup = |name: &str| std::env::var(name).ok();
    let selected = build_reporter(&config.incidents, command.dry_run, lookup)
        .map_err(|err| CliError::new(err.to_string()))?;
    let gateway = MySqlGateway::new(Duration::from_millis(config.gateway.connect_timeout_ms))
        .map_err(|err| CliError::new(err.to_string()))?;
    let names = RandomNameGenerator::new();
    let source = EnvConfigSource::default();
    let env = CaseEnvironment {
        gateway: &gateway,
        names: &names,
        reporter: selected.reporter.as_ref(),
    };

    info!(
        connectors = descriptors.len(),
        backend = selected.label,
        strict = command.strict,
        "starting verification run"
    );
    let summary = run_cases(descriptors, &config.case_settings(), &source, &env);

    match command.format {
        OutputFormat::Text => write_stdout_bytes(summary.render_text().as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
        OutputFormat::Json => write_json(&summary)?,
    }

    if summary.succeeded(command.strict) {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            failed = summary.failed_cases(),
            config_failures = summary.config_failures.len(),
            "verification run failed"
        );
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// SECTION: List and Config Commands
// ============================================================================

/// Executes the `list` command.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let output: String = config
        .connectors
        .iter()
        .map(|connector| {
            format!(
                "{}\t{}\t{}\t{}\n",
                connector.name,
                connector.target.as_str(),
                connector.connector_type,
                connector.display_name
            )
        })
        .collect();
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Check(command) => command_config_check(command),
    }
}

/// Executes the config validation command.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    write_stdout_line(&format!("config ok: {} connectors", config.connectors.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates the harness configuration.
fn load_config(path: Option<&Path>) -> CliResult<SentinelConfig> {
    SentinelConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a JSON document followed by a newline to stdout.
fn write_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
