// crates/uid-firewall-cli/src/main.rs
// ============================================================================
// Module: UID Firewall CLI Entry Point
// Description: Command dispatcher for chain inspection and dry runs.
// Purpose: Provide a safe, localized CLI over the firewall engine.
// Dependencies: clap, uid-firewall-cli, uid-firewall-config, uid-firewall-core, serde_jcs
// ============================================================================

//! ## Overview
//! The UID firewall CLI lists registered chains, validates configuration, and
//! runs the engine against a recording packet filter so operators can see
//! exactly which port calls a config or command script produces. All
//! user-facing strings are routed through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;
use uid_firewall_cli::runner::DryRun;
use uid_firewall_cli::runner::DryRunOptions;
use uid_firewall_cli::runner::ReadLimitError;
use uid_firewall_cli::runner::RunnerError;
use uid_firewall_cli::t;
use uid_firewall_config::FirewallConfig;
use uid_firewall_core::ChainRegistry;
use uid_firewall_core::TrafficContext;
use uid_firewall_core::Uid;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "uid-firewall", disable_help_subcommand = true, disable_version_flag = true)]
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
    /// Registered chain catalog.
    Chains {
        /// Selected chains subcommand.
        #[command(subcommand)]
        command: ChainsCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Apply config bootstrap and a command script against a recording filter.
    Apply(ApplyCommand),
    /// Evaluate a UID against the chain state produced by a dry run.
    Evaluate(EvaluateCommand),
}

/// Chain catalog subcommands.
#[derive(Subcommand, Debug)]
enum ChainsCommand {
    /// List registered chains.
    List(ChainsListCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a UID firewall configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for chain listing.
#[derive(Args, Debug)]
struct ChainsListCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to uid-firewall.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Inputs shared by dry-run commands.
#[derive(Args, Debug)]
struct DryRunArgs {
    /// Config file whose chain sections are applied first.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON command script applied after the config.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
    /// Enable a feature flag in addition to the configured ones.
    #[arg(long = "enable-flag", value_name = "FLAG")]
    enable_flags: Vec<String>,
}

impl DryRunArgs {
    /// Converts CLI arguments into runner options.
    fn into_options(self) -> DryRunOptions {
        DryRunOptions {
            config: self.config,
            script: self.script,
            enable_flags: self.enable_flags,
        }
    }
}

/// Arguments for `apply`.
#[derive(Args, Debug)]
struct ApplyCommand {
    /// Dry-run inputs.
    #[command(flatten)]
    inputs: DryRunArgs,
}

/// Arguments for `evaluate`.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// UID to evaluate.
    #[arg(long, value_name = "UID")]
    uid: u32,
    /// Traffic is on a metered network.
    #[arg(long, action = ArgAction::SetTrue)]
    metered: bool,
    /// Data saver is on.
    #[arg(long, action = ArgAction::SetTrue)]
    data_saver: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Dry-run inputs.
    #[command(flatten)]
    inputs: DryRunArgs,
}

/// Output formats.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OutputFormat {
    /// Canonical JSON output.
    Json,
    /// Human-readable text output.
    Text,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
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
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Chains {
            command,
        } => command_chains(&command),
        Commands::Config {
            command,
        } => command_config(&command),
        Commands::Apply(command) => command_apply(command),
        Commands::Evaluate(command) => command_evaluate(command),
    }
}

/// Prints CLI help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Chain Commands
// ============================================================================

/// Dispatches chain subcommands.
fn command_chains(command: &ChainsCommand) -> CliResult<ExitCode> {
    match command {
        ChainsCommand::List(command) => command_chains_list(command),
    }
}

/// Executes the chain listing command.
fn command_chains_list(command: &ChainsListCommand) -> CliResult<ExitCode> {
    let registry = ChainRegistry::standard();
    match command.format {
        OutputFormat::Json => {
            let chains: Vec<_> = registry.iter().collect();
            write_canonical_json(&chains)?;
        }
        OutputFormat::Text => {
            write_stdout_bytes(render_chain_list(&registry).as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders the chain catalog as text.
fn render_chain_list(registry: &ChainRegistry) -> String {
    let mut output = t!("chains.list.header");
    output.push('\n');
    for descriptor in registry.iter() {
        let gate = descriptor
            .feature_flag
            .as_ref()
            .map_or_else(|| t!("chains.list.gate.none"), ToString::to_string);
        output.push_str(&t!(
            "chains.list.entry",
            id = descriptor.id,
            name = descriptor.name,
            kind = descriptor.kind.as_str(),
            default = descriptor.default_rule(),
            toggle = descriptor.toggle.as_str(),
            scope = descriptor.scope.as_str(),
            gate = gate
        ));
        output.push('\n');
    }
    output
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = FirewallConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let commands = config
        .bootstrap_commands(&ChainRegistry::standard())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!(
        "config.validate.summary",
        chains = config.chains.len(),
        commands = commands.len(),
        flags = config.features.enabled.len()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Dry-Run Commands
// ============================================================================

/// Executes the `apply` command.
fn command_apply(command: ApplyCommand) -> CliResult<ExitCode> {
    let dry_run = DryRun::prepare(&command.inputs.into_options()).map_err(runner_error)?;
    let report = dry_run.report().map_err(runner_error)?;
    write_canonical_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `evaluate` command.
fn command_evaluate(command: EvaluateCommand) -> CliResult<ExitCode> {
    let context = TrafficContext {
        metered: command.metered,
        data_saver: command.data_saver,
    };
    let uid = Uid::new(command.uid);
    let dry_run = DryRun::prepare(&command.inputs.into_options()).map_err(runner_error)?;
    let report = dry_run.evaluate(uid, context).map_err(runner_error)?;
    match command.format {
        OutputFormat::Json => write_canonical_json(&report)?,
        OutputFormat::Text => {
            let line = match (report.blocked_by, report.blocked_by_name) {
                (Some(chain_id), Some(chain)) => {
                    t!("evaluate.blocked", uid = uid, chain = chain, chain_id = chain_id)
                }
                _ => t!("evaluate.allowed", uid = uid),
            };
            write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Maps runner failures to localized CLI errors.
fn runner_error(err: RunnerError) -> CliError {
    let message = match err {
        RunnerError::Config(error) => t!("config.load_failed", error = error),
        RunnerError::Read {
            path,
            error: ReadLimitError::Io(error),
        } => t!(
            "input.read_failed",
            kind = t!("input.kind.script"),
            path = path.display(),
            error = error
        ),
        RunnerError::Read {
            path,
            error: ReadLimitError::TooLarge {
                size,
                limit,
            },
        } => t!(
            "input.read_too_large",
            kind = t!("input.kind.script"),
            path = path.display(),
            size = size,
            limit = limit
        ),
        RunnerError::Script {
            path,
            error,
        } => t!("script.parse_failed", path = path.display(), error = error),
        RunnerError::Command {
            index,
            operation,
            error,
        } => t!("command.failed", index = index, operation = operation, error = error),
        RunnerError::Engine(error) => t!("engine.query_failed", error = error),
    };
    CliError::new(message)
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

/// Serializes a value as canonical JSON followed by a newline.
fn canonical_json_bytes<T: Serialize>(value: &T) -> CliResult<Vec<u8>> {
    let value = serde_json::to_value(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    let mut bytes = serde_jcs::to_vec(&value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes canonical JSON to stdout.
fn write_canonical_json<T: Serialize>(value: &T) -> CliResult<()> {
    let bytes = canonical_json_bytes(value)?;
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
