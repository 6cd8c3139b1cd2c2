// crates/uid-firewall-cli/src/runner.rs
// ============================================================================
// Module: CLI Dry-Run Runner
// Description: Drives a firewall engine against the in-memory packet filter.
// Purpose: Apply config bootstrap and command scripts without a kernel.
// Dependencies: uid-firewall-config, uid-firewall-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A dry run builds a fresh engine over [`InMemoryPacketFilter`], applies the
//! configured bootstrap commands and then an optional JSON command script,
//! and stops at the first failing command. The recorded port calls and the
//! resulting chain snapshots are what the CLI reports.
//!
//! Script inputs are untrusted; reads are bounded before parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use uid_firewall_config::ConfigError;
use uid_firewall_config::FirewallConfig;
use uid_firewall_core::ChainId;
use uid_firewall_core::ChainRegistry;
use uid_firewall_core::ChainSnapshot;
use uid_firewall_core::FirewallCommand;
use uid_firewall_core::FirewallEngine;
use uid_firewall_core::FirewallError;
use uid_firewall_core::FirewallOperation;
use uid_firewall_core::InMemoryPacketFilter;
use uid_firewall_core::PortCall;
use uid_firewall_core::StaticFeatureGate;
use uid_firewall_core::TrafficContext;
use uid_firewall_core::Uid;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a command script in bytes.
pub const MAX_SCRIPT_BYTES: usize = 1024 * 1024;
/// Maximum number of commands in a single script.
pub const MAX_SCRIPT_COMMANDS: usize = 16_384;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
pub enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Dry-run failures.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Script file could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// Script path.
        path: PathBuf,
        /// Read failure.
        error: ReadLimitError,
    },
    /// Script file is not a valid command list.
    #[error("failed to parse command script {}: {error}", path.display())]
    Script {
        /// Script path.
        path: PathBuf,
        /// Parser message.
        error: String,
    },
    /// A bootstrap or script command failed.
    #[error("command {index} ({operation}) failed: {error}")]
    Command {
        /// One-based position in the combined bootstrap and script sequence.
        index: usize,
        /// Operation the command maps to.
        operation: FirewallOperation,
        /// Engine error.
        error: FirewallError,
    },
    /// Chain state could not be read back.
    #[error(transparent)]
    Engine(FirewallError),
}

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Inputs for a dry run.
#[derive(Debug, Clone, Default)]
pub struct DryRunOptions {
    /// Config file path; no config means an empty configuration.
    pub config: Option<PathBuf>,
    /// JSON command script applied after the bootstrap commands.
    pub script: Option<PathBuf>,
    /// Extra feature flags enabled on top of the configured ones.
    pub enable_flags: Vec<String>,
}

/// Reads a file from disk while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`ReadLimitError`] on I/O failure or when the file exceeds `max_bytes`.
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Parses a JSON command script.
///
/// # Errors
///
/// Returns [`RunnerError::Script`] when the payload is not a command list or
/// holds too many commands.
pub fn parse_script(bytes: &[u8], path: &Path) -> Result<Vec<FirewallCommand>, RunnerError> {
    let commands: Vec<FirewallCommand> =
        serde_json::from_slice(bytes).map_err(|err| RunnerError::Script {
            path: path.to_path_buf(),
            error: err.to_string(),
        })?;
    if commands.len() > MAX_SCRIPT_COMMANDS {
        return Err(RunnerError::Script {
            path: path.to_path_buf(),
            error: format!("script exceeds {MAX_SCRIPT_COMMANDS} commands"),
        });
    }
    Ok(commands)
}

/// Reads and parses a JSON command script from disk.
///
/// # Errors
///
/// Returns [`RunnerError::Read`] or [`RunnerError::Script`].
pub fn load_script(path: &Path) -> Result<Vec<FirewallCommand>, RunnerError> {
    let bytes =
        read_bytes_with_limit(path, MAX_SCRIPT_BYTES).map_err(|error| RunnerError::Read {
            path: path.to_path_buf(),
            error,
        })?;
    parse_script(&bytes, path)
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of an `apply` dry run.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// Port calls in the order the engine issued them.
    pub calls: Vec<PortCall>,
    /// Final chain snapshots in id order.
    pub chains: Vec<ChainSnapshot>,
}

/// Result of an `evaluate` dry run.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictReport {
    /// Evaluated UID.
    pub uid: Uid,
    /// Traffic context used.
    pub context: TrafficContext,
    /// Whether traffic passes every applicable chain.
    pub allowed: bool,
    /// First chain that blocks the UID.
    pub blocked_by: Option<ChainId>,
    /// Name of the blocking chain.
    pub blocked_by_name: Option<&'static str>,
}

// ============================================================================
// SECTION: Dry Run
// ============================================================================

/// Engine prepared from config and script against a recording filter.
pub struct DryRun {
    /// Engine holding the resulting chain state.
    engine: FirewallEngine<InMemoryPacketFilter, StaticFeatureGate>,
    /// Filter shared with the engine.
    filter: InMemoryPacketFilter,
}

impl DryRun {
    /// Loads config and script and applies every command in order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when inputs are invalid or a command fails.
    pub fn prepare(options: &DryRunOptions) -> Result<Self, RunnerError> {
        let mut config = match &options.config {
            Some(path) => FirewallConfig::load(Some(path))?,
            None => FirewallConfig::default(),
        };
        config.features.enabled.extend(options.enable_flags.iter().cloned());
        config.validate()?;

        let registry = ChainRegistry::standard();
        let mut commands = config.bootstrap_commands(&registry)?;
        if let Some(script) = &options.script {
            commands.extend(load_script(script)?);
        }

        let filter = InMemoryPacketFilter::new();
        let engine = FirewallEngine::new(registry, filter.clone(), config.feature_gate())
            .with_audit_sink(config.audit_sink()?);
        for (position, command) in commands.iter().enumerate() {
            engine.execute(command).map_err(|error| RunnerError::Command {
                index: position + 1,
                operation: command.operation(),
                error,
            })?;
        }
        Ok(Self {
            engine,
            filter,
        })
    }

    /// Returns the prepared engine.
    #[must_use]
    pub const fn engine(&self) -> &FirewallEngine<InMemoryPacketFilter, StaticFeatureGate> {
        &self.engine
    }

    /// Returns the recorded port calls and final chain state.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Engine`] when chain state cannot be read.
    pub fn report(&self) -> Result<ApplyReport, RunnerError> {
        Ok(ApplyReport {
            calls: self.filter.calls(),
            chains: self.engine.snapshots().map_err(RunnerError::Engine)?,
        })
    }

    /// Evaluates a UID against the prepared chain state.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Engine`] when chain state cannot be read.
    pub fn evaluate(
        &self,
        uid: Uid,
        context: TrafficContext,
    ) -> Result<VerdictReport, RunnerError> {
        let verdict = self.engine.evaluate(uid, context).map_err(RunnerError::Engine)?;
        let blocked_by_name = verdict
            .blocked_by
            .and_then(|chain| self.engine.registry().describe(chain).ok())
            .map(|descriptor| descriptor.name);
        Ok(VerdictReport {
            uid,
            context,
            allowed: verdict.is_allowed(),
            blocked_by: verdict.blocked_by,
            blocked_by_name,
        })
    }
}
