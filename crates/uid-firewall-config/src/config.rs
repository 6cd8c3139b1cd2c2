// crates/uid-firewall-config/src/config.rs
// ============================================================================
// Module: UID Firewall Configuration
// Description: Configuration loading and validation for the firewall engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: uid-firewall-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Chains are referenced by name and checked against the chain registry, so a
//! file that would make the engine reject a bootstrap command never loads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uid_firewall_core::ChainRegistry;
use uid_firewall_core::FeatureFlag;
use uid_firewall_core::FileAuditSink;
use uid_firewall_core::FirewallAuditSink;
use uid_firewall_core::FirewallCommand;
use uid_firewall_core::NoopAuditSink;
use uid_firewall_core::RuleRequest;
use uid_firewall_core::StaticFeatureGate;
use uid_firewall_core::StderrAuditSink;
use uid_firewall_core::Uid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "uid-firewall.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "UID_FIREWALL_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of enabled feature flags.
pub const MAX_FEATURE_FLAGS: usize = 64;
/// Maximum length of a feature flag name.
pub const MAX_FEATURE_FLAG_LENGTH: usize = 64;
/// Maximum number of chain sections.
pub const MAX_CHAIN_SECTIONS: usize = 64;
/// Maximum number of UIDs in a single chain's bulk list.
pub const MAX_CHAIN_UIDS: usize = 16_384;
/// Maximum number of per-UID rules in a single chain section.
pub const MAX_CHAIN_RULES: usize = 16_384;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// UID firewall configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirewallConfig {
    /// Feature flags enabled for the process.
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Initial chain state, applied in file order.
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

impl FirewallConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration against the standard chain catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_against(&ChainRegistry::standard())
    }

    /// Validates the configuration against a chain registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate_against(&self, registry: &ChainRegistry) -> Result<(), ConfigError> {
        self.features.validate()?;
        self.audit.validate()?;
        if self.chains.len() > MAX_CHAIN_SECTIONS {
            return Err(ConfigError::Invalid("too many chain sections".to_string()));
        }
        let mut seen = BTreeSet::new();
        for chain in &self.chains {
            if !seen.insert(chain.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "chain {} is configured more than once",
                    chain.name
                )));
            }
            chain.validate(registry)?;
        }
        Ok(())
    }

    /// Returns a feature gate with the configured flags enabled.
    #[must_use]
    pub fn feature_gate(&self) -> StaticFeatureGate {
        StaticFeatureGate::new(self.features.enabled.iter().cloned().map(FeatureFlag::new))
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn FirewallAuditSink>, ConfigError> {
        self.audit.build_sink()
    }

    /// Returns the commands that bring a fresh engine to the configured state.
    ///
    /// Per chain, in file order: the enablement toggle, then the bulk UID
    /// list, then each per-UID rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a chain name is not registered.
    pub fn bootstrap_commands(
        &self,
        registry: &ChainRegistry,
    ) -> Result<Vec<FirewallCommand>, ConfigError> {
        let mut commands = Vec::new();
        for chain_config in &self.chains {
            let chain = registry
                .find_by_name(&chain_config.name)
                .ok_or_else(|| unknown_chain(&chain_config.name))?
                .id;
            if let Some(enabled) = chain_config.enabled {
                commands.push(FirewallCommand::SetChainEnabled {
                    chain,
                    enabled,
                });
            }
            if let Some(uids) = &chain_config.uids {
                commands.push(FirewallCommand::ReplaceChainUids {
                    chain,
                    uids: uids.iter().copied().map(Uid::new).collect(),
                });
            }
            for rule in &chain_config.rules {
                commands.push(FirewallCommand::SetUidRule {
                    chain,
                    uid: Uid::new(rule.uid),
                    rule: rule.rule,
                });
            }
        }
        Ok(commands)
    }
}

/// Feature flag configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesConfig {
    /// Names of enabled feature flags.
    #[serde(default)]
    pub enabled: Vec<String>,
}

impl FeaturesConfig {
    /// Validates feature flag names.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled.len() > MAX_FEATURE_FLAGS {
            return Err(ConfigError::Invalid("too many feature flags".to_string()));
        }
        for flag in &self.enabled {
            validate_flag_name(flag)?;
        }
        Ok(())
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit logging configuration for chain mutations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines), required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Builds the configured sink.
    fn build_sink(&self) -> Result<Arc<dyn FirewallAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        }
    }
}

/// Initial state for a single chain.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Registered chain name.
    pub name: String,
    /// Requested enablement; omitted leaves the chain untouched.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Bulk UID list; omitted leaves the chain's list untouched.
    #[serde(default)]
    pub uids: Option<Vec<u32>>,
    /// Per-UID rules applied after the bulk list.
    #[serde(default)]
    pub rules: Vec<UidRuleConfig>,
}

impl ChainConfig {
    /// Validates the chain section against the registry.
    fn validate(&self, registry: &ChainRegistry) -> Result<(), ConfigError> {
        let descriptor =
            registry.find_by_name(&self.name).ok_or_else(|| unknown_chain(&self.name))?;
        if descriptor.is_always_on() && self.enabled.is_some() {
            return Err(ConfigError::Invalid(format!(
                "chain {} is always on and cannot be toggled",
                self.name
            )));
        }
        if let Some(uids) = &self.uids {
            if descriptor.is_always_on() {
                return Err(ConfigError::Invalid(format!(
                    "chain {} is always on and does not accept a uid list",
                    self.name
                )));
            }
            if uids.len() > MAX_CHAIN_UIDS {
                return Err(ConfigError::Invalid(format!("chain {} uid list too large", self.name)));
            }
            let mut seen = BTreeSet::new();
            if let Some(uid) = uids.iter().find(|uid| !seen.insert(**uid)) {
                return Err(ConfigError::Invalid(format!(
                    "chain {} lists uid {uid} more than once",
                    self.name
                )));
            }
        }
        if self.rules.len() > MAX_CHAIN_RULES {
            return Err(ConfigError::Invalid(format!("chain {} has too many rules", self.name)));
        }
        let mut seen = BTreeSet::new();
        if let Some(rule) = self.rules.iter().find(|rule| !seen.insert(rule.uid)) {
            return Err(ConfigError::Invalid(format!(
                "chain {} has more than one rule for uid {}",
                self.name, rule.uid
            )));
        }
        Ok(())
    }
}

/// A single per-UID rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UidRuleConfig {
    /// Target UID.
    pub uid: u32,
    /// Requested rule.
    pub rule: RuleRequest,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates config path length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path-valued config field.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a feature flag name: lowercase ascii, digits, and underscores.
fn validate_flag_name(flag: &str) -> Result<(), ConfigError> {
    if flag.is_empty() || flag.len() > MAX_FEATURE_FLAG_LENGTH {
        return Err(ConfigError::Invalid(format!("invalid feature flag length: '{flag}'")));
    }
    let valid = flag.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if !valid {
        return Err(ConfigError::Invalid(format!("invalid feature flag name: '{flag}'")));
    }
    Ok(())
}

/// Builds the error for an unregistered chain name.
fn unknown_chain(name: &str) -> ConfigError {
    ConfigError::Invalid(format!("unknown chain: {name}"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let result = validate_path_string("audit.path", "   ");
        assert!(result.unwrap_err().to_string().contains("audit.path must be non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_component_too_long() {
        let long = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path_string("audit.path", &format!("logs/{long}"));
        assert!(result.unwrap_err().to_string().contains("component too long"));
    }

    #[test]
    fn validate_path_string_accepts_component_at_max() {
        let long = "a".repeat(MAX_PATH_COMPONENT_LENGTH);
        assert!(validate_path_string("audit.path", &long).is_ok());
    }

    #[test]
    fn validate_path_rejects_total_length_over_max() {
        let long = "a/".repeat(MAX_TOTAL_PATH_LENGTH / 2 + 1);
        assert!(validate_path(Path::new(&long)).is_err());
    }

    #[test]
    fn resolve_path_prefers_explicit_path() {
        let resolved = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(resolved, PathBuf::from("custom.toml"));
    }

    #[test]
    fn validate_flag_name_rejects_uppercase_and_empty() {
        assert!(validate_flag_name("background_firewall_chain").is_ok());
        assert!(validate_flag_name("Background").is_err());
        assert!(validate_flag_name("").is_err());
        assert!(validate_flag_name(&"x".repeat(MAX_FEATURE_FLAG_LENGTH + 1)).is_err());
    }
}
