// crates/uid-firewall-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for uid-firewall-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(clippy::panic, reason = "Helpers panic on unexpected fixture outcomes.")]

use uid_firewall_config::ConfigError;
use uid_firewall_config::FirewallConfig;

/// Parses and validates a TOML string.
pub fn config_from_toml(toml_str: &str) -> Result<FirewallConfig, ConfigError> {
    FirewallConfig::from_toml_str(toml_str)
}

/// Returns the error message for a config expected to be invalid.
pub fn invalid_message(toml_str: &str) -> String {
    match config_from_toml(toml_str) {
        Err(ConfigError::Invalid(message)) => message,
        Err(other) => panic!("expected invalid config, got {other}"),
        Ok(_) => panic!("expected invalid config, got a valid one"),
    }
}

/// A config exercising every section.
pub const FULL_CONFIG: &str = r#"
[features]
enabled = ["background_firewall_chain"]

[audit]
sink = "stderr"

[[chains]]
name = "background"
enabled = true
uids = [53, 42, 79]
rules = [{ uid = 2345, rule = "deny" }]

[[chains]]
name = "metered_allow"
rules = [{ uid = 1001, rule = "allow" }]
"#;
