// crates/uid-firewall-core/src/core/rule.rs
// ============================================================================
// Module: UID Firewall Rules
// Description: Requested and concrete per-UID firewall rules.
// Purpose: Separate the DEFAULT request sentinel from programmable rules.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Callers request one of three rules; the packet filter only understands two.
//! [`RuleRequest::Default`] never reaches the port: the resolver turns it into
//! the chain's default [`FirewallRule`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Concrete Rule
// ============================================================================

/// Concrete rule understood by the packet filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirewallRule {
    /// Traffic for the UID passes this chain.
    Allow,
    /// Traffic for the UID is dropped by this chain.
    Deny,
}

impl FirewallRule {
    /// Returns a stable label for the rule.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }

    /// Returns the opposite rule.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Allow => Self::Deny,
            Self::Deny => Self::Allow,
        }
    }
}

impl fmt::Display for FirewallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Requested Rule
// ============================================================================

/// Rule requested by a caller for a single UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleRequest {
    /// Remove any override and fall back to the chain default.
    Default,
    /// Explicitly allow the UID.
    Allow,
    /// Explicitly deny the UID.
    Deny,
}

impl RuleRequest {
    /// Returns a stable label for the request.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

impl From<FirewallRule> for RuleRequest {
    fn from(rule: FirewallRule) -> Self {
        match rule {
            FirewallRule::Allow => Self::Allow,
            FirewallRule::Deny => Self::Deny,
        }
    }
}

impl fmt::Display for RuleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
