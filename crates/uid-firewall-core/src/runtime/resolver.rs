// crates/uid-firewall-core/src/runtime/resolver.rs
// ============================================================================
// Module: UID Firewall Rule Resolver
// Description: Maps requested rules onto stored overrides and port rules.
// Purpose: Keep DEFAULT handling in one pure, deterministic function.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Explicit ALLOW/DENY requests are legal on every chain kind; the kind only
//! decides what DEFAULT collapses to. The port never sees DEFAULT.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ChainKind;
use crate::core::FirewallRule;
use crate::core::RuleRequest;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Result of resolving a requested rule against a chain kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Concrete rule programmed through the packet-filter port.
    pub port_rule: FirewallRule,
    /// Override to store; `None` removes any existing override.
    pub stored: Option<FirewallRule>,
}

/// Resolves a requested rule for a chain of the given kind.
#[must_use]
pub const fn resolve_rule(kind: ChainKind, requested: RuleRequest) -> Resolution {
    match requested {
        RuleRequest::Default => Resolution {
            port_rule: kind.default_rule(),
            stored: None,
        },
        RuleRequest::Allow => Resolution {
            port_rule: FirewallRule::Allow,
            stored: Some(FirewallRule::Allow),
        },
        RuleRequest::Deny => Resolution {
            port_rule: FirewallRule::Deny,
            stored: Some(FirewallRule::Deny),
        },
    }
}
