// crates/uid-firewall-core/src/core/command.rs
// ============================================================================
// Module: UID Firewall Commands
// Description: Serializable requests for the enforcement engine.
// Purpose: Let scripts and configuration drive the engine's public surface.
// Dependencies: crate::core::{identifiers, rule}, serde
// ============================================================================

//! ## Overview
//! Each [`FirewallCommand`] variant maps one-to-one onto a public engine
//! operation. Commands carry no behavior of their own. [`FirewallOperation`]
//! labels the three mutation primitives for errors and audit events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ChainId;
use crate::core::identifiers::Uid;
use crate::core::rule::RuleRequest;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Mutation primitive exposed by the enforcement engine.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirewallOperation {
    /// Chain enable/disable.
    SetChainEnabled,
    /// Bulk UID-set replacement.
    ReplaceChainUids,
    /// Single-UID rule mutation.
    SetUidRule,
}

impl FirewallOperation {
    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SetChainEnabled => "set_chain_enabled",
            Self::ReplaceChainUids => "replace_chain_uids",
            Self::SetUidRule => "set_uid_rule",
        }
    }
}

impl fmt::Display for FirewallOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// A single engine operation in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum FirewallCommand {
    /// Enable or disable a chain.
    SetChainEnabled {
        /// Target chain.
        chain: ChainId,
        /// Desired enablement.
        enabled: bool,
    },
    /// Replace a chain's UID set.
    ReplaceChainUids {
        /// Target chain.
        chain: ChainId,
        /// UIDs to list, in programming order.
        uids: Vec<Uid>,
    },
    /// Set a single UID's rule on a chain.
    SetUidRule {
        /// Target chain.
        chain: ChainId,
        /// Target UID.
        uid: Uid,
        /// Requested rule.
        rule: RuleRequest,
    },
    /// Add a UID to the metered-network allow list.
    AddToMeteredAllowList {
        /// Target UID.
        uid: Uid,
    },
    /// Remove a UID from the metered-network allow list.
    RemoveFromMeteredAllowList {
        /// Target UID.
        uid: Uid,
    },
    /// Add a UID to the user metered-network deny list.
    AddToMeteredDenyList {
        /// Target UID.
        uid: Uid,
    },
    /// Remove a UID from the user metered-network deny list.
    RemoveFromMeteredDenyList {
        /// Target UID.
        uid: Uid,
    },
}

impl FirewallCommand {
    /// Returns the mutation primitive the command resolves to.
    #[must_use]
    pub const fn operation(&self) -> FirewallOperation {
        match self {
            Self::SetChainEnabled {
                ..
            } => FirewallOperation::SetChainEnabled,
            Self::ReplaceChainUids {
                ..
            } => FirewallOperation::ReplaceChainUids,
            Self::SetUidRule {
                ..
            }
            | Self::AddToMeteredAllowList {
                ..
            }
            | Self::RemoveFromMeteredAllowList {
                ..
            }
            | Self::AddToMeteredDenyList {
                ..
            }
            | Self::RemoveFromMeteredDenyList {
                ..
            } => FirewallOperation::SetUidRule,
        }
    }
}
