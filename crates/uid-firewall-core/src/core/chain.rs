// crates/uid-firewall-core/src/core/chain.rs
// ============================================================================
// Module: UID Firewall Chain Model
// Description: Static chain descriptors and per-chain runtime snapshots.
// Purpose: Describe chain semantics (kind, toggle, scope, gating).
// Dependencies: crate::core::{identifiers, rule}, serde
// ============================================================================

//! ## Overview
//! A chain's descriptor is fixed for the lifetime of the registry. The
//! default rule is derived from the chain kind so the two can never disagree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ChainId;
use crate::core::identifiers::FeatureFlag;
use crate::core::identifiers::Uid;
use crate::core::rule::FirewallRule;

// ============================================================================
// SECTION: Chain Attributes
// ============================================================================

/// Chain kind, which fixes the chain's default rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    /// Only listed UIDs pass; the default rule is deny.
    AllowList,
    /// Only listed UIDs are blocked; the default rule is allow.
    DenyList,
}

impl ChainKind {
    /// Returns the rule applied to UIDs without an override.
    #[must_use]
    pub const fn default_rule(self) -> FirewallRule {
        match self {
            Self::AllowList => FirewallRule::Deny,
            Self::DenyList => FirewallRule::Allow,
        }
    }

    /// Returns the rule assigned to UIDs listed by a bulk replace.
    #[must_use]
    pub const fn listed_rule(self) -> FirewallRule {
        self.default_rule().inverse()
    }

    /// Returns the stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllowList => "allow_list",
            Self::DenyList => "deny_list",
        }
    }
}

/// Whether a chain can be switched on and off at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainToggle {
    /// Chain is enabled and disabled through the child-chain program.
    Dynamic,
    /// Chain is permanently active; toggling and bulk replace are rejected.
    AlwaysOn,
}

impl ChainToggle {
    /// Returns the stable label for the toggle behavior.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::AlwaysOn => "always_on",
        }
    }
}

/// Which traffic a chain applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainScope {
    /// Chain applies on every network.
    AllNetworks,
    /// Chain applies on metered networks only.
    Metered,
    /// Chain applies on metered networks while data saver is on.
    MeteredDataSaver,
}

impl ChainScope {
    /// Returns the stable label for the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllNetworks => "all_networks",
            Self::Metered => "metered",
            Self::MeteredDataSaver => "metered_data_saver",
        }
    }
}

// ============================================================================
// SECTION: Chain Descriptor
// ============================================================================

/// Static description of a registered chain.
///
/// # Invariants
/// - `kind` and therefore the default rule never change at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    /// Chain identifier.
    pub id: ChainId,
    /// Human-readable chain name.
    pub name: &'static str,
    /// Chain kind.
    pub kind: ChainKind,
    /// Toggle behavior.
    pub toggle: ChainToggle,
    /// Traffic scope.
    pub scope: ChainScope,
    /// Feature flag that must be enabled for the chain to be active.
    pub feature_flag: Option<FeatureFlag>,
}

impl ChainDescriptor {
    /// Creates an ungated, dynamic, all-network chain descriptor.
    #[must_use]
    pub const fn new(id: ChainId, name: &'static str, kind: ChainKind) -> Self {
        Self {
            id,
            name,
            kind,
            toggle: ChainToggle::Dynamic,
            scope: ChainScope::AllNetworks,
            feature_flag: None,
        }
    }

    /// Marks the chain as always-on with the provided scope.
    #[must_use]
    pub fn always_on(mut self, scope: ChainScope) -> Self {
        self.toggle = ChainToggle::AlwaysOn;
        self.scope = scope;
        self
    }

    /// Gates the chain behind a feature flag.
    #[must_use]
    pub fn gated(mut self, flag: FeatureFlag) -> Self {
        self.feature_flag = Some(flag);
        self
    }

    /// Returns the rule applied to UIDs without an override.
    #[must_use]
    pub const fn default_rule(&self) -> FirewallRule {
        self.kind.default_rule()
    }

    /// Returns true when the chain cannot be toggled or bulk-replaced.
    #[must_use]
    pub const fn is_always_on(&self) -> bool {
        matches!(self.toggle, ChainToggle::AlwaysOn)
    }
}

// ============================================================================
// SECTION: Chain Snapshot
// ============================================================================

/// Point-in-time view of a chain's runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSnapshot {
    /// Chain identifier.
    pub chain: ChainId,
    /// Chain name.
    pub name: &'static str,
    /// Chain kind.
    pub kind: ChainKind,
    /// Default rule for UIDs without an override.
    pub default_rule: FirewallRule,
    /// Whether the chain is currently enabled.
    pub enabled: bool,
    /// Whether the chain's feature gate is open (always true when ungated).
    pub gate_open: bool,
    /// Explicit per-UID overrides.
    pub uid_rules: BTreeMap<Uid, FirewallRule>,
}
