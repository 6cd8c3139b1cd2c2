// crates/uid-firewall-core/src/runtime/registry.rs
// ============================================================================
// Module: UID Firewall Chain Registry
// Description: Static catalog of firewall chains and their semantics.
// Purpose: Resolve chain identifiers and names into immutable descriptors.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The registry is populated once and never mutated. The standard catalog
//! carries the power-management chains, the OEM deny chains, the
//! feature-gated background chain, and the always-on metered chains.
//! Custom catalogs are validated for unique ids and names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::ChainDescriptor;
use crate::core::ChainId;
use crate::core::ChainKind;
use crate::core::ChainScope;
use crate::core::FeatureFlag;
use crate::runtime::engine::FirewallError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Always-on chains that allow listed UIDs on metered networks.
pub const METERED_ALLOW_CHAINS: &[ChainId] = &[ChainId::METERED_ALLOW];
/// Always-on chains that deny listed UIDs on metered networks.
pub const METERED_DENY_CHAINS: &[ChainId] =
    &[ChainId::METERED_DENY_USER, ChainId::METERED_DENY_ADMIN];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building a custom registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two descriptors share an identifier.
    #[error("duplicate chain id: {0}")]
    DuplicateId(ChainId),
    /// Two descriptors share a name.
    #[error("duplicate chain name: {0}")]
    DuplicateName(String),
    /// A descriptor has an empty name.
    #[error("chain {0} has an empty name")]
    EmptyName(ChainId),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Immutable catalog of registered chains keyed by identifier.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    /// Descriptors ordered by chain identifier.
    chains: BTreeMap<ChainId, ChainDescriptor>,
}

impl ChainRegistry {
    /// Builds the standard chain catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            chains: standard_chains().into_iter().map(|chain| (chain.id, chain)).collect(),
        }
    }

    /// Builds a registry from a custom set of descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when ids or names are duplicated or empty.
    pub fn with_chains(
        descriptors: impl IntoIterator<Item = ChainDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut chains = BTreeMap::new();
        let mut names = BTreeSet::new();
        for descriptor in descriptors {
            if descriptor.name.trim().is_empty() {
                return Err(RegistryError::EmptyName(descriptor.id));
            }
            if !names.insert(descriptor.name) {
                return Err(RegistryError::DuplicateName(descriptor.name.to_string()));
            }
            if chains.contains_key(&descriptor.id) {
                return Err(RegistryError::DuplicateId(descriptor.id));
            }
            chains.insert(descriptor.id, descriptor);
        }
        Ok(Self {
            chains,
        })
    }

    /// Returns the descriptor for a chain.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::UnknownChain`] when the chain is not registered.
    pub fn describe(&self, chain: ChainId) -> Result<&ChainDescriptor, FirewallError> {
        self.chains.get(&chain).ok_or(FirewallError::UnknownChain(chain))
    }

    /// Looks up a chain by name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ChainDescriptor> {
        self.chains.values().find(|descriptor| descriptor.name == name)
    }

    /// Iterates descriptors in ascending chain id order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.values()
    }

    /// Returns the number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true when no chains are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// SECTION: Standard Catalog
// ============================================================================

/// Returns the standard chain descriptors.
fn standard_chains() -> Vec<ChainDescriptor> {
    vec![
        ChainDescriptor::new(ChainId::DOZABLE, "dozable", ChainKind::AllowList),
        ChainDescriptor::new(ChainId::STANDBY, "standby", ChainKind::DenyList),
        ChainDescriptor::new(ChainId::POWERSAVE, "powersave", ChainKind::AllowList),
        ChainDescriptor::new(ChainId::RESTRICTED, "restricted", ChainKind::AllowList),
        ChainDescriptor::new(ChainId::LOW_POWER_STANDBY, "low_power_standby", ChainKind::AllowList),
        ChainDescriptor::new(ChainId::BACKGROUND, "background", ChainKind::AllowList)
            .gated(FeatureFlag::BACKGROUND_FIREWALL_CHAIN),
        ChainDescriptor::new(ChainId::OEM_DENY_1, "oem_deny_1", ChainKind::DenyList),
        ChainDescriptor::new(ChainId::OEM_DENY_2, "oem_deny_2", ChainKind::DenyList),
        ChainDescriptor::new(ChainId::OEM_DENY_3, "oem_deny_3", ChainKind::DenyList),
        ChainDescriptor::new(ChainId::METERED_ALLOW, "metered_allow", ChainKind::AllowList)
            .always_on(ChainScope::MeteredDataSaver),
        ChainDescriptor::new(ChainId::METERED_DENY_USER, "metered_deny_user", ChainKind::DenyList)
            .always_on(ChainScope::Metered),
        ChainDescriptor::new(
            ChainId::METERED_DENY_ADMIN,
            "metered_deny_admin",
            ChainKind::DenyList,
        )
        .always_on(ChainScope::Metered),
    ]
}
