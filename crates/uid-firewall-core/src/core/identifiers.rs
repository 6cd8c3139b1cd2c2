// crates/uid-firewall-core/src/core/identifiers.rs
// ============================================================================
// Module: UID Firewall Identifiers
// Description: Canonical identifiers for chains, UIDs, and feature flags.
// Purpose: Provide strongly typed, serializable IDs with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Chain and UID identifiers are thin integer wrappers whose numeric values are
//! the ones programmed into the packet filter. Whether a chain identifier is
//! known is decided by the chain registry, not by these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Chain Identifier
// ============================================================================

/// Firewall chain identifier.
///
/// # Invariants
/// - Numeric values are stable; they are the packet-filter chain ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u32);

impl ChainId {
    /// Chain for UIDs allowed while the device dozes.
    pub const DOZABLE: Self = Self(1);
    /// Chain for UIDs blocked while in app standby.
    pub const STANDBY: Self = Self(2);
    /// Chain for UIDs allowed in battery saver.
    pub const POWERSAVE: Self = Self(3);
    /// Chain for UIDs allowed in restricted networking mode.
    pub const RESTRICTED: Self = Self(4);
    /// Chain for UIDs allowed in low power standby.
    pub const LOW_POWER_STANDBY: Self = Self(5);
    /// Chain for UIDs allowed while running in the background.
    pub const BACKGROUND: Self = Self(6);
    /// First OEM deny chain.
    pub const OEM_DENY_1: Self = Self(7);
    /// Second OEM deny chain.
    pub const OEM_DENY_2: Self = Self(8);
    /// Third OEM deny chain.
    pub const OEM_DENY_3: Self = Self(9);
    /// Metered-network allow chain (data saver allow list).
    pub const METERED_ALLOW: Self = Self(10);
    /// Metered-network deny chain driven by user choice.
    pub const METERED_DENY_USER: Self = Self(11);
    /// Metered-network deny chain driven by device admin policy.
    pub const METERED_DENY_ADMIN: Self = Self(12);

    /// Creates a chain identifier from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw chain value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: UID
// ============================================================================

/// Application/process owner identifier whose traffic is filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(u32);

impl Uid {
    /// Creates a UID from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw UID value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for Uid {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Feature Flag
// ============================================================================

/// Named feature flag that gates newer chains.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFlag(Cow<'static, str>);

impl FeatureFlag {
    /// Flag controlling availability of the background chain.
    pub const BACKGROUND_FIREWALL_CHAIN: Self = Self(Cow::Borrowed("background_firewall_chain"));

    /// Creates a feature flag from a name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Returns the flag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&'static str> for FeatureFlag {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FeatureFlag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
