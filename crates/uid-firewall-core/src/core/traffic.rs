// crates/uid-firewall-core/src/core/traffic.rs
// ============================================================================
// Module: UID Firewall Traffic Verdicts
// Description: Traffic context and cross-chain verdict types.
// Purpose: Describe the inputs and outputs of UID evaluation.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A verdict answers "would traffic for this UID pass every enabled chain on
//! this kind of network", naming the first chain that blocks it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::chain::ChainScope;
use crate::core::identifiers::ChainId;
use crate::core::identifiers::Uid;

// ============================================================================
// SECTION: Traffic Context
// ============================================================================

/// Network conditions the verdict is computed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficContext {
    /// Traffic is on a metered network.
    #[serde(default)]
    pub metered: bool,
    /// Data saver is on.
    #[serde(default)]
    pub data_saver: bool,
}

impl TrafficContext {
    /// Unmetered traffic.
    pub const UNMETERED: Self = Self {
        metered: false,
        data_saver: false,
    };

    /// Returns true when a chain with the given scope applies to this traffic.
    #[must_use]
    pub const fn covers(self, scope: ChainScope) -> bool {
        match scope {
            ChainScope::AllNetworks => true,
            ChainScope::Metered => self.metered,
            ChainScope::MeteredDataSaver => self.metered && self.data_saver,
        }
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Outcome of evaluating a UID against every applicable chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Evaluated UID.
    pub uid: Uid,
    /// Context the verdict applies to.
    pub context: TrafficContext,
    /// First chain that denies the UID, if any.
    pub blocked_by: Option<ChainId>,
}

impl Verdict {
    /// Returns true when no applicable chain denies the UID.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.blocked_by.is_none()
    }
}
