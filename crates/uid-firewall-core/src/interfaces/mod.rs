// crates/uid-firewall-core/src/interfaces/mod.rs
// ============================================================================
// Module: UID Firewall Interfaces
// Description: Contracts for the packet-filter program and feature gating.
// Purpose: Define the surfaces the enforcement engine calls out to.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The enforcement engine never talks to the kernel directly. Every resolved
//! update goes through a [`PacketFilterPort`], and every gated chain is checked
//! against a [`FeatureGate`] on each call. Both are injected so tests can
//! record and steer them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::ChainId;
use crate::core::FeatureFlag;
use crate::core::FirewallRule;
use crate::core::Uid;

// ============================================================================
// SECTION: Packet-Filter Port
// ============================================================================

/// Packet-filter port errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The packet-filter program rejected the update.
    #[error("packet filter rejected update: {0}")]
    Rejected(String),
    /// The packet-filter program could not be reached.
    #[error("packet filter unavailable: {0}")]
    Unavailable(String),
}

/// Boundary through which resolved rules are programmed into the kernel.
///
/// Calls are synchronous. The engine holds the target chain's lock for the
/// duration of each call and never retries a failure.
pub trait PacketFilterPort {
    /// Attaches or detaches a chain's child program.
    ///
    /// # Errors
    ///
    /// Returns [`PortError`] when the update cannot be programmed.
    fn set_child_chain(&self, chain: ChainId, enabled: bool) -> Result<(), PortError>;

    /// Replaces the complete UID set of a chain.
    ///
    /// # Errors
    ///
    /// Returns [`PortError`] when the update cannot be programmed.
    fn replace_uid_chain(&self, chain: ChainId, uids: &[Uid]) -> Result<(), PortError>;

    /// Programs a single UID's rule on a chain.
    ///
    /// # Errors
    ///
    /// Returns [`PortError`] when the update cannot be programmed.
    fn set_uid_rule(&self, chain: ChainId, uid: Uid, rule: FirewallRule) -> Result<(), PortError>;
}

impl<T: PacketFilterPort + ?Sized> PacketFilterPort for Arc<T> {
    fn set_child_chain(&self, chain: ChainId, enabled: bool) -> Result<(), PortError> {
        (**self).set_child_chain(chain, enabled)
    }

    fn replace_uid_chain(&self, chain: ChainId, uids: &[Uid]) -> Result<(), PortError> {
        (**self).replace_uid_chain(chain, uids)
    }

    fn set_uid_rule(&self, chain: ChainId, uid: Uid, rule: FirewallRule) -> Result<(), PortError> {
        (**self).set_uid_rule(chain, uid, rule)
    }
}

// ============================================================================
// SECTION: Feature Gate
// ============================================================================

/// Process-wide source of feature flag state.
///
/// The engine asks on every call that touches a gated chain and never caches
/// the answer.
pub trait FeatureGate {
    /// Returns true when the flag is enabled.
    fn is_enabled(&self, flag: &FeatureFlag) -> bool;
}

impl<T: FeatureGate + ?Sized> FeatureGate for &T {
    fn is_enabled(&self, flag: &FeatureFlag) -> bool {
        (**self).is_enabled(flag)
    }
}

impl<T: FeatureGate + ?Sized> FeatureGate for Arc<T> {
    fn is_enabled(&self, flag: &FeatureFlag) -> bool {
        (**self).is_enabled(flag)
    }
}
