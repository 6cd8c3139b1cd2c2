// crates/uid-firewall-core/src/runtime/feature_gate.rs
// ============================================================================
// Module: UID Firewall Feature Gates
// Description: Static and runtime-toggleable feature flag sets.
// Purpose: Provide FeatureGate implementations for services and tests.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`StaticFeatureGate`] is built once from configuration. [`RuntimeFeatureGate`]
//! is a shared handle whose flags can be flipped by an outside flagging
//! subsystem or by tests between scenarios; the engine only ever reads it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::core::FeatureFlag;
use crate::interfaces::FeatureGate;

// ============================================================================
// SECTION: Static Gate
// ============================================================================

/// Immutable set of enabled feature flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFeatureGate {
    /// Enabled flags.
    flags: BTreeSet<FeatureFlag>,
}

impl StaticFeatureGate {
    /// Creates a gate with the provided flags enabled.
    #[must_use]
    pub fn new(flags: impl IntoIterator<Item = FeatureFlag>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    /// Creates a gate with every flag disabled.
    #[must_use]
    pub fn closed() -> Self {
        Self::default()
    }

    /// Returns the enabled flags.
    #[must_use]
    pub const fn flags(&self) -> &BTreeSet<FeatureFlag> {
        &self.flags
    }
}

impl FeatureGate for StaticFeatureGate {
    fn is_enabled(&self, flag: &FeatureFlag) -> bool {
        self.flags.contains(flag)
    }
}

// ============================================================================
// SECTION: Runtime Gate
// ============================================================================

/// Shared, externally toggleable feature flag set.
#[derive(Debug, Clone, Default)]
pub struct RuntimeFeatureGate {
    /// Enabled flags shared across clones.
    flags: Arc<RwLock<BTreeSet<FeatureFlag>>>,
}

impl RuntimeFeatureGate {
    /// Creates a gate with the provided flags enabled.
    #[must_use]
    pub fn new(flags: impl IntoIterator<Item = FeatureFlag>) -> Self {
        Self {
            flags: Arc::new(RwLock::new(flags.into_iter().collect())),
        }
    }

    /// Enables or disables a flag for every clone of this gate.
    pub fn set(&self, flag: FeatureFlag, enabled: bool) {
        let mut flags = self.flags.write().unwrap_or_else(PoisonError::into_inner);
        if enabled {
            flags.insert(flag);
        } else {
            flags.remove(&flag);
        }
    }
}

impl FeatureGate for RuntimeFeatureGate {
    fn is_enabled(&self, flag: &FeatureFlag) -> bool {
        self.flags.read().unwrap_or_else(PoisonError::into_inner).contains(flag)
    }
}
