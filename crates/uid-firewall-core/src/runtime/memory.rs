// crates/uid-firewall-core/src/runtime/memory.rs
// ============================================================================
// Module: UID Firewall In-Memory Packet Filter
// Description: Recording packet-filter port for tests, demos, and dry runs.
// Purpose: Observe exactly which programs the engine would update.
// Dependencies: crate::{core, interfaces}, serde
// ============================================================================

//! ## Overview
//! [`InMemoryPacketFilter`] records every port call in order and keeps a
//! simple model of what a kernel would hold afterwards. A single failure can
//! be armed to exercise the engine's rollback path. It is not a kernel
//! binding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Serialize;

use crate::core::ChainId;
use crate::core::FirewallRule;
use crate::core::Uid;
use crate::interfaces::PacketFilterPort;
use crate::interfaces::PortError;

// ============================================================================
// SECTION: Port Calls
// ============================================================================

/// A recorded packet-filter port call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum PortCall {
    /// `set_child_chain` invocation.
    SetChildChain {
        /// Target chain.
        chain: ChainId,
        /// Requested enablement.
        enabled: bool,
    },
    /// `replace_uid_chain` invocation.
    ReplaceUidChain {
        /// Target chain.
        chain: ChainId,
        /// UIDs in the order received.
        uids: Vec<Uid>,
    },
    /// `set_uid_rule` invocation.
    SetUidRule {
        /// Target chain.
        chain: ChainId,
        /// Target UID.
        uid: Uid,
        /// Programmed rule.
        rule: FirewallRule,
    },
}

// ============================================================================
// SECTION: In-Memory Filter
// ============================================================================

/// Mutable state behind the in-memory filter.
#[derive(Debug, Default)]
struct FilterState {
    /// Successful calls in arrival order.
    calls: Vec<PortCall>,
    /// Child-chain attachment per chain.
    child_chains: BTreeMap<ChainId, bool>,
    /// UID lists installed by bulk replacement.
    uid_lists: BTreeMap<ChainId, Vec<Uid>>,
    /// Rules installed by single-UID updates.
    uid_rules: BTreeMap<ChainId, BTreeMap<Uid, FirewallRule>>,
    /// Failure returned by the next call, if armed.
    pending_failure: Option<PortError>,
}

impl FilterState {
    /// Consumes an armed failure, if any.
    fn take_failure(&mut self) -> Result<(), PortError> {
        self.pending_failure.take().map_or(Ok(()), Err)
    }
}

/// In-memory packet filter that records every call.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPacketFilter {
    /// Filter state shared across clones.
    state: Arc<Mutex<FilterState>>,
}

impl InMemoryPacketFilter {
    /// Creates an empty in-memory packet filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PortCall> {
        self.lock().calls.clone()
    }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&self) -> Vec<PortCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Arms a failure for the next call. Failed calls are not recorded.
    pub fn fail_next(&self, error: PortError) {
        self.lock().pending_failure = Some(error);
    }

    /// Returns the child-chain attachment last programmed for a chain.
    #[must_use]
    pub fn child_chain(&self, chain: ChainId) -> Option<bool> {
        self.lock().child_chains.get(&chain).copied()
    }

    /// Returns the UID list last installed by bulk replacement.
    #[must_use]
    pub fn uid_list(&self, chain: ChainId) -> Option<Vec<Uid>> {
        self.lock().uid_lists.get(&chain).cloned()
    }

    /// Returns the rule last programmed for a UID on a chain.
    #[must_use]
    pub fn programmed_rule(&self, chain: ChainId, uid: Uid) -> Option<FirewallRule> {
        self.lock().uid_rules.get(&chain).and_then(|rules| rules.get(&uid)).copied()
    }

    /// Locks the filter state, recovering from poisoning.
    fn lock(&self) -> std::sync::MutexGuard<'_, FilterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PacketFilterPort for InMemoryPacketFilter {
    fn set_child_chain(&self, chain: ChainId, enabled: bool) -> Result<(), PortError> {
        let mut state = self.lock();
        state.take_failure()?;
        state.child_chains.insert(chain, enabled);
        state.calls.push(PortCall::SetChildChain {
            chain,
            enabled,
        });
        Ok(())
    }

    fn replace_uid_chain(&self, chain: ChainId, uids: &[Uid]) -> Result<(), PortError> {
        let mut state = self.lock();
        state.take_failure()?;
        state.uid_lists.insert(chain, uids.to_vec());
        state.uid_rules.remove(&chain);
        state.calls.push(PortCall::ReplaceUidChain {
            chain,
            uids: uids.to_vec(),
        });
        Ok(())
    }

    fn set_uid_rule(&self, chain: ChainId, uid: Uid, rule: FirewallRule) -> Result<(), PortError> {
        let mut state = self.lock();
        state.take_failure()?;
        state.uid_rules.entry(chain).or_default().insert(uid, rule);
        state.calls.push(PortCall::SetUidRule {
            chain,
            uid,
            rule,
        });
        Ok(())
    }
}
