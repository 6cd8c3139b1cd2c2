// crates/uid-firewall-core/src/runtime/engine.rs
// ============================================================================
// Module: UID Firewall Chain Enforcement Engine
// Description: Per-chain state, gating, and packet-filter programming.
// Purpose: Translate logical chain operations into packet-filter updates.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! The engine is the single path through which chain state changes. Each
//! mutation on a chain runs under that chain's own lock: the new state is
//! computed, the port is called, and the state is committed only when the
//! port call succeeds. Unrelated chains never contend.
//!
//! Gated chains whose feature gate is closed absorb every mutation silently.
//! Always-on chains reject toggling and bulk replacement outright.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use thiserror::Error;

use crate::core::ChainDescriptor;
use crate::core::ChainId;
use crate::core::ChainScope;
use crate::core::ChainSnapshot;
use crate::core::FirewallCommand;
use crate::core::FirewallOperation;
use crate::core::FirewallRule;
use crate::core::RuleRequest;
use crate::core::TrafficContext;
use crate::core::Uid;
use crate::core::Verdict;
use crate::interfaces::FeatureGate;
use crate::interfaces::PacketFilterPort;
use crate::interfaces::PortError;
use crate::runtime::audit::AuditOutcome;
use crate::runtime::audit::FirewallAuditEvent;
use crate::runtime::audit::FirewallAuditEventParams;
use crate::runtime::audit::FirewallAuditSink;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::registry::ChainRegistry;
use crate::runtime::resolver::resolve_rule;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Enforcement engine errors.
#[derive(Debug, Error)]
pub enum FirewallError {
    /// Chain id is not in the registry.
    #[error("unknown firewall chain: {0}")]
    UnknownChain(ChainId),
    /// Operation is structurally forbidden for the chain.
    #[error("{operation} is not supported on firewall chain {chain}")]
    UnsupportedOperation {
        /// Target chain.
        chain: ChainId,
        /// Refused operation.
        operation: FirewallOperation,
    },
    /// Packet-filter port failure, surfaced unchanged.
    #[error(transparent)]
    Port(#[from] PortError),
    /// A chain lock was poisoned by a panicking holder.
    #[error("firewall chain state poisoned: {0}")]
    StatePoisoned(ChainId),
}

impl FirewallError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownChain(_) => "unknown_chain",
            Self::UnsupportedOperation {
                ..
            } => "unsupported_operation",
            Self::Port(_) => "port_failure",
            Self::StatePoisoned(_) => "state_poisoned",
        }
    }
}

// ============================================================================
// SECTION: Chain State
// ============================================================================

/// Mutable per-chain state guarded by the chain's lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ChainState {
    /// Whether the chain's child program is attached.
    enabled: bool,
    /// Explicit per-UID overrides; absent UIDs use the chain default.
    uid_rules: BTreeMap<Uid, FirewallRule>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Chain enforcement engine.
pub struct FirewallEngine<P, G> {
    /// Immutable chain catalog.
    registry: ChainRegistry,
    /// Per-chain state, one lock per registered chain.
    chains: BTreeMap<ChainId, Mutex<ChainState>>,
    /// Packet-filter port receiving resolved updates.
    port: P,
    /// Feature gate consulted for gated chains on every call.
    gate: G,
    /// Audit sink for mutation events.
    audit: Arc<dyn FirewallAuditSink>,
}

impl<P, G> FirewallEngine<P, G>
where
    P: PacketFilterPort,
    G: FeatureGate,
{
    /// Creates an engine with every dynamic chain disabled and no overrides.
    #[must_use]
    pub fn new(registry: ChainRegistry, port: P, gate: G) -> Self {
        let chains = registry
            .iter()
            .map(|descriptor| {
                let state = ChainState {
                    enabled: descriptor.is_always_on(),
                    uid_rules: BTreeMap::new(),
                };
                (descriptor.id, Mutex::new(state))
            })
            .collect();
        Self {
            registry,
            chains,
            port,
            gate,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn FirewallAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the chain registry.
    #[must_use]
    pub const fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Returns the packet-filter port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Returns the feature gate.
    #[must_use]
    pub const fn gate(&self) -> &G {
        &self.gate
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Enables or disables a chain.
    ///
    /// Redundant requests are still programmed.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::UnknownChain`] for unregistered chains,
    /// [`FirewallError::UnsupportedOperation`] for always-on chains, and
    /// [`FirewallError::Port`] when programming fails.
    pub fn set_chain_enabled(&self, chain: ChainId, enabled: bool) -> Result<(), FirewallError> {
        let mut params = FirewallAuditEventParams::new(FirewallOperation::SetChainEnabled, chain);
        params.enabled = Some(enabled);
        let result = self.admit(chain, FirewallOperation::SetChainEnabled, &mut params);
        let outcome = match result {
            Ok(Some(_)) => self.with_chain(chain, |state| {
                self.port.set_child_chain(chain, enabled)?;
                state.enabled = enabled;
                Ok(())
            }),
            Ok(None) => {
                self.record(params, AuditOutcome::SkippedGateClosed, None);
                return Ok(());
            }
            Err(err) => Err(err),
        };
        self.finish(params, outcome)
    }

    /// Replaces a chain's UID set.
    ///
    /// Listed UIDs receive the chain's non-default rule (allow on allow-list
    /// chains, deny on deny-list chains); every other override is dropped.
    /// The port receives the UIDs in caller order.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::UnknownChain`] for unregistered chains,
    /// [`FirewallError::UnsupportedOperation`] for always-on chains, and
    /// [`FirewallError::Port`] when programming fails.
    pub fn replace_chain_uids(&self, chain: ChainId, uids: &[Uid]) -> Result<(), FirewallError> {
        let mut params = FirewallAuditEventParams::new(FirewallOperation::ReplaceChainUids, chain);
        params.uid_count = Some(uids.len());
        let result = self.admit(chain, FirewallOperation::ReplaceChainUids, &mut params);
        let outcome = match result {
            Ok(Some(descriptor)) => {
                let listed = descriptor.kind.listed_rule();
                let replacement: BTreeMap<Uid, FirewallRule> =
                    uids.iter().map(|uid| (*uid, listed)).collect();
                self.with_chain(chain, |state| {
                    self.port.replace_uid_chain(chain, uids)?;
                    state.uid_rules = replacement;
                    Ok(())
                })
            }
            Ok(None) => {
                self.record(params, AuditOutcome::SkippedGateClosed, None);
                return Ok(());
            }
            Err(err) => Err(err),
        };
        self.finish(params, outcome)
    }

    /// Sets a single UID's rule on a chain.
    ///
    /// `RuleRequest::Default` removes the override and programs the chain's
    /// default rule.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::UnknownChain`] for unregistered chains and
    /// [`FirewallError::Port`] when programming fails.
    pub fn set_uid_rule(
        &self,
        chain: ChainId,
        uid: Uid,
        rule: RuleRequest,
    ) -> Result<(), FirewallError> {
        let mut params = FirewallAuditEventParams::new(FirewallOperation::SetUidRule, chain);
        params.uid = Some(uid);
        params.requested_rule = Some(rule);
        let result = self.admit(chain, FirewallOperation::SetUidRule, &mut params);
        let outcome = match result {
            Ok(Some(descriptor)) => {
                let resolution = resolve_rule(descriptor.kind, rule);
                params.port_rule = Some(resolution.port_rule);
                self.with_chain(chain, |state| {
                    self.port.set_uid_rule(chain, uid, resolution.port_rule)?;
                    match resolution.stored {
                        Some(stored) => state.uid_rules.insert(uid, stored),
                        None => state.uid_rules.remove(&uid),
                    };
                    Ok(())
                })
            }
            Ok(None) => {
                self.record(params, AuditOutcome::SkippedGateClosed, None);
                return Ok(());
            }
            Err(err) => Err(err),
        };
        self.finish(params, outcome)
    }

    /// Allows a UID on metered networks while data saver is on.
    ///
    /// # Errors
    ///
    /// See [`Self::set_uid_rule`].
    pub fn add_to_metered_allow_list(&self, uid: Uid) -> Result<(), FirewallError> {
        self.set_uid_rule(ChainId::METERED_ALLOW, uid, RuleRequest::Allow)
    }

    /// Removes a UID from the metered-network allow list.
    ///
    /// # Errors
    ///
    /// See [`Self::set_uid_rule`].
    pub fn remove_from_metered_allow_list(&self, uid: Uid) -> Result<(), FirewallError> {
        self.set_uid_rule(ChainId::METERED_ALLOW, uid, RuleRequest::Deny)
    }

    /// Blocks a UID on metered networks by user choice.
    ///
    /// # Errors
    ///
    /// See [`Self::set_uid_rule`].
    pub fn add_to_metered_deny_list(&self, uid: Uid) -> Result<(), FirewallError> {
        self.set_uid_rule(ChainId::METERED_DENY_USER, uid, RuleRequest::Deny)
    }

    /// Removes a UID from the user metered-network deny list.
    ///
    /// # Errors
    ///
    /// See [`Self::set_uid_rule`].
    pub fn remove_from_metered_deny_list(&self, uid: Uid) -> Result<(), FirewallError> {
        self.set_uid_rule(ChainId::METERED_DENY_USER, uid, RuleRequest::Allow)
    }

    /// Executes a serialized command.
    ///
    /// # Errors
    ///
    /// Returns the error of the operation the command maps to.
    pub fn execute(&self, command: &FirewallCommand) -> Result<(), FirewallError> {
        match command {
            FirewallCommand::SetChainEnabled {
                chain,
                enabled,
            } => self.set_chain_enabled(*chain, *enabled),
            FirewallCommand::ReplaceChainUids {
                chain,
                uids,
            } => self.replace_chain_uids(*chain, uids),
            FirewallCommand::SetUidRule {
                chain,
                uid,
                rule,
            } => self.set_uid_rule(*chain, *uid, *rule),
            FirewallCommand::AddToMeteredAllowList {
                uid,
            } => self.add_to_metered_allow_list(*uid),
            FirewallCommand::RemoveFromMeteredAllowList {
                uid,
            } => self.remove_from_metered_allow_list(*uid),
            FirewallCommand::AddToMeteredDenyList {
                uid,
            } => self.add_to_metered_deny_list(*uid),
            FirewallCommand::RemoveFromMeteredDenyList {
                uid,
            } => self.remove_from_metered_deny_list(*uid),
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns whether a chain is currently enforced.
    ///
    /// Always-on chains report `true`; gated chains with a closed gate report
    /// `false`.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::UnknownChain`] for unregistered chains.
    pub fn is_chain_enabled(&self, chain: ChainId) -> Result<bool, FirewallError> {
        let descriptor = self.registry.describe(chain)?;
        if !self.gate_open(descriptor) {
            return Ok(false);
        }
        if descriptor.is_always_on() {
            return Ok(true);
        }
        Ok(self.lock_chain(chain)?.enabled)
    }

    /// Returns the effective rule for a UID on a chain.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::UnknownChain`] for unregistered chains.
    pub fn uid_rule(&self, chain: ChainId, uid: Uid) -> Result<FirewallRule, FirewallError> {
        let descriptor = self.registry.describe(chain)?;
        let state = self.lock_chain(chain)?;
        Ok(state.uid_rules.get(&uid).copied().unwrap_or_else(|| descriptor.default_rule()))
    }

    /// Returns a snapshot of a chain's runtime state.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::UnknownChain`] for unregistered chains.
    pub fn chain_snapshot(&self, chain: ChainId) -> Result<ChainSnapshot, FirewallError> {
        let descriptor = self.registry.describe(chain)?;
        let gate_open = self.gate_open(descriptor);
        let state = self.lock_chain(chain)?.clone();
        Ok(ChainSnapshot {
            chain,
            name: descriptor.name,
            kind: descriptor.kind,
            default_rule: descriptor.default_rule(),
            enabled: state.enabled,
            gate_open,
            uid_rules: state.uid_rules,
        })
    }

    /// Returns snapshots for every registered chain in id order.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::StatePoisoned`] when a chain lock is poisoned.
    pub fn snapshots(&self) -> Result<Vec<ChainSnapshot>, FirewallError> {
        self.registry.iter().map(|descriptor| self.chain_snapshot(descriptor.id)).collect()
    }

    /// Evaluates whether traffic for a UID passes every applicable chain.
    ///
    /// Metered deny chains are consulted first, then the metered allow chain,
    /// then enabled dynamic chains in id order. Chains with a closed gate are
    /// skipped. Each chain is locked on its own, so the verdict is not atomic
    /// across chains.
    ///
    /// # Errors
    ///
    /// Returns [`FirewallError::StatePoisoned`] when a chain lock is poisoned.
    pub fn evaluate(&self, uid: Uid, context: TrafficContext) -> Result<Verdict, FirewallError> {
        let mut ordered: Vec<&ChainDescriptor> = self.registry.iter().collect();
        ordered.sort_by_key(|descriptor| (scope_precedence(descriptor.scope), descriptor.id));
        for descriptor in ordered {
            if !context.covers(descriptor.scope) || !self.gate_open(descriptor) {
                continue;
            }
            let state = self.lock_chain(descriptor.id)?;
            if !(descriptor.is_always_on() || state.enabled) {
                continue;
            }
            let rule =
                state.uid_rules.get(&uid).copied().unwrap_or_else(|| descriptor.default_rule());
            drop(state);
            if rule == FirewallRule::Deny {
                return Ok(Verdict {
                    uid,
                    context,
                    blocked_by: Some(descriptor.id),
                });
            }
        }
        Ok(Verdict {
            uid,
            context,
            blocked_by: None,
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Resolves the chain and applies structural and gate checks.
    ///
    /// Returns `Ok(None)` when the chain's gate is closed.
    fn admit(
        &self,
        chain: ChainId,
        operation: FirewallOperation,
        params: &mut FirewallAuditEventParams,
    ) -> Result<Option<&ChainDescriptor>, FirewallError> {
        let descriptor = self.registry.describe(chain)?;
        params.chain_name = Some(descriptor.name);
        let structural = matches!(
            operation,
            FirewallOperation::SetChainEnabled | FirewallOperation::ReplaceChainUids
        );
        if structural && descriptor.is_always_on() {
            return Err(FirewallError::UnsupportedOperation {
                chain,
                operation,
            });
        }
        if !self.gate_open(descriptor) {
            return Ok(None);
        }
        Ok(Some(descriptor))
    }

    /// Returns true when the chain is ungated or its flag is enabled.
    fn gate_open(&self, descriptor: &ChainDescriptor) -> bool {
        descriptor.feature_flag.as_ref().is_none_or(|flag| self.gate.is_enabled(flag))
    }

    /// Locks a chain's state.
    fn lock_chain(&self, chain: ChainId) -> Result<MutexGuard<'_, ChainState>, FirewallError> {
        self.chains
            .get(&chain)
            .ok_or(FirewallError::UnknownChain(chain))?
            .lock()
            .map_err(|_| FirewallError::StatePoisoned(chain))
    }

    /// Runs a mutation under the chain lock.
    ///
    /// Mutations program the port before touching state, so a port failure
    /// leaves the chain state untouched.
    fn with_chain<F>(&self, chain: ChainId, mutate: F) -> Result<(), FirewallError>
    where
        F: FnOnce(&mut ChainState) -> Result<(), FirewallError>,
    {
        let mut guard = self.lock_chain(chain)?;
        mutate(&mut *guard)
    }

    /// Records the audit event for a finished mutation and returns its result.
    fn finish(
        &self,
        params: FirewallAuditEventParams,
        outcome: Result<(), FirewallError>,
    ) -> Result<(), FirewallError> {
        match &outcome {
            Ok(()) => self.record(params, AuditOutcome::Applied, None),
            Err(err @ FirewallError::Port(_)) => {
                self.record(params, AuditOutcome::PortFailed, Some(err.to_string()));
            }
            Err(err) => self.record(params, AuditOutcome::Rejected, Some(err.to_string())),
        }
        outcome
    }

    /// Emits an audit event.
    fn record(
        &self,
        params: FirewallAuditEventParams,
        outcome: AuditOutcome,
        error: Option<String>,
    ) {
        self.audit.record(&FirewallAuditEvent::new(params, outcome, error));
    }
}

/// Orders chain scopes for verdict evaluation.
const fn scope_precedence(scope: ChainScope) -> u8 {
    match scope {
        ChainScope::Metered => 0,
        ChainScope::MeteredDataSaver => 1,
        ChainScope::AllNetworks => 2,
    }
}
