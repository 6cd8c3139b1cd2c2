// crates/uid-firewall-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Helpers
// Description: Shared engine fixtures and a recording audit sink.
// Purpose: Reduce duplication across uid-firewall-core integration tests.
// ============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(clippy::unwrap_used, reason = "Test helpers lock uncontended mutexes.")]

use std::sync::Arc;
use std::sync::Mutex;

use uid_firewall_core::AuditOutcome;
use uid_firewall_core::ChainRegistry;
use uid_firewall_core::FeatureFlag;
use uid_firewall_core::FirewallAuditEvent;
use uid_firewall_core::FirewallAuditSink;
use uid_firewall_core::FirewallEngine;
use uid_firewall_core::InMemoryPacketFilter;
use uid_firewall_core::RuntimeFeatureGate;

/// Engine type used by most suites.
pub type TestEngine = FirewallEngine<InMemoryPacketFilter, RuntimeFeatureGate>;

/// Engine plus handles to its port and gate.
pub struct Harness {
    /// Engine under test.
    pub engine: TestEngine,
    /// Recording filter shared with the engine.
    pub filter: InMemoryPacketFilter,
    /// Gate handle shared with the engine.
    pub gate: RuntimeFeatureGate,
    /// Audit events emitted by the engine.
    pub audit: Arc<RecordingAuditSink>,
}

/// Builds a standard-registry engine with the background gate set as requested.
pub fn harness(background_gate_open: bool) -> Harness {
    let filter = InMemoryPacketFilter::new();
    let gate = RuntimeFeatureGate::default();
    gate.set(FeatureFlag::BACKGROUND_FIREWALL_CHAIN, background_gate_open);
    let audit = Arc::new(RecordingAuditSink::default());
    let engine = FirewallEngine::new(ChainRegistry::standard(), filter.clone(), gate.clone())
        .with_audit_sink(audit.clone());
    Harness {
        engine,
        filter,
        gate,
        audit,
    }
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Events in arrival order.
    events: Mutex<Vec<FirewallAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns the recorded events.
    pub fn events(&self) -> Vec<FirewallAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the recorded outcomes in order.
    pub fn outcomes(&self) -> Vec<AuditOutcome> {
        self.events().into_iter().map(|event| event.outcome).collect()
    }
}

impl FirewallAuditSink for RecordingAuditSink {
    fn record(&self, event: &FirewallAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
