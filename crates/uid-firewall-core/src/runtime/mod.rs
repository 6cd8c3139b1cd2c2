// crates/uid-firewall-core/src/runtime/mod.rs
// ============================================================================
// Module: UID Firewall Runtime
// Description: Chain registry, enforcement engine, gates, and audit sinks.
// Purpose: Apply chain mutations against a packet-filter port.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the chain catalog and the engine that mutates chain
//! state. Every caller, whether a service or the CLI, goes through
//! [`FirewallEngine`] so gating and rollback behave identically.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod engine;
pub mod feature_gate;
pub mod memory;
pub mod registry;
pub mod resolver;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditOutcome;
pub use audit::FileAuditSink;
pub use audit::FirewallAuditEvent;
pub use audit::FirewallAuditEventParams;
pub use audit::FirewallAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use engine::FirewallEngine;
pub use engine::FirewallError;
pub use feature_gate::RuntimeFeatureGate;
pub use feature_gate::StaticFeatureGate;
pub use memory::InMemoryPacketFilter;
pub use memory::PortCall;
pub use registry::ChainRegistry;
pub use registry::METERED_ALLOW_CHAINS;
pub use registry::METERED_DENY_CHAINS;
pub use registry::RegistryError;
pub use resolver::Resolution;
pub use resolver::resolve_rule;
