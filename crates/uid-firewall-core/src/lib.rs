// crates/uid-firewall-core/src/lib.rs
// ============================================================================
// Module: UID Firewall Core Library
// Description: Public API surface for the UID firewall chain engine.
// Purpose: Expose chain types, port interfaces, and the enforcement engine.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! UID firewall core decides, per application UID, whether traffic passes a
//! set of named firewall chains. It keeps the logical chain state and
//! programs a packet filter through [`PacketFilterPort`]; it never touches a
//! kernel itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::FeatureGate;
pub use interfaces::PacketFilterPort;
pub use interfaces::PortError;
pub use runtime::AuditOutcome;
pub use runtime::ChainRegistry;
pub use runtime::FileAuditSink;
pub use runtime::FirewallAuditEvent;
pub use runtime::FirewallAuditSink;
pub use runtime::FirewallEngine;
pub use runtime::FirewallError;
pub use runtime::InMemoryPacketFilter;
pub use runtime::METERED_ALLOW_CHAINS;
pub use runtime::METERED_DENY_CHAINS;
pub use runtime::NoopAuditSink;
pub use runtime::PortCall;
pub use runtime::RegistryError;
pub use runtime::RuntimeFeatureGate;
pub use runtime::StaticFeatureGate;
pub use runtime::StderrAuditSink;
