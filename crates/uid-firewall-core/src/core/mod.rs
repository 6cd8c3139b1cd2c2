// crates/uid-firewall-core/src/core/mod.rs
// ============================================================================
// Module: UID Firewall Core Types
// Description: Canonical chain, rule, command, and verdict structures.
// Purpose: Provide stable, serializable types shared by every crate surface.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are plain data. Behavior (registry lookups, rule resolution,
//! enforcement) lives in [`crate::runtime`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod chain;
pub mod command;
pub mod identifiers;
pub mod rule;
pub mod traffic;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use chain::ChainDescriptor;
pub use chain::ChainKind;
pub use chain::ChainScope;
pub use chain::ChainSnapshot;
pub use chain::ChainToggle;
pub use command::FirewallCommand;
pub use command::FirewallOperation;
pub use identifiers::ChainId;
pub use identifiers::FeatureFlag;
pub use identifiers::Uid;
pub use rule::FirewallRule;
pub use rule::RuleRequest;
pub use traffic::TrafficContext;
pub use traffic::Verdict;
