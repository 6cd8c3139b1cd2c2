// crates/uid-firewall-config/src/lib.rs
// ============================================================================
// Module: UID Firewall Config Library
// Description: Canonical config model, validation, and engine bootstrap.
// Purpose: Single source of truth for uid-firewall.toml semantics.
// Dependencies: uid-firewall-core, serde, toml
// ============================================================================

//! ## Overview
//! `uid-firewall-config` defines the configuration model for the UID firewall
//! engine. It provides strict, fail-closed validation and turns a validated
//! file into a feature gate, an audit sink, and the ordered list of commands
//! that bring a fresh engine to the configured state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
