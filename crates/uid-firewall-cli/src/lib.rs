// crates/uid-firewall-cli/src/lib.rs
// ============================================================================
// Module: UID Firewall CLI Library
// Description: Shared helpers for the UID firewall command-line interface.
// Purpose: Provide reusable components (i18n, dry runs) for the CLI binary and tests.
// Dependencies: uid-firewall-config, uid-firewall-core, serde, serde_json
// ============================================================================

//! ## Overview
//! This library houses the CLI's message catalog and the dry-run runner that
//! drives a firewall engine against the recording in-memory packet filter.
//! The binary entry point (`src/main.rs`) imports these helpers to keep all
//! user-facing output consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Dry-run engine runner and bounded input reads.
pub mod runner;
