// crates/uid-firewall-core/tests/evaluate.rs
// ============================================================================
// Module: Verdict Evaluation Tests
// Description: Cross-chain precedence for traffic verdicts.
// ============================================================================
//! ## Overview
//! Validates which chain blocks a UID for each traffic context.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use uid_firewall_core::ChainId;
use uid_firewall_core::FeatureFlag;
use uid_firewall_core::RuleRequest;
use uid_firewall_core::TrafficContext;
use uid_firewall_core::Uid;

use crate::common::harness;

/// Metered network with data saver on.
const METERED_SAVER: TrafficContext = TrafficContext {
    metered: true,
    data_saver: true,
};

#[test]
fn fresh_engine_allows_everything_on_unmetered_networks() {
    let h = harness(true);
    let verdict = h.engine.evaluate(Uid::new(10), TrafficContext::UNMETERED).unwrap();
    assert!(verdict.is_allowed());
    assert_eq!(verdict.blocked_by, None);
}

#[test]
fn data_saver_blocks_uids_missing_from_the_metered_allow_list() {
    let h = harness(false);
    let uid = Uid::new(10);
    let verdict = h.engine.evaluate(uid, METERED_SAVER).unwrap();
    assert_eq!(verdict.blocked_by, Some(ChainId::METERED_ALLOW));

    h.engine.add_to_metered_allow_list(uid).unwrap();
    assert!(h.engine.evaluate(uid, METERED_SAVER).unwrap().is_allowed());

    let metered_only = TrafficContext {
        metered: true,
        data_saver: false,
    };
    assert!(h.engine.evaluate(Uid::new(11), metered_only).unwrap().is_allowed());
}

#[test]
fn metered_deny_chains_take_precedence() {
    let h = harness(false);
    let uid = Uid::new(10);
    h.engine.add_to_metered_allow_list(uid).unwrap();
    h.engine.set_uid_rule(ChainId::METERED_DENY_ADMIN, uid, RuleRequest::Deny).unwrap();
    h.engine.add_to_metered_deny_list(uid).unwrap();

    let verdict = h.engine.evaluate(uid, METERED_SAVER).unwrap();
    assert_eq!(verdict.blocked_by, Some(ChainId::METERED_DENY_USER));
    assert!(h.engine.evaluate(uid, TrafficContext::UNMETERED).unwrap().is_allowed());
}

#[test]
fn enabled_dynamic_chains_apply_in_id_order() {
    let h = harness(true);
    let uid = Uid::new(10);
    h.engine.set_chain_enabled(ChainId::OEM_DENY_2, true).unwrap();
    h.engine.replace_chain_uids(ChainId::OEM_DENY_2, &[uid]).unwrap();
    assert_eq!(
        h.engine.evaluate(uid, TrafficContext::UNMETERED).unwrap().blocked_by,
        Some(ChainId::OEM_DENY_2)
    );

    h.engine.set_chain_enabled(ChainId::DOZABLE, true).unwrap();
    assert_eq!(
        h.engine.evaluate(uid, TrafficContext::UNMETERED).unwrap().blocked_by,
        Some(ChainId::DOZABLE)
    );

    h.engine.replace_chain_uids(ChainId::DOZABLE, &[uid]).unwrap();
    assert_eq!(
        h.engine.evaluate(uid, TrafficContext::UNMETERED).unwrap().blocked_by,
        Some(ChainId::OEM_DENY_2)
    );
}

#[test]
fn closed_gate_skips_the_background_chain() {
    let h = harness(true);
    let uid = Uid::new(10);
    h.engine.set_chain_enabled(ChainId::BACKGROUND, true).unwrap();
    assert_eq!(
        h.engine.evaluate(uid, TrafficContext::UNMETERED).unwrap().blocked_by,
        Some(ChainId::BACKGROUND)
    );

    h.gate.set(FeatureFlag::BACKGROUND_FIREWALL_CHAIN, false);
    assert!(h.engine.evaluate(uid, TrafficContext::UNMETERED).unwrap().is_allowed());
}
