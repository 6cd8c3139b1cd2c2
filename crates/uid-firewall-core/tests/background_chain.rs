// crates/uid-firewall-core/tests/background_chain.rs
// ============================================================================
// Module: Background Chain Tests
// Description: Feature-gated chain behavior with the gate open and closed.
// ============================================================================
//! ## Overview
//! Validates that a closed gate absorbs every mutation without touching the
//! packet filter, and that an open gate programs exactly one call per request.

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

use uid_firewall_core::AuditOutcome;
use uid_firewall_core::ChainId;
use uid_firewall_core::FeatureFlag;
use uid_firewall_core::FeatureGate;
use uid_firewall_core::FirewallRule;
use uid_firewall_core::PortCall;
use uid_firewall_core::RuleRequest;
use uid_firewall_core::Uid;

use crate::common::harness;

// ============================================================================
// SECTION: Gate Closed
// ============================================================================

#[test]
fn closed_gate_makes_every_mutation_a_silent_no_op() {
    let h = harness(false);
    let chain = ChainId::BACKGROUND;

    h.engine.set_chain_enabled(chain, true).unwrap();
    h.engine.replace_chain_uids(chain, &[Uid::new(53), Uid::new(42)]).unwrap();
    h.engine.set_uid_rule(chain, Uid::new(2345), RuleRequest::Allow).unwrap();

    assert!(h.filter.calls().is_empty());
    assert_eq!(h.audit.outcomes(), vec![AuditOutcome::SkippedGateClosed; 3]);
    assert!(!h.engine.is_chain_enabled(chain).unwrap());
    assert_eq!(h.engine.uid_rule(chain, Uid::new(2345)).unwrap(), FirewallRule::Deny);
}

#[test]
fn closed_gate_hides_previously_enabled_chain() {
    let h = harness(true);
    h.engine.set_chain_enabled(ChainId::BACKGROUND, true).unwrap();
    assert!(h.engine.is_chain_enabled(ChainId::BACKGROUND).unwrap());

    h.gate.set(FeatureFlag::BACKGROUND_FIREWALL_CHAIN, false);
    assert!(!h.engine.is_chain_enabled(ChainId::BACKGROUND).unwrap());
    let snapshot = h.engine.chain_snapshot(ChainId::BACKGROUND).unwrap();
    assert!(snapshot.enabled);
    assert!(!snapshot.gate_open);
}

#[test]
fn gate_is_rechecked_on_every_call() {
    let h = harness(false);
    h.engine.set_chain_enabled(ChainId::BACKGROUND, true).unwrap();
    assert!(h.filter.calls().is_empty());

    h.gate.set(FeatureFlag::BACKGROUND_FIREWALL_CHAIN, true);
    h.engine.set_chain_enabled(ChainId::BACKGROUND, true).unwrap();
    assert_eq!(
        h.filter.calls(),
        vec![PortCall::SetChildChain {
            chain: ChainId::BACKGROUND,
            enabled: true,
        }]
    );

    h.gate.set(FeatureFlag::BACKGROUND_FIREWALL_CHAIN, false);
    h.engine.set_chain_enabled(ChainId::BACKGROUND, false).unwrap();
    assert_eq!(h.filter.calls().len(), 1);
}

#[test]
fn engine_handles_share_the_injected_gate_and_port() {
    let h = harness(false);
    h.engine.gate().set(FeatureFlag::BACKGROUND_FIREWALL_CHAIN, true);
    assert!(h.gate.is_enabled(&FeatureFlag::BACKGROUND_FIREWALL_CHAIN));

    h.engine.set_chain_enabled(ChainId::BACKGROUND, true).unwrap();
    assert_eq!(
        h.engine.port().take_calls(),
        vec![PortCall::SetChildChain {
            chain: ChainId::BACKGROUND,
            enabled: true,
        }]
    );
    assert!(h.filter.calls().is_empty());
}

// ============================================================================
// SECTION: Gate Open
// ============================================================================

#[test]
fn toggling_issues_one_child_chain_call_each_in_order() {
    let h = harness(true);
    h.engine.set_chain_enabled(ChainId::BACKGROUND, true).unwrap();
    h.engine.set_chain_enabled(ChainId::BACKGROUND, false).unwrap();

    assert_eq!(
        h.filter.calls(),
        vec![
            PortCall::SetChildChain {
                chain: ChainId::BACKGROUND,
                enabled: true,
            },
            PortCall::SetChildChain {
                chain: ChainId::BACKGROUND,
                enabled: false,
            },
        ]
    );
    assert!(!h.engine.is_chain_enabled(ChainId::BACKGROUND).unwrap());
}

#[test]
fn replace_passes_the_exact_uid_sequence() {
    let h = harness(true);
    let uids = [Uid::new(53), Uid::new(42), Uid::new(79)];
    h.engine.replace_chain_uids(ChainId::BACKGROUND, &uids).unwrap();

    assert_eq!(
        h.filter.calls(),
        vec![PortCall::ReplaceUidChain {
            chain: ChainId::BACKGROUND,
            uids: uids.to_vec(),
        }]
    );
    for uid in uids {
        assert_eq!(h.engine.uid_rule(ChainId::BACKGROUND, uid).unwrap(), FirewallRule::Allow);
    }
    assert_eq!(h.engine.uid_rule(ChainId::BACKGROUND, Uid::new(1)).unwrap(), FirewallRule::Deny);
}

#[test]
fn replace_drops_overrides_not_in_the_new_set() {
    let h = harness(true);
    h.engine.set_uid_rule(ChainId::BACKGROUND, Uid::new(7), RuleRequest::Allow).unwrap();
    h.engine.replace_chain_uids(ChainId::BACKGROUND, &[Uid::new(8)]).unwrap();

    let snapshot = h.engine.chain_snapshot(ChainId::BACKGROUND).unwrap();
    assert_eq!(snapshot.uid_rules.len(), 1);
    assert_eq!(snapshot.uid_rules.get(&Uid::new(8)), Some(&FirewallRule::Allow));
}

#[test]
fn uid_rule_sequence_resolves_default_to_deny() {
    let h = harness(true);
    let uid = Uid::new(2345);
    h.engine.set_uid_rule(ChainId::BACKGROUND, uid, RuleRequest::Default).unwrap();
    h.engine.set_uid_rule(ChainId::BACKGROUND, uid, RuleRequest::Deny).unwrap();
    h.engine.set_uid_rule(ChainId::BACKGROUND, uid, RuleRequest::Allow).unwrap();

    let expected: Vec<PortCall> = [FirewallRule::Deny, FirewallRule::Deny, FirewallRule::Allow]
        .into_iter()
        .map(|rule| PortCall::SetUidRule {
            chain: ChainId::BACKGROUND,
            uid,
            rule,
        })
        .collect();
    assert_eq!(h.filter.calls(), expected);
    assert_eq!(h.engine.uid_rule(ChainId::BACKGROUND, uid).unwrap(), FirewallRule::Allow);
}

#[test]
fn default_request_removes_the_override() {
    let h = harness(true);
    let uid = Uid::new(10);
    h.engine.set_uid_rule(ChainId::BACKGROUND, uid, RuleRequest::Allow).unwrap();
    h.engine.set_uid_rule(ChainId::BACKGROUND, uid, RuleRequest::Default).unwrap();

    let snapshot = h.engine.chain_snapshot(ChainId::BACKGROUND).unwrap();
    assert!(snapshot.uid_rules.is_empty());
    assert_eq!(h.filter.programmed_rule(ChainId::BACKGROUND, uid), Some(FirewallRule::Deny));
}
