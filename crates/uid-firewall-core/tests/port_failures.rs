// crates/uid-firewall-core/tests/port_failures.rs
// ============================================================================
// Module: Port Failure Tests
// Description: Rollback behavior when the packet filter rejects an update.
// ============================================================================
//! ## Overview
//! Validates that port failures surface unchanged and leave chain state equal
//! to what was last programmed successfully.

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
use uid_firewall_core::FirewallError;
use uid_firewall_core::FirewallRule;
use uid_firewall_core::PortCall;
use uid_firewall_core::PortError;
use uid_firewall_core::RuleRequest;
use uid_firewall_core::Uid;

use crate::common::harness;

#[test]
fn failed_toggle_keeps_previous_state() {
    let h = harness(true);
    h.filter.fail_next(PortError::Rejected("busy".to_string()));

    let err = h.engine.set_chain_enabled(ChainId::STANDBY, true).unwrap_err();
    assert!(matches!(
        err,
        FirewallError::Port(PortError::Rejected(ref reason)) if reason == "busy"
    ));
    assert_eq!(err.to_string(), "packet filter rejected update: busy");
    assert!(!h.engine.is_chain_enabled(ChainId::STANDBY).unwrap());
    assert!(h.filter.calls().is_empty());

    h.engine.set_chain_enabled(ChainId::STANDBY, true).unwrap();
    assert!(h.engine.is_chain_enabled(ChainId::STANDBY).unwrap());
}

#[test]
fn failed_rule_update_keeps_previous_override() {
    let h = harness(true);
    let uid = Uid::new(42);
    h.engine.set_uid_rule(ChainId::BACKGROUND, uid, RuleRequest::Allow).unwrap();

    h.filter.fail_next(PortError::Unavailable("offline".to_string()));
    let err = h.engine.set_uid_rule(ChainId::BACKGROUND, uid, RuleRequest::Default).unwrap_err();
    assert_eq!(err.kind(), "port_failure");
    assert_eq!(h.engine.uid_rule(ChainId::BACKGROUND, uid).unwrap(), FirewallRule::Allow);
    assert_eq!(h.audit.outcomes(), vec![AuditOutcome::Applied, AuditOutcome::PortFailed]);
}

#[test]
fn failure_after_success_only_drops_the_failed_call() {
    let h = harness(true);
    h.engine.set_uid_rule(ChainId::DOZABLE, Uid::new(5), RuleRequest::Allow).unwrap();
    assert_eq!(h.filter.take_calls().len(), 1);

    h.filter.fail_next(PortError::Unavailable("offline".to_string()));
    assert!(h.engine.set_uid_rule(ChainId::DOZABLE, Uid::new(6), RuleRequest::Allow).is_err());
    h.engine.set_uid_rule(ChainId::DOZABLE, Uid::new(7), RuleRequest::Allow).unwrap();

    let snapshot = h.engine.chain_snapshot(ChainId::DOZABLE).unwrap();
    let listed: Vec<Uid> = snapshot.uid_rules.keys().copied().collect();
    assert_eq!(listed, vec![Uid::new(5), Uid::new(7)]);
    assert_eq!(
        h.filter.take_calls(),
        vec![PortCall::SetUidRule {
            chain: ChainId::DOZABLE,
            uid: Uid::new(7),
            rule: FirewallRule::Allow,
        }]
    );
}

#[test]
fn failed_replace_keeps_previous_uid_set() {
    let h = harness(true);
    h.engine.replace_chain_uids(ChainId::OEM_DENY_1, &[Uid::new(1), Uid::new(2)]).unwrap();

    h.filter.fail_next(PortError::Rejected("map full".to_string()));
    assert!(h.engine.replace_chain_uids(ChainId::OEM_DENY_1, &[Uid::new(3)]).is_err());

    let snapshot = h.engine.chain_snapshot(ChainId::OEM_DENY_1).unwrap();
    let listed: Vec<Uid> = snapshot.uid_rules.keys().copied().collect();
    assert_eq!(listed, vec![Uid::new(1), Uid::new(2)]);
    assert!(snapshot.uid_rules.values().all(|rule| *rule == FirewallRule::Deny));
    assert_eq!(h.filter.uid_list(ChainId::OEM_DENY_1), Some(vec![Uid::new(1), Uid::new(2)]));
}
