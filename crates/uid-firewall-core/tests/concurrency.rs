// crates/uid-firewall-core/tests/concurrency.rs
// ============================================================================
// Module: Engine Concurrency Tests
// Description: Parallel mutations across and within chains.
// ============================================================================
//! ## Overview
//! Validates that concurrent mutations never lose updates and that the engine
//! can be shared across threads.

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

use std::thread;

use uid_firewall_core::ChainId;
use uid_firewall_core::FirewallRule;
use uid_firewall_core::RuleRequest;
use uid_firewall_core::Uid;

use crate::common::harness;

#[test]
fn parallel_rule_updates_on_one_chain_are_all_kept() {
    let h = harness(true);
    let engine = &h.engine;
    thread::scope(|scope| {
        for worker in 0_u32 .. 8 {
            scope.spawn(move || {
                for offset in 0_u32 .. 25 {
                    let uid = Uid::new(worker * 100 + offset);
                    engine.set_uid_rule(ChainId::OEM_DENY_3, uid, RuleRequest::Deny).unwrap();
                }
            });
        }
    });

    let snapshot = h.engine.chain_snapshot(ChainId::OEM_DENY_3).unwrap();
    assert_eq!(snapshot.uid_rules.len(), 200);
    assert!(snapshot.uid_rules.values().all(|rule| *rule == FirewallRule::Deny));
    assert_eq!(h.filter.calls().len(), 200);
}

#[test]
fn parallel_mutations_on_distinct_chains_do_not_interfere() {
    let h = harness(true);
    let engine = &h.engine;
    let chains = [ChainId::DOZABLE, ChainId::STANDBY, ChainId::POWERSAVE, ChainId::BACKGROUND];
    thread::scope(|scope| {
        for chain in chains {
            scope.spawn(move || {
                engine.set_chain_enabled(chain, true).unwrap();
                engine.replace_chain_uids(chain, &[Uid::new(chain.get())]).unwrap();
            });
        }
    });

    for chain in chains {
        assert!(h.engine.is_chain_enabled(chain).unwrap());
        let snapshot = h.engine.chain_snapshot(chain).unwrap();
        let listed: Vec<Uid> = snapshot.uid_rules.keys().copied().collect();
        assert_eq!(listed, vec![Uid::new(chain.get())]);
    }
    assert_eq!(h.filter.calls().len(), 8);
}
