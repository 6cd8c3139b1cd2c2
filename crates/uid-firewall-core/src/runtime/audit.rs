// crates/uid-firewall-core/src/runtime/audit.rs
// ============================================================================
// Module: UID Firewall Audit Logging
// Description: Structured audit events for firewall chain mutations.
// Purpose: Emit JSON-line audit records without a logging framework dependency.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every mutation request produces exactly one [`FirewallAuditEvent`],
//! including requests absorbed by a closed feature gate and requests that
//! failed. Sinks swallow their own I/O failures so auditing can never change
//! enforcement outcomes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::ChainId;
use crate::core::FirewallOperation;
use crate::core::FirewallRule;
use crate::core::RuleRequest;
use crate::core::Uid;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome classification for a mutation request.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// State updated and the port call succeeded.
    Applied,
    /// Chain is gated and the gate was closed; nothing happened.
    SkippedGateClosed,
    /// Request was refused before reaching the port.
    Rejected,
    /// Port call failed; in-memory state was left unchanged.
    PortFailed,
}

/// Firewall mutation audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Mutation primitive.
    pub operation: FirewallOperation,
    /// Target chain.
    pub chain: ChainId,
    /// Chain name when the chain is registered.
    pub chain_name: Option<&'static str>,
    /// Target UID for single-UID mutations.
    pub uid: Option<Uid>,
    /// Number of UIDs for bulk replacement.
    pub uid_count: Option<usize>,
    /// Requested rule for single-UID mutations.
    pub requested_rule: Option<RuleRequest>,
    /// Rule sent to the port for single-UID mutations.
    pub port_rule: Option<FirewallRule>,
    /// Requested enablement for chain toggles.
    pub enabled: Option<bool>,
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// Error text when the request failed.
    pub error: Option<String>,
}

/// Inputs required to construct a firewall audit event.
#[derive(Debug, Clone)]
pub struct FirewallAuditEventParams {
    /// Mutation primitive.
    pub operation: FirewallOperation,
    /// Target chain.
    pub chain: ChainId,
    /// Chain name when the chain is registered.
    pub chain_name: Option<&'static str>,
    /// Target UID for single-UID mutations.
    pub uid: Option<Uid>,
    /// Number of UIDs for bulk replacement.
    pub uid_count: Option<usize>,
    /// Requested rule for single-UID mutations.
    pub requested_rule: Option<RuleRequest>,
    /// Rule sent to the port for single-UID mutations.
    pub port_rule: Option<FirewallRule>,
    /// Requested enablement for chain toggles.
    pub enabled: Option<bool>,
}

impl FirewallAuditEventParams {
    /// Creates parameters for an operation on a chain with no detail fields set.
    #[must_use]
    pub const fn new(operation: FirewallOperation, chain: ChainId) -> Self {
        Self {
            operation,
            chain,
            chain_name: None,
            uid: None,
            uid_count: None,
            requested_rule: None,
            port_rule: None,
            enabled: None,
        }
    }
}

impl FirewallAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(
        params: FirewallAuditEventParams,
        outcome: AuditOutcome,
        error: Option<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "firewall_mutation",
            timestamp_ms,
            operation: params.operation,
            chain: params.chain,
            chain_name: params.chain_name,
            uid: params.uid,
            uid_count: params.uid_count,
            requested_rule: params.requested_rule,
            port_rule: params.port_rule,
            enabled: params.enabled,
            outcome,
            error,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for firewall mutation events.
pub trait FirewallAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &FirewallAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl FirewallAuditSink for StderrAuditSink {
    fn record(&self, event: &FirewallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FirewallAuditSink for FileAuditSink {
    fn record(&self, event: &FirewallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl FirewallAuditSink for NoopAuditSink {
    fn record(&self, _event: &FirewallAuditEvent) {}
}
