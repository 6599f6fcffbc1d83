//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - The view derivation pipeline (group/board derivations)
//! - Desk mutations (moves persisted vs rolled back)
//! - Store traffic (requests by operation and result)

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// View derivations by stage ("groups", "board").
pub static VIEW_DERIVATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "deskline_view_derivations_total",
            "Full pipeline derivations run",
        ),
        &["stage"],
    )
    .unwrap()
});

/// Column reassignments by outcome.
pub static TICKET_MOVES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("deskline_ticket_moves_total", "Kanban column reassignments"),
        &["result"], // "persisted", "rolled_back"
    )
    .unwrap()
});

/// Store requests by operation and result.
pub static STORE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("deskline_store_requests_total", "Ticket store requests"),
        &["op", "result"], // op: "fetch"|"create"|"update"|"delete"|"types"
    )
    .unwrap()
});

/// Individual failures inside bulk delete operations.
pub static BULK_DELETE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "deskline_bulk_delete_failures_total",
        "Per-item failures during bulk deletes",
    )
    .unwrap()
});

/// Register all core metrics with a registry.
pub fn register_core_metrics(registry: &Registry) {
    let _ = registry.register(Box::new(VIEW_DERIVATIONS.clone()));
    let _ = registry.register(Box::new(TICKET_MOVES.clone()));
    let _ = registry.register(Box::new(STORE_REQUESTS.clone()));
    let _ = registry.register(Box::new(BULK_DELETE_FAILURES.clone()));
}
