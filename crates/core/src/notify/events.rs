//! User-facing desk events.
//!
//! Events are the notification surface: every recoverable failure and every
//! applied mutation produces one, and the consumer (server log, UI toast
//! channel) decides how to present it. Nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Desk event types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Ticket lifecycle
    TicketCreated {
        ticket_id: String,
        display_id: String,
        title: String,
    },
    TicketUpdated {
        ticket_id: String,
    },
    TicketDeleted {
        ticket_id: String,
    },

    // Board moves
    /// A column reassignment was persisted.
    TicketMoved {
        ticket_id: String,
        dimension: String,
        column: String,
    },
    /// A column reassignment failed to persist and was rolled back; the
    /// ticket is shown back in its original column.
    MoveFailed {
        ticket_id: String,
        dimension: String,
        column: String,
        error: String,
    },

    // Collection refresh
    /// A fetch failed; the previously known collection is still displayed.
    RefreshFailed {
        error: String,
    },

    // Bulk operations
    /// Outcome of a bulk delete: per-item failures do not abort the rest.
    TicketsDeleted {
        deleted: u32,
        failed: u32,
    },
}
