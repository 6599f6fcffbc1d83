//! The ticket view derivation pipeline.
//!
//! A pure pipeline, independent of any rendering layer:
//!
//! ```text
//! raw tickets -> normalize -> filter -> group        (list view)
//!                                    \-> project     (kanban view)
//! ```
//!
//! Inputs are immutable, outputs are fresh values; consumers re-run the whole
//! pipeline on every state change (new fetch, filter edit, drag). There is no
//! incremental update model.

mod filter;
mod group;
mod kanban;
mod normalize;

pub use filter::{DateRange, FacetFilters, FacetSelection};
pub use group::{group_rows, GroupKey, TicketGroup, ALL_TICKETS, UNASSIGNED};
pub use kanban::{
    category_of, columns_for, project_board, reassignment_patch, BoardColumn, Category,
    KanbanColumn, KanbanDimension, ProjectionError,
};
pub use normalize::{
    avatar_color, format_date, initials, normalize_all, PersonBadge, TicketRow, NO_DUE_DATE,
    UNKNOWN_PERSON,
};

use crate::ticket::{Ticket, TicketTypeEntry};

/// Run the full pipeline down to grouped buckets.
pub fn derive_groups(
    tickets: &[Ticket],
    filters: &FacetFilters,
    key: GroupKey,
) -> Vec<TicketGroup> {
    let rows = normalize_all(tickets);
    let filtered = filters.apply(&rows);
    group_rows(&filtered, key)
}

/// Run the full pipeline down to board columns.
pub fn derive_board(
    tickets: &[Ticket],
    filters: &FacetFilters,
    dimension: KanbanDimension,
    registry: &[TicketTypeEntry],
) -> Vec<BoardColumn> {
    let rows = normalize_all(tickets);
    let filtered = filters.apply(&rows);
    project_board(&filtered, dimension, registry)
}
