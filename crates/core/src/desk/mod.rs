//! The ticket desk: owner of the in-memory collection.
//!
//! The desk holds the last-fetched ticket collection and the cached type
//! registry, and is the single place mutations flow through. Every write
//! follows the optimistic pattern: apply locally, persist, reconcile with the
//! server response on success, restore the snapshot on failure. View
//! derivations re-run the full pipeline against the current snapshot; there is
//! no incremental update model, so concurrent filter edits and refreshes
//! reconcile by simply deriving again.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::metrics;
use crate::notify::{DeskEvent, NotifyHandle};
use crate::ticket::{
    CreateTicketRequest, StoreError, Ticket, TicketPatch, TicketQuery, TicketStore,
    TicketTypeEntry,
};
use crate::view::{
    derive_board, derive_groups, normalize_all, reassignment_patch, BoardColumn, FacetFilters,
    GroupKey, KanbanDimension, ProjectionError, TicketGroup, TicketRow,
};

/// Errors for desk operations.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The ticket is not in the current collection.
    #[error("unknown ticket: {0}")]
    UnknownTicket(String),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Aggregated outcome of a bulk delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    /// How many deletions succeeded.
    pub deleted: usize,
    /// Per-item failures; one failure never aborts the remainder.
    pub failures: Vec<BulkFailure>,
}

/// One failed unit operation within a bulk request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkFailure {
    pub id: String,
    pub reason: String,
}

struct DeskState {
    tickets: Vec<Ticket>,
    registry: Vec<TicketTypeEntry>,
    /// Total match count reported by the store on the last refresh.
    total: i64,
}

/// Top-level controller owning the in-memory ticket collection.
pub struct TicketDesk {
    store: Arc<dyn TicketStore>,
    notify: NotifyHandle,
    state: RwLock<DeskState>,
}

impl TicketDesk {
    pub fn new(store: Arc<dyn TicketStore>, notify: NotifyHandle) -> Self {
        Self {
            store,
            notify,
            state: RwLock::new(DeskState {
                tickets: Vec::new(),
                registry: crate::ticket::default_ticket_types(),
                total: 0,
            }),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Snapshot of the raw collection.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.state.read().await.tickets.clone()
    }

    /// Total match count from the last successful refresh.
    pub async fn total(&self) -> i64 {
        self.state.read().await.total
    }

    /// The cached ticket-type registry.
    pub async fn ticket_types(&self) -> Vec<TicketTypeEntry> {
        self.state.read().await.registry.clone()
    }

    /// Normalized rows for the current collection.
    pub async fn rows(&self) -> Vec<TicketRow> {
        normalize_all(&self.state.read().await.tickets)
    }

    /// Derive the grouped list view from the current snapshot.
    pub async fn groups(&self, filters: &FacetFilters, key: GroupKey) -> Vec<TicketGroup> {
        metrics::VIEW_DERIVATIONS.with_label_values(&["groups"]).inc();
        let state = self.state.read().await;
        derive_groups(&state.tickets, filters, key)
    }

    /// Derive the kanban board from the current snapshot.
    pub async fn board(
        &self,
        filters: &FacetFilters,
        dimension: KanbanDimension,
    ) -> Vec<BoardColumn> {
        metrics::VIEW_DERIVATIONS.with_label_values(&["board"]).inc();
        let state = self.state.read().await;
        derive_board(&state.tickets, filters, dimension, &state.registry)
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Fetch the collection (and the type registry) from the store.
    ///
    /// On failure the previously known collection is retained so the caller
    /// can keep displaying it alongside an error indicator.
    pub async fn refresh(&self, query: &TicketQuery) -> Result<(), StoreError> {
        let page = match self.store.fetch_tickets(query).await {
            Ok(page) => {
                metrics::STORE_REQUESTS.with_label_values(&["fetch", "ok"]).inc();
                page
            }
            Err(e) => {
                metrics::STORE_REQUESTS.with_label_values(&["fetch", "error"]).inc();
                self.notify
                    .emit(DeskEvent::RefreshFailed {
                        error: e.to_string(),
                    })
                    .await;
                return Err(e);
            }
        };

        // Registry refresh is best-effort: a failure keeps the cached set.
        let registry = match self.store.fetch_ticket_types().await {
            Ok(registry) if !registry.is_empty() => {
                metrics::STORE_REQUESTS.with_label_values(&["types", "ok"]).inc();
                Some(registry)
            }
            Ok(_) => None,
            Err(e) => {
                metrics::STORE_REQUESTS.with_label_values(&["types", "error"]).inc();
                warn!("ticket type registry refresh failed: {}", e);
                None
            }
        };

        let mut state = self.state.write().await;
        debug!("refreshed {} tickets (total {})", page.tickets.len(), page.total);
        state.tickets = page.tickets;
        state.total = page.total;
        if let Some(registry) = registry {
            state.registry = registry;
        }
        Ok(())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a ticket and prepend it to the collection.
    pub async fn create(&self, request: CreateTicketRequest) -> Result<Ticket, DeskError> {
        let ticket = match self.store.create_ticket(request).await {
            Ok(ticket) => {
                metrics::STORE_REQUESTS.with_label_values(&["create", "ok"]).inc();
                ticket
            }
            Err(e) => {
                metrics::STORE_REQUESTS.with_label_values(&["create", "error"]).inc();
                return Err(e.into());
            }
        };

        {
            let mut state = self.state.write().await;
            state.tickets.insert(0, ticket.clone());
            state.total += 1;
        }

        self.notify
            .emit(DeskEvent::TicketCreated {
                ticket_id: ticket.id.clone(),
                display_id: ticket.display_id.clone(),
                title: ticket.title.clone(),
            })
            .await;

        Ok(ticket)
    }

    /// Persist a general field update, then reconcile the local copy with the
    /// store's response.
    pub async fn update(&self, id: &str, patch: TicketPatch) -> Result<Ticket, DeskError> {
        let updated = match self.store.update_ticket(id, &patch).await {
            Ok(ticket) => {
                metrics::STORE_REQUESTS.with_label_values(&["update", "ok"]).inc();
                ticket
            }
            Err(e) => {
                metrics::STORE_REQUESTS.with_label_values(&["update", "error"]).inc();
                return Err(e.into());
            }
        };

        self.replace_local(&updated).await;
        self.notify
            .emit(DeskEvent::TicketUpdated {
                ticket_id: updated.id.clone(),
            })
            .await;
        Ok(updated)
    }

    /// Reassign a ticket to another kanban column.
    ///
    /// The single-field patch is applied to the in-memory collection
    /// immediately so a re-derived board reflects the move without waiting
    /// for the round trip; on persistence failure the pre-move snapshot is
    /// restored and a `MoveFailed` event is surfaced. A failed save always
    /// shows the ticket back in its original column.
    pub async fn move_ticket(
        &self,
        id: &str,
        dimension: KanbanDimension,
        column: &str,
    ) -> Result<Ticket, DeskError> {
        let patch = {
            let state = self.state.read().await;
            reassignment_patch(dimension, column, &state.registry)?
        };

        // Optimistic apply, remembering the pre-move record.
        let snapshot = {
            let mut state = self.state.write().await;
            let ticket = state
                .tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| DeskError::UnknownTicket(id.to_string()))?;
            let snapshot = ticket.clone();
            patch.apply_to(ticket);
            snapshot
        };

        match self.store.update_ticket(id, &patch).await {
            Ok(persisted) => {
                metrics::STORE_REQUESTS.with_label_values(&["update", "ok"]).inc();
                metrics::TICKET_MOVES.with_label_values(&["persisted"]).inc();
                self.replace_local(&persisted).await;
                self.notify
                    .emit(DeskEvent::TicketMoved {
                        ticket_id: id.to_string(),
                        dimension: dimension.as_str().to_string(),
                        column: column.to_string(),
                    })
                    .await;
                Ok(persisted)
            }
            Err(e) => {
                metrics::STORE_REQUESTS.with_label_values(&["update", "error"]).inc();
                metrics::TICKET_MOVES.with_label_values(&["rolled_back"]).inc();
                self.replace_local(&snapshot).await;
                self.notify
                    .emit(DeskEvent::MoveFailed {
                        ticket_id: id.to_string(),
                        dimension: dimension.as_str().to_string(),
                        column: column.to_string(),
                        error: e.to_string(),
                    })
                    .await;
                Err(e.into())
            }
        }
    }

    /// Delete one ticket.
    pub async fn delete(&self, id: &str) -> Result<(), DeskError> {
        match self.store.delete_ticket(id).await {
            Ok(()) => {
                metrics::STORE_REQUESTS.with_label_values(&["delete", "ok"]).inc();
            }
            Err(e) => {
                metrics::STORE_REQUESTS.with_label_values(&["delete", "error"]).inc();
                return Err(e.into());
            }
        }

        {
            let mut state = self.state.write().await;
            let before = state.tickets.len();
            state.tickets.retain(|t| t.id != id);
            if state.tickets.len() < before {
                state.total -= 1;
            }
        }

        self.notify
            .emit(DeskEvent::TicketDeleted {
                ticket_id: id.to_string(),
            })
            .await;
        Ok(())
    }

    /// Delete several tickets, each attempted independently.
    ///
    /// A failing unit operation never aborts the remainder; the outcome
    /// aggregates the success count and the per-item failure reasons.
    pub async fn delete_many(&self, ids: &[String]) -> BulkDeleteOutcome {
        let attempts = join_all(
            ids.iter()
                .map(|id| async move { (id.clone(), self.store.delete_ticket(id).await) }),
        )
        .await;

        let mut deleted_ids: Vec<String> = Vec::new();
        let mut failures: Vec<BulkFailure> = Vec::new();
        for (id, result) in attempts {
            match result {
                Ok(()) => {
                    metrics::STORE_REQUESTS.with_label_values(&["delete", "ok"]).inc();
                    deleted_ids.push(id);
                }
                Err(e) => {
                    metrics::STORE_REQUESTS.with_label_values(&["delete", "error"]).inc();
                    metrics::BULK_DELETE_FAILURES.inc();
                    failures.push(BulkFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        {
            let mut state = self.state.write().await;
            let before = state.tickets.len();
            state.tickets.retain(|t| !deleted_ids.contains(&t.id));
            state.total -= (before - state.tickets.len()) as i64;
        }

        self.notify
            .emit(DeskEvent::TicketsDeleted {
                deleted: deleted_ids.len() as u32,
                failed: failures.len() as u32,
            })
            .await;

        BulkDeleteOutcome {
            deleted: deleted_ids.len(),
            failures,
        }
    }

    /// Replace the local copy of a ticket with an authoritative record.
    /// No-op when the ticket left the collection in the meantime.
    async fn replace_local(&self, ticket: &Ticket) {
        let mut state = self.state.write().await;
        if let Some(local) = state.tickets.iter_mut().find(|t| t.id == ticket.id) {
            *local = ticket.clone();
        }
    }
}
