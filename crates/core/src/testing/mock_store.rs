//! Mock ticket store for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::ticket::{
    next_display_id, CreateTicketRequest, StoreError, Ticket, TicketPage, TicketPatch,
    TicketQuery, TicketStore, TicketTypeEntry,
};

/// Mock implementation of the `TicketStore` trait.
///
/// Provides controllable behavior for testing:
/// - Serve a configurable in-memory collection
/// - Inject a failure into the next call
/// - Record update calls for assertions
///
/// # Example
///
/// ```rust,ignore
/// use deskline_core::testing::{fixtures, MockTicketStore};
///
/// let store = MockTicketStore::with_tickets(vec![fixtures::ticket("t-1", "VPN down")]);
/// store.set_next_error(StoreError::Network("timeout".into())).await;
/// // The next store call fails once, then behavior returns to normal.
/// ```
pub struct MockTicketStore {
    tickets: Arc<RwLock<Vec<Ticket>>>,
    registry: Arc<RwLock<Vec<TicketTypeEntry>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<StoreError>>>,
    /// Ids whose deletion always fails.
    failing_deletes: Arc<RwLock<HashSet<String>>>,
    /// Recorded `(id, patch)` pairs from update calls.
    updates: Arc<RwLock<Vec<(String, TicketPatch)>>>,
}

impl Default for MockTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTicketStore {
    /// Create an empty mock store with the default type registry.
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(RwLock::new(Vec::new())),
            registry: Arc::new(RwLock::new(crate::ticket::default_ticket_types())),
            next_error: Arc::new(RwLock::new(None)),
            failing_deletes: Arc::new(RwLock::new(HashSet::new())),
            updates: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a mock store seeded with tickets.
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let store = Self::new();
        *store.tickets.blocking_write() = tickets;
        store
    }

    /// Replace the collection.
    pub async fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.write().await = tickets;
    }

    /// Replace the type registry.
    pub async fn set_registry(&self, registry: Vec<TicketTypeEntry>) {
        *self.registry.write().await = registry;
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: StoreError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make deletion of the given id always fail.
    pub async fn fail_delete(&self, id: &str) {
        self.failing_deletes.write().await.insert(id.to_string());
    }

    /// Recorded update calls.
    pub async fn recorded_updates(&self) -> Vec<(String, TicketPatch)> {
        self.updates.read().await.clone()
    }

    /// Number of update calls made.
    pub async fn update_count(&self) -> usize {
        self.updates.read().await.len()
    }

    /// Current collection contents, for assertions.
    pub async fn stored_tickets(&self) -> Vec<Ticket> {
        self.tickets.read().await.clone()
    }

    async fn take_error(&self) -> Option<StoreError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl TicketStore for MockTicketStore {
    async fn fetch_tickets(&self, query: &TicketQuery) -> Result<TicketPage, StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let all = self.tickets.read().await;
        let matching: Vec<Ticket> = all
            .iter()
            .filter(|t| {
                query.status.as_ref().is_none_or(|s| &t.status == s)
                    && query.priority.is_none_or(|p| t.priority == p)
                    && query.ticket_type.as_ref().is_none_or(|ty| &t.ticket_type == ty)
                    && query.search.as_deref().is_none_or(|needle| {
                        t.title.to_lowercase().contains(&needle.to_lowercase())
                    })
                    && query
                        .requester_id
                        .as_deref()
                        .is_none_or(|id| t.requester_id == id)
                    && query.assignee_id.as_deref().is_none_or(|id| t.has_assignee(id))
            })
            .cloned()
            .collect();

        let total = matching.len() as i64;
        let tickets = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();

        Ok(TicketPage { tickets, total })
    }

    async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, StoreError> {
        request.validate()?;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let now = Utc::now();
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            display_id: next_display_id(),
            title: request.title,
            description: request.description,
            ticket_type: request.ticket_type,
            priority: request.priority,
            status: request.status.unwrap_or(crate::ticket::TicketStatus::New),
            requester_id: request.requester_id,
            assignee_ids: request.assignee_ids,
            requester: None,
            assignees: vec![],
            due_date: request.due_date,
            tags: request.tags,
            created_at: now,
            updated_at: now,
        };

        self.tickets.write().await.push(ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.updates
            .write()
            .await
            .push((id.to_string(), patch.clone()));

        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(ticket);
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: &str) -> Result<(), StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if self.failing_deletes.read().await.contains(id) {
            return Err(StoreError::Network("injected delete failure".to_string()));
        }

        let mut tickets = self.tickets.write().await;
        let before = tickets.len();
        tickets.retain(|t| t.id != id);
        if tickets.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn fetch_ticket_types(&self) -> Result<Vec<TicketTypeEntry>, StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.registry.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use crate::ticket::{TicketPriority, TicketStatus};

    #[tokio::test]
    async fn test_fetch_applies_query() {
        let store = MockTicketStore::new();
        store
            .set_tickets(vec![
                fixtures::ticket("t-1", "VPN down"),
                fixtures::ticket("t-2", "New badge"),
            ])
            .await;

        let page = store
            .fetch_tickets(&TicketQuery::new().with_search("vpn"))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.tickets[0].id, "t-1");
    }

    #[tokio::test]
    async fn test_error_injection_consumed_once() {
        let store = MockTicketStore::new();
        store
            .set_next_error(StoreError::Network("boom".to_string()))
            .await;

        assert!(store.fetch_tickets(&TicketQuery::new()).await.is_err());
        assert!(store.fetch_tickets(&TicketQuery::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_records_calls() {
        let store = MockTicketStore::new();
        store.set_tickets(vec![fixtures::ticket("t-1", "VPN down")]).await;

        let patch = TicketPatch::new().with_priority(TicketPriority::Urgent);
        let updated = store.update_ticket("t-1", &patch).await.unwrap();
        assert_eq!(updated.priority, TicketPriority::Urgent);

        let recorded = store.recorded_updates().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "t-1");
        assert_eq!(recorded[0].1, patch);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = MockTicketStore::new();
        let patch = TicketPatch::new().with_status(TicketStatus::OnHold);
        let result = store.update_ticket("nope", &patch).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let store = MockTicketStore::new();
        let created = store
            .create_ticket(CreateTicketRequest::new("Broken chair", "u-9"))
            .await
            .unwrap();
        assert!(!created.id.is_empty());
        assert!(crate::ticket::is_display_id(&created.display_id));
        assert_eq!(store.stored_tickets().await.len(), 1);
    }

    #[test]
    fn test_with_tickets_constructor() {
        // Sync construction path; the async calls run under block_on.
        let store = MockTicketStore::with_tickets(vec![fixtures::ticket("t-1", "VPN down")]);
        let page = tokio_test::block_on(store.fetch_tickets(&TicketQuery::new())).unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_delete_failure_injection() {
        let store = MockTicketStore::new();
        store.set_tickets(vec![fixtures::ticket("t-1", "VPN down")]).await;
        store.fail_delete("t-1").await;

        assert!(store.delete_ticket("t-1").await.is_err());
        // Still there.
        assert_eq!(store.stored_tickets().await.len(), 1);
    }
}
