//! Ticket store abstraction.
//!
//! The store is the repo's only external collaborator: a hosted backend that
//! owns ticket persistence and the ticket-type registry. Everything here is a
//! single-attempt request/response boundary; retry policy and error reporting
//! belong to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Ticket, TicketPriority, TicketStatus, TicketType, TicketTypeEntry};

/// Errors for ticket store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the request (missing required fields, referential
    /// integrity). Surfaced to the user verbatim; no local recovery.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The id did not resolve to an existing record.
    #[error("ticket not found: {0}")]
    NotFound(String),

    /// Connectivity failure. Transient; callers keep prior state.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("store error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The store client is missing required configuration.
    #[error("store not configured: {0}")]
    NotConfigured(String),
}

impl StoreError {
    /// True for failures worth retrying by a caller that has a retry policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }
}

/// Request to create a new ticket. Server assigns `id` and `display_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub priority: TicketPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    pub requester_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CreateTicketRequest {
    /// Minimal request: everything else defaults.
    pub fn new(title: impl Into<String>, requester_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            ticket_type: TicketType::GeneralQuery,
            priority: TicketPriority::Medium,
            status: None,
            requester_id: requester_id.into(),
            assignee_ids: Vec::new(),
            due_date: None,
            tags: Vec::new(),
        }
    }

    pub fn with_type(mut self, ticket_type: TicketType) -> Self {
        self.ticket_type = ticket_type;
        self
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignees(mut self, assignee_ids: Vec<String>) -> Self {
        self.assignee_ids = assignee_ids;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Local validation mirroring the store's required-field rules, so an
    /// obviously broken request never leaves the process.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() {
            return Err(StoreError::Validation("title is required".to_string()));
        }
        if self.requester_id.trim().is_empty() {
            return Err(StoreError::Validation(
                "requester_id is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A partial update: only the set fields are sent to the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<TicketType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TicketPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_type(mut self, ticket_type: TicketType) -> Self {
        self.ticket_type = Some(ticket_type);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_assignees(mut self, assignee_ids: Vec<String>) -> Self {
        self.assignee_ids = Some(assignee_ids);
        self
    }

    /// True when no field is set; an empty patch is a no-op and is rejected
    /// before reaching the wire.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this patch to an in-memory ticket, the same way the store would.
    /// Used for the optimistic half of optimistic updates.
    pub fn apply_to(&self, ticket: &mut Ticket) {
        if let Some(ref title) = self.title {
            ticket.title = title.clone();
        }
        if let Some(ref description) = self.description {
            ticket.description = Some(description.clone());
        }
        if let Some(ref ticket_type) = self.ticket_type {
            ticket.ticket_type = ticket_type.clone();
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(ref status) = self.status {
            ticket.status = status.clone();
        }
        if let Some(ref assignee_ids) = self.assignee_ids {
            ticket.assignee_ids = assignee_ids.clone();
        }
        if let Some(due_date) = self.due_date {
            ticket.due_date = Some(due_date);
        }
        if let Some(ref tags) = self.tags {
            ticket.tags = tags.clone();
        }
        ticket.updated_at = Utc::now();
    }
}

/// Server-side filter for fetching tickets.
///
/// These are the store's own equality filters; the richer faceted filtering
/// happens client-side in the view pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<TicketType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

impl TicketQuery {
    pub fn new() -> Self {
        Self {
            limit: default_limit(),
            ..Self::default()
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_type(mut self, ticket_type: TicketType) -> Self {
        self.ticket_type = Some(ticket_type);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_requester(mut self, requester_id: impl Into<String>) -> Self {
        self.requester_id = Some(requester_id.into());
        self
    }

    pub fn with_assignee(mut self, assignee_id: impl Into<String>) -> Self {
        self.assignee_id = Some(assignee_id.into());
        self
    }

    pub fn created_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_after = after;
        self.created_before = before;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of tickets plus the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub total: i64,
}

/// Trait for ticket storage backends.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Fetch tickets matching the query, plus a total count.
    async fn fetch_tickets(&self, query: &TicketQuery) -> Result<TicketPage, StoreError>;

    /// Create a new ticket. The store assigns `id` and `display_id`.
    async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, StoreError>;

    /// Update any subset of mutable fields on an existing ticket.
    async fn update_ticket(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, StoreError>;

    /// Permanently delete a ticket.
    async fn delete_ticket(&self, id: &str) -> Result<(), StoreError>;

    /// Fetch the ticket-type registry (drives the type-based board columns).
    async fn fetch_ticket_types(&self) -> Result<Vec<TicketTypeEntry>, StoreError>;
}
