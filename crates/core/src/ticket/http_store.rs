//! REST client for the hosted ticket backend.
//!
//! Single-attempt requests; no retry policy here. Callers decide what a
//! failure means (keep prior state, roll back an optimistic change, etc.).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::StoreConfig;

use super::store::{
    CreateTicketRequest, StoreError, TicketPage, TicketPatch, TicketQuery, TicketStore,
};
use super::types::{Ticket, TicketTypeEntry};

/// Wire shape for the list endpoint.
#[derive(Debug, Deserialize)]
struct ListTicketsResponse {
    tickets: Vec<Ticket>,
    total: i64,
}

/// Wire shape for single-ticket endpoints.
#[derive(Debug, Deserialize)]
struct TicketEnvelope {
    ticket: Ticket,
}

/// Ticket store backed by the hosted REST API.
pub struct HttpTicketStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    organization_id: Option<String>,
}

impl HttpTicketStore {
    /// Create a new client from store configuration.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        if config.base_url.trim().is_empty() {
            return Err(StoreError::NotConfigured(
                "store base_url is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| StoreError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            organization_id: config.organization_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn ticket_url(&self, id: &str) -> String {
        // Ids come from the backend but may contain characters that need
        // escaping in a path segment.
        self.url(&format!("/api/tickets/{}", urlencoding::encode(id)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Map a non-success response to a `StoreError`.
    async fn error_for(id_hint: Option<&str>, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => {
                StoreError::NotFound(id_hint.unwrap_or("unknown").to_string())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Validation(if body.is_empty() {
                    status.to_string()
                } else {
                    body
                })
            }
            _ => StoreError::Backend {
                status: status.as_u16(),
                message: body,
            },
        }
    }

    fn query_pairs(&self, query: &TicketQuery) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let org = query
            .organization_id
            .as_deref()
            .or(self.organization_id.as_deref());
        if let Some(org) = org {
            pairs.push(("organization_id".to_string(), org.to_string()));
        }
        if let Some(ref status) = query.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(priority) = query.priority {
            pairs.push(("priority".to_string(), priority.as_str().to_string()));
        }
        if let Some(ref ticket_type) = query.ticket_type {
            pairs.push(("type".to_string(), ticket_type.as_str().to_string()));
        }
        if let Some(ref search) = query.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(ref requester_id) = query.requester_id {
            pairs.push(("requester_id".to_string(), requester_id.clone()));
        }
        if let Some(ref assignee_id) = query.assignee_id {
            pairs.push(("assignee_id".to_string(), assignee_id.clone()));
        }
        if let Some(after) = query.created_after {
            pairs.push(("created_after".to_string(), after.to_rfc3339()));
        }
        if let Some(before) = query.created_before {
            pairs.push(("created_before".to_string(), before.to_rfc3339()));
        }
        pairs.push(("limit".to_string(), query.limit.to_string()));
        pairs.push(("offset".to_string(), query.offset.to_string()));
        pairs
    }
}

#[async_trait]
impl TicketStore for HttpTicketStore {
    async fn fetch_tickets(&self, query: &TicketQuery) -> Result<TicketPage, StoreError> {
        let url = self.url("/api/tickets");
        debug!("fetching tickets: {:?}", query);

        let request = self
            .authorize(self.client.get(&url))
            .query(&self.query_pairs(query));

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(None, response).await);
        }

        let body: ListTicketsResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(TicketPage {
            tickets: body.tickets,
            total: body.total,
        })
    }

    async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, StoreError> {
        request.validate()?;

        let url = self.url("/api/tickets");
        debug!("creating ticket: {}", request.title);

        let response = self
            .authorize(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(None, response).await);
        }

        let body: TicketEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(body.ticket)
    }

    async fn update_ticket(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::Validation("empty patch".to_string()));
        }

        let url = self.ticket_url(id);
        debug!("updating ticket {}: {:?}", id, patch);

        let response = self
            .authorize(self.client.patch(&url))
            .json(patch)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(Some(id), response).await);
        }

        let body: TicketEnvelope = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(body.ticket)
    }

    async fn delete_ticket(&self, id: &str) -> Result<(), StoreError> {
        let url = self.ticket_url(id);
        debug!("deleting ticket {}", id);

        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(Some(id), response).await);
        }
        Ok(())
    }

    async fn fetch_ticket_types(&self) -> Result<Vec<TicketTypeEntry>, StoreError> {
        let url = self.url("/api/ticket-types");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(None, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}
