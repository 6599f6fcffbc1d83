//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use deskline_core::{
    BulkDeleteOutcome, CreateTicketRequest, KanbanDimension, Ticket, TicketPatch, TicketPriority,
    TicketQuery, TicketStatus, TicketType,
};

use super::{desk_error_response, ErrorResponse};
use crate::state::AppState;

/// Maximum allowed limit for ticket queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for ticket queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub requester_id: String,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub search: Option<String>,
    pub requester_id: Option<String>,
    pub assignee_id: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for a kanban column reassignment
#[derive(Debug, Deserialize)]
pub struct MoveTicketBody {
    /// Active board dimension: "type", "status", "priority" or "category"
    pub group_by: String,
    /// Target column id
    pub column: String,
}

/// Request body for bulk deletion
#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    pub ids: Vec<String>,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn parse_priority(value: &str) -> Result<TicketPriority, (StatusCode, Json<ErrorResponse>)> {
    TicketPriority::parse(value)
        .ok_or_else(|| bad_request(format!("unknown priority: {}", value)))
}

// ============================================================================
// Handlers
// ============================================================================

/// List tickets, refreshing the desk's collection from the store.
///
/// A fetch failure keeps the previously known collection in the desk; the
/// error is reported to this caller, and readers of the view endpoints keep
/// seeing the prior data.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut query = TicketQuery::new().with_limit(limit).with_offset(offset);
    if let Some(ref status) = params.status {
        query = query.with_status(TicketStatus::from(status.as_str()));
    }
    if let Some(ref priority) = params.priority {
        query = query.with_priority(parse_priority(priority)?);
    }
    if let Some(ref ticket_type) = params.ticket_type {
        query = query.with_type(TicketType::from(ticket_type.as_str()));
    }
    if let Some(ref search) = params.search {
        query = query.with_search(search);
    }
    if let Some(ref requester_id) = params.requester_id {
        query = query.with_requester(requester_id);
    }
    if let Some(ref assignee_id) = params.assignee_id {
        query = query.with_assignee(assignee_id);
    }
    query = query.created_between(params.created_after, params.created_before);

    if let Err(e) = state.desk().refresh(&query).await {
        return Err(desk_error_response(&e.into()));
    }

    Ok(Json(ListTicketsResponse {
        tickets: state.desk().tickets().await,
        total: state.desk().total().await,
        limit,
        offset,
    }))
}

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), (StatusCode, Json<ErrorResponse>)> {
    let mut request = CreateTicketRequest::new(body.title, body.requester_id)
        .with_assignees(body.assignee_ids)
        .with_tags(body.tags);
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    if let Some(ref ticket_type) = body.ticket_type {
        request = request.with_type(TicketType::from(ticket_type.as_str()));
    }
    if let Some(ref priority) = body.priority {
        request = request.with_priority(parse_priority(priority)?);
    }
    if let Some(ref status) = body.status {
        request.status = Some(TicketStatus::from(status.as_str()));
    }
    if let Some(due_date) = body.due_date {
        request = request.with_due_date(due_date);
    }

    match state.desk().create(request).await {
        Ok(ticket) => Ok((StatusCode::CREATED, Json(ticket))),
        Err(e) => Err(desk_error_response(&e)),
    }
}

/// Update any subset of mutable fields
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<TicketPatch>,
) -> Result<Json<Ticket>, (StatusCode, Json<ErrorResponse>)> {
    if patch.is_empty() {
        return Err(bad_request("empty patch"));
    }
    match state.desk().update(&id, patch).await {
        Ok(ticket) => Ok(Json(ticket)),
        Err(e) => Err(desk_error_response(&e)),
    }
}

/// Permanently delete a ticket
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.desk().delete(&id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(desk_error_response(&e)),
    }
}

/// Delete several tickets; unit failures never abort the remainder.
pub async fn bulk_delete(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkDeleteBody>,
) -> Json<BulkDeleteOutcome> {
    Json(state.desk().delete_many(&body.ids).await)
}

/// Reassign a ticket to another kanban column.
///
/// The change is applied optimistically and persisted; when persistence
/// fails, the in-memory collection is rolled back and 409 is returned so the
/// caller knows the move did not stick.
pub async fn move_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<MoveTicketBody>,
) -> Result<Json<Ticket>, (StatusCode, Json<ErrorResponse>)> {
    let dimension = parse_dimension(&body.group_by)
        .ok_or_else(|| bad_request(format!("unknown board dimension: {}", body.group_by)))?;

    match state.desk().move_ticket(&id, dimension, &body.column).await {
        Ok(ticket) => Ok(Json(ticket)),
        Err(e @ deskline_core::DeskError::Store(_)) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(format!("move rolled back: {}", e))),
        )),
        Err(e) => Err(desk_error_response(&e)),
    }
}

pub(crate) fn parse_dimension(value: &str) -> Option<KanbanDimension> {
    match value {
        "type" => Some(KanbanDimension::Type),
        "status" => Some(KanbanDimension::Status),
        "priority" => Some(KanbanDimension::Priority),
        "category" => Some(KanbanDimension::Category),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::test_state;
    use crate::api::create_router;
    use axum::body::Body;
    use axum::http::Request;
    use deskline_core::testing::fixtures;
    use deskline_core::StoreError;
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_tickets() {
        let (state, _store) = test_state(vec![
            fixtures::ticket("t-1", "VPN down"),
            fixtures::ticket("t-2", "New badge"),
        ])
        .await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/tickets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["tickets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_tickets_rejects_bad_priority() {
        let (state, _store) = test_state(vec![]).await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/tickets?priority=whenever")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_ticket() {
        let (state, _store) = test_state(vec![]).await;
        let app = create_router(state);

        let body = serde_json::json!({
            "title": "Broken chair",
            "requester_id": "u-9",
            "type": "request",
            "priority": "low"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tickets")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["title"], "Broken chair");
        assert_eq!(json["type"], "request");
    }

    #[tokio::test]
    async fn test_create_ticket_missing_title() {
        let (state, _store) = test_state(vec![]).await;
        let app = create_router(state);

        let body = serde_json::json!({ "title": "  ", "requester_id": "u-9" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tickets")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_move_ticket_persists() {
        let (state, _store) = test_state(vec![fixtures::ticket("t-1", "VPN down")]).await;
        let app = create_router(state);

        let body = serde_json::json!({ "group_by": "status", "column": "on_hold" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tickets/t-1/move")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "on_hold");
    }

    #[tokio::test]
    async fn test_move_ticket_rolls_back_with_conflict() {
        let (state, store) = test_state(vec![fixtures::ticket("t-1", "VPN down")]).await;
        store
            .set_next_error(StoreError::Network("timeout".to_string()))
            .await;
        let app = create_router(state.clone());

        let body = serde_json::json!({ "group_by": "status", "column": "on_hold" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tickets/t-1/move")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        // Rolled back: the desk still shows the original status.
        let tickets = state.desk().tickets().await;
        assert_eq!(tickets[0].status.as_str(), "new");
    }

    #[tokio::test]
    async fn test_move_unknown_ticket_is_404() {
        let (state, _store) = test_state(vec![]).await;
        let app = create_router(state);

        let body = serde_json::json!({ "group_by": "status", "column": "new" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tickets/ghost/move")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_delete_reports_partial_failure() {
        let (state, store) = test_state(vec![
            fixtures::ticket("t-1", "a"),
            fixtures::ticket("t-2", "b"),
        ])
        .await;
        store.fail_delete("t-2").await;
        let app = create_router(state);

        let body = serde_json::json!({ "ids": ["t-1", "t-2"] });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tickets/bulk-delete")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["deleted"], 1);
        assert_eq!(json["failures"].as_array().unwrap().len(), 1);
        assert_eq!(json["failures"][0]["id"], "t-2");
    }

    #[tokio::test]
    async fn test_delete_ticket() {
        let (state, _store) = test_state(vec![fixtures::ticket("t-1", "a")]).await;
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/tickets/t-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.desk().tickets().await.is_empty());
    }
}
