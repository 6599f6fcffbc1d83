//! Derived view handlers: grouped list and kanban board.
//!
//! These endpoints re-run the derivation pipeline against the desk's current
//! snapshot with the caller's facet filters; they never touch the store.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use deskline_core::{
    BoardColumn, DateRange, FacetFilters, FacetSelection, GroupKey, TicketGroup, TicketTypeEntry,
};

use super::tickets::parse_dimension;
use super::ErrorResponse;
use crate::state::AppState;

/// Query parameters shared by the view endpoints. Multi-value facets are
/// comma-separated lists (e.g. `priority=high,urgent`).
#[derive(Debug, Deserialize)]
pub struct ViewParams {
    pub group_by: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assignees: Option<String>,
    pub requesters: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub group_by: String,
    pub groups: Vec<TicketGroup>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub group_by: String,
    pub columns: Vec<BoardColumn>,
}

fn csv(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn facet(value: &Option<String>) -> FacetSelection {
    let values = csv(value);
    if values.is_empty() {
        FacetSelection::all()
    } else {
        FacetSelection::any(values)
    }
}

impl ViewParams {
    fn filters(&self) -> FacetFilters {
        FacetFilters {
            search: self.search.clone().unwrap_or_default(),
            ticket_type: facet(&self.ticket_type),
            priority: facet(&self.priority),
            status: facet(&self.status),
            assignees: csv(&self.assignees),
            requesters: csv(&self.requesters),
            created: DateRange::new(self.created_from, self.created_to),
        }
    }
}

fn parse_group_key(value: &str) -> Option<GroupKey> {
    match value {
        "none" => Some(GroupKey::None),
        "status" => Some(GroupKey::Status),
        "priority" => Some(GroupKey::Priority),
        "type" => Some(GroupKey::Type),
        "due_date" => Some(GroupKey::DueDate),
        "reported_by" | "requester" => Some(GroupKey::Requester),
        "assignee" => Some(GroupKey::Assignee),
        _ => None,
    }
}

fn bad_group_by(value: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(format!("unknown group_by: {}", value))),
    )
}

/// Grouped list view.
pub async fn groups(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<Json<GroupsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let raw_key = params.group_by.as_deref().unwrap_or("none");
    let key = parse_group_key(raw_key).ok_or_else(|| bad_group_by(raw_key))?;

    let groups = state.desk().groups(&params.filters(), key).await;
    Ok(Json(GroupsResponse {
        group_by: raw_key.to_string(),
        groups,
    }))
}

/// Kanban board view.
pub async fn board(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<Json<BoardResponse>, (StatusCode, Json<ErrorResponse>)> {
    let raw_key = params.group_by.as_deref().unwrap_or("type");
    let dimension = parse_dimension(raw_key).ok_or_else(|| bad_group_by(raw_key))?;

    let columns = state.desk().board(&params.filters(), dimension).await;
    Ok(Json(BoardResponse {
        group_by: raw_key.to_string(),
        columns,
    }))
}

/// The ticket-type registry backing the type-based board columns.
pub async fn ticket_types(State(state): State<Arc<AppState>>) -> Json<Vec<TicketTypeEntry>> {
    Json(state.desk().ticket_types().await)
}
