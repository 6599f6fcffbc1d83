pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod tickets;
pub mod views;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use deskline_core::{DeskError, StoreError};
use serde::Serialize;

/// Error response body shared by all handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Map a desk error to an HTTP response.
pub(crate) fn desk_error_response(err: &DeskError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        DeskError::UnknownTicket(_) => StatusCode::NOT_FOUND,
        DeskError::Projection(_) => StatusCode::BAD_REQUEST,
        DeskError::Store(store) => match store {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::Network(_) | StoreError::Backend { .. } | StoreError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            StoreError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    };
    (status, Json(ErrorResponse::new(err.to_string())))
}
