//! Common test utilities for E2E testing with mocks.
//!
//! Provides an in-process router over a mock ticket store, so the full HTTP
//! surface can be exercised without a hosted backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use deskline_core::testing::MockTicketStore;
use deskline_core::{create_notifier, load_config_from_str, Ticket, TicketDesk, TicketQuery};
use deskline_server::api::create_router;
use deskline_server::state::AppState;

/// Re-export fixtures for test convenience
pub use deskline_core::testing::fixtures;

/// A response with its parsed JSON body (null for empty bodies).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test fixture: an in-process server backed by a `MockTicketStore`.
pub struct TestFixture {
    pub router: Router,
    pub store: Arc<MockTicketStore>,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_tickets(Vec::new()).await
    }

    pub async fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let config = load_config_from_str(
            r#"
[store]
base_url = "http://mock.local"
api_key = "test-key"
"#,
        )
        .expect("test config");

        let store = Arc::new(MockTicketStore::new());
        store.set_tickets(tickets).await;

        let (notify, mut rx) = create_notifier(64);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let desk = Arc::new(TicketDesk::new(store.clone(), notify));
        desk.refresh(&TicketQuery::new()).await.expect("seed refresh");

        let state = Arc::new(AppState::new(config, desk));
        let router = create_router(state);

        Self { router, store }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.send(
            Request::builder()
                .method("PATCH")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }
}
