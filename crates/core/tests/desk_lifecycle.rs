//! Desk lifecycle integration tests.
//!
//! These tests drive the public API end to end: refresh from the store,
//! derive views, reassign columns optimistically, roll back on failure, and
//! aggregate bulk deletions.

use std::sync::Arc;

use tokio::sync::mpsc;

use deskline_core::testing::{fixtures, MockTicketStore};
use deskline_core::{
    create_notifier, DeskEvent, DeskEventEnvelope, FacetFilters, FacetSelection, GroupKey,
    KanbanDimension, StoreError, Ticket, TicketDesk, TicketPriority, TicketQuery, TicketStatus,
    TicketType,
};

struct TestHarness {
    desk: TicketDesk,
    store: Arc<MockTicketStore>,
    events: mpsc::Receiver<DeskEventEnvelope>,
}

impl TestHarness {
    async fn new(tickets: Vec<Ticket>) -> Self {
        let store = Arc::new(MockTicketStore::new());
        store.set_tickets(tickets).await;
        let (notify, events) = create_notifier(64);
        let desk = TicketDesk::new(store.clone(), notify);
        desk.refresh(&TicketQuery::new())
            .await
            .expect("initial refresh");
        Self { desk, store, events }
    }

    fn drain_events(&mut self) -> Vec<DeskEvent> {
        let mut out = Vec::new();
        while let Ok(envelope) = self.events.try_recv() {
            out.push(envelope.event);
        }
        out
    }
}

fn seed() -> Vec<Ticket> {
    vec![
        fixtures::classified_ticket(
            "t-inc",
            TicketType::Incident,
            TicketPriority::High,
            TicketStatus::New,
            &[],
        ),
        fixtures::classified_ticket(
            "t-req",
            TicketType::Request,
            TicketPriority::Low,
            TicketStatus::InProgress,
            &[("u-1", "Grace Hopper")],
        ),
        fixtures::classified_ticket(
            "t-chg",
            TicketType::Change,
            TicketPriority::Medium,
            TicketStatus::New,
            &[("u-1", "Grace Hopper")],
        ),
    ]
}

#[tokio::test]
async fn test_full_desk_lifecycle() {
    let mut harness = TestHarness::new(seed()).await;

    // Derived list view: group by status, first-encounter order.
    let groups = harness
        .desk
        .groups(&FacetFilters::new(), GroupKey::Status)
        .await;
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["New", "In Progress"]);

    // Drag t-inc from New to Done, persisted through the store.
    harness
        .desk
        .move_ticket("t-inc", KanbanDimension::Status, "on_hold")
        .await
        .expect("move persists");

    let board = harness
        .desk
        .board(&FacetFilters::new(), KanbanDimension::Status)
        .await;
    let done = board.iter().find(|c| c.column.id == "on_hold").unwrap();
    assert!(done.rows.iter().any(|r| r.db_id == "t-inc"));

    // A second drag fails at the store and must roll back.
    harness
        .store
        .set_next_error(StoreError::Network("wifi died".to_string()))
        .await;
    let before = harness.desk.tickets().await;
    let result = harness
        .desk
        .move_ticket("t-inc", KanbanDimension::Status, "new")
        .await;
    assert!(result.is_err());
    assert_eq!(harness.desk.tickets().await, before);

    let events = harness.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, DeskEvent::TicketMoved { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, DeskEvent::MoveFailed { .. })));

    // Bulk delete with one injected failure: the rest still go through.
    harness.store.fail_delete("t-req").await;
    let ids: Vec<String> = ["t-inc", "t-req", "t-chg"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let outcome = harness.desk.delete_many(&ids).await;
    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].id, "t-req");

    let remaining = harness.desk.tickets().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "t-req");
}

#[tokio::test]
async fn test_filtered_board_projection() {
    let harness = TestHarness::new(seed()).await;

    // Only tickets assigned to u-1, projected by category.
    let filters = FacetFilters::new().with_assignees(["u-1"]);
    let board = harness
        .desk
        .board(&filters, KanbanDimension::Category)
        .await;

    let general = board.iter().find(|c| c.column.id == "general").unwrap();
    assert_eq!(general.rows.len(), 1);
    assert_eq!(general.rows[0].db_id, "t-req");

    let feature = board.iter().find(|c| c.column.id == "feature").unwrap();
    assert_eq!(feature.rows.len(), 1);
    assert_eq!(feature.rows[0].db_id, "t-chg");

    // t-inc is unassigned, so the technical column is empty.
    let technical = board.iter().find(|c| c.column.id == "technical").unwrap();
    assert!(technical.rows.is_empty());
}

#[tokio::test]
async fn test_search_then_group_by_assignee() {
    let harness = TestHarness::new(seed()).await;

    let filters = FacetFilters::new()
        .with_search("ticket")
        .with_status(FacetSelection::any(["new", "in_progress"]));
    let groups = harness.desk.groups(&filters, GroupKey::Assignee).await;

    // t-inc is unassigned; t-req and t-chg share Grace.
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, "Unassigned");
    assert_eq!(groups[1].label, "Grace Hopper");
    assert_eq!(groups[1].rows.len(), 2);
}

#[tokio::test]
async fn test_refresh_after_store_changes() {
    let harness = TestHarness::new(seed()).await;
    assert_eq!(harness.desk.tickets().await.len(), 3);

    // The store collection shrinks behind our back; a refresh reconciles.
    harness
        .store
        .set_tickets(vec![fixtures::ticket("t-only", "Survivor")])
        .await;
    harness.desk.refresh(&TicketQuery::new()).await.unwrap();

    let tickets = harness.desk.tickets().await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, "t-only");
    assert_eq!(harness.desk.total().await, 1);
}
