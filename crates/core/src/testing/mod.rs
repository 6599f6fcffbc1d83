//! Testing utilities and mock implementations.
//!
//! `MockTicketStore` stands in for the hosted backend so the desk controller
//! and the server handlers can be exercised without infrastructure.

mod mock_store;

pub use mock_store::MockTicketStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::ticket::{Person, Ticket, TicketPriority, TicketStatus, TicketType};

    /// Create a person with a display name.
    pub fn person(id: &str, name: &str) -> Person {
        Person::new(id).with_display_name(name)
    }

    /// Create a test ticket with reasonable defaults: a new, medium-priority
    /// general query from a known requester, created on a fixed date.
    pub fn ticket(id: &str, title: &str) -> Ticket {
        let created = Utc.with_ymd_and_hms(2025, 9, 15, 10, 30, 0).unwrap();
        Ticket {
            id: id.to_string(),
            display_id: format!("TK-1758000000000-{:0>4}", id.len()),
            title: title.to_string(),
            description: None,
            ticket_type: TicketType::GeneralQuery,
            priority: TicketPriority::Medium,
            status: TicketStatus::New,
            requester_id: "u-100".to_string(),
            assignee_ids: vec![],
            requester: Some(person("u-100", "Casey Reed")),
            assignees: vec![],
            due_date: None,
            tags: vec![],
            created_at: created,
            updated_at: created,
        }
    }

    /// Create a test ticket with explicit classification and assignees.
    pub fn classified_ticket(
        id: &str,
        ticket_type: TicketType,
        priority: TicketPriority,
        status: TicketStatus,
        assignees: &[(&str, &str)],
    ) -> Ticket {
        let mut t = ticket(id, &format!("Ticket {}", id));
        t.ticket_type = ticket_type;
        t.priority = priority;
        t.status = status;
        t.assignee_ids = assignees.iter().map(|(id, _)| id.to_string()).collect();
        t.assignees = assignees
            .iter()
            .map(|(id, name)| person(id, name))
            .collect();
        t
    }
}
