//! Normalization of raw ticket records into flat, display-ready rows.
//!
//! Pure functions only. The same raw record always normalizes to the same
//! row, so the pipeline can be re-run from scratch on every state change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ticket::{Person, Ticket, TicketPriority, TicketStatus, TicketType};

/// Placeholder shown when a person has no usable name data.
pub const UNKNOWN_PERSON: &str = "Unknown";

/// Placeholder shown for tickets without a due date.
pub const NO_DUE_DATE: &str = "No due date";

/// Avatar color palette. Assignment is a pure function of the display name,
/// so the same person gets the same color across renders and sessions.
const AVATAR_PALETTE: [&str; 8] = [
    "red", "blue", "green", "yellow", "purple", "pink", "indigo", "orange",
];

/// A person rendered for display: name, avatar initials, avatar color.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonBadge {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub color: String,
}

impl PersonBadge {
    fn from_person(person: &Person) -> Self {
        let name = person
            .best_name()
            .unwrap_or(UNKNOWN_PERSON)
            .to_string();
        Self {
            id: person.id.clone(),
            initials: initials(
                person.first_name.as_deref(),
                person.last_name.as_deref(),
                person.display_name.as_deref(),
            ),
            color: avatar_color(&name).to_string(),
            name,
        }
    }
}

/// A flat, display-ready projection of one ticket.
///
/// Every nullable field is resolved to a display-safe string; the raw machine
/// fields ride along so the filter and grouping stages never have to reach
/// back into the raw record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketRow {
    /// Store id, used for mutations.
    pub db_id: String,
    /// Human-facing id as rendered in lists (`#TK-...`).
    pub display_ref: String,
    pub title: String,
    pub description: String,

    pub status: TicketStatus,
    pub status_label: String,
    pub priority: TicketPriority,
    pub priority_label: String,
    pub ticket_type: TicketType,
    pub type_label: String,

    pub requester_id: String,
    pub requester: PersonBadge,

    /// One badge per assignee, in assignment order. May be empty.
    pub assignees: Vec<PersonBadge>,
    pub assignee_ids: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub created_label: String,
    pub due_date: Option<DateTime<Utc>>,
    pub due_label: String,

    pub tags: Vec<String>,
}

impl TicketRow {
    /// Normalize one raw record. Pure; no hidden state.
    pub fn from_ticket(ticket: &Ticket) -> Self {
        let requester = match &ticket.requester {
            Some(person) => PersonBadge::from_person(person),
            None => PersonBadge {
                id: ticket.requester_id.clone(),
                name: UNKNOWN_PERSON.to_string(),
                initials: "??".to_string(),
                color: avatar_color(UNKNOWN_PERSON).to_string(),
            },
        };

        let assignees: Vec<PersonBadge> = ticket
            .assignees
            .iter()
            .map(PersonBadge::from_person)
            .collect();

        Self {
            db_id: ticket.id.clone(),
            display_ref: format!("#{}", ticket.display_id),
            title: ticket.title.clone(),
            description: ticket.description.clone().unwrap_or_default(),
            status_label: ticket.status.label(),
            status: ticket.status.clone(),
            priority_label: ticket.priority.label().to_string(),
            priority: ticket.priority,
            type_label: ticket.ticket_type.label(),
            ticket_type: ticket.ticket_type.clone(),
            requester_id: ticket.requester_id.clone(),
            requester,
            assignees,
            assignee_ids: ticket.assignee_ids.clone(),
            created_label: format_date(ticket.created_at),
            created_at: ticket.created_at,
            due_label: ticket
                .due_date
                .map(format_date)
                .unwrap_or_else(|| NO_DUE_DATE.to_string()),
            due_date: ticket.due_date,
            tags: ticket.tags.clone(),
        }
    }

    /// The primary assignee badge (first assignee), for single-assignee
    /// displays. `None` for unassigned tickets.
    pub fn primary_assignee(&self) -> Option<&PersonBadge> {
        self.assignees.first()
    }
}

/// Normalize a whole collection, preserving order.
pub fn normalize_all(tickets: &[Ticket]) -> Vec<TicketRow> {
    tickets.iter().map(TicketRow::from_ticket).collect()
}

/// Avatar initials.
///
/// Precedence: display name word-initials (max two, uppercased), then
/// first+last initials, then the first two letters of a lone first name,
/// then `??` when no name data exists at all.
pub fn initials(
    first_name: Option<&str>,
    last_name: Option<&str>,
    display_name: Option<&str>,
) -> String {
    if let Some(display) = display_name.filter(|s| !s.trim().is_empty()) {
        let letters: String = display
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect();
        if !letters.is_empty() {
            return letters.to_uppercase();
        }
    }

    match (
        first_name.filter(|s| !s.is_empty()),
        last_name.filter(|s| !s.is_empty()),
    ) {
        (Some(first), Some(last)) => {
            let mut out = String::new();
            out.extend(first.chars().next());
            out.extend(last.chars().next());
            out.to_uppercase()
        }
        (Some(first), None) => first.chars().take(2).collect::<String>().to_uppercase(),
        _ => "??".to_string(),
    }
}

/// Deterministic palette pick for a display name.
///
/// SHA-256 keeps the assignment stable across processes and releases, unlike
/// `DefaultHasher` whose output is not guaranteed between versions.
pub fn avatar_color(name: &str) -> &'static str {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let bucket = u64::from_be_bytes(prefix) % AVATAR_PALETTE.len() as u64;
    AVATAR_PALETTE[bucket as usize]
}

/// List-style date rendering, e.g. `Oct 2, 2025`.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}
