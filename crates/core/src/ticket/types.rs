//! Core ticket data types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pattern for human-facing ticket ids: `TK-<sequence>` or
/// `TK-<millis>-<suffix>`, with an optional leading `#` as rendered in lists.
static DISPLAY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?TK-\d+(-[A-Z0-9]{4})?$").unwrap());

// ============================================================================
// People
// ============================================================================

/// A person referenced by a ticket (requester or assignee).
///
/// This is a denormalized snapshot embedded in the ticket record by the store;
/// any of the name fields may be missing for incomplete profiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    /// Person id in the external store.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Person {
    /// Create a person with just an id (no profile data).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
            display_name: None,
            email: None,
            avatar_url: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set first and last name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Best available human-readable name: display name, falling back to email.
    ///
    /// Returns `None` when the profile has neither, in which case callers
    /// substitute their own placeholder.
    pub fn best_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.is_empty()))
    }
}

// ============================================================================
// Classification enums
// ============================================================================

/// Ticket type.
///
/// The well-known variants cover the default registry; organizations can add
/// their own types, which round-trip through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketType {
    Incident,
    Request,
    Problem,
    Change,
    GeneralQuery,
    /// Organization-defined type, stored by its wire id.
    Custom(String),
}

impl TicketType {
    /// Wire id for this type.
    pub fn as_str(&self) -> &str {
        match self {
            TicketType::Incident => "incident",
            TicketType::Request => "request",
            TicketType::Problem => "problem",
            TicketType::Change => "change",
            TicketType::GeneralQuery => "general_query",
            TicketType::Custom(id) => id,
        }
    }

    /// Display label (e.g. "General Query").
    pub fn label(&self) -> String {
        match self {
            TicketType::Incident => "Incident".to_string(),
            TicketType::Request => "Request".to_string(),
            TicketType::Problem => "Problem".to_string(),
            TicketType::Change => "Change".to_string(),
            TicketType::GeneralQuery => "General Query".to_string(),
            TicketType::Custom(id) => humanize(id),
        }
    }
}

impl From<String> for TicketType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "incident" => TicketType::Incident,
            "request" => TicketType::Request,
            "problem" => TicketType::Problem,
            "change" => TicketType::Change,
            "general_query" => TicketType::GeneralQuery,
            _ => TicketType::Custom(value),
        }
    }
}

impl From<TicketType> for String {
    fn from(value: TicketType) -> Self {
        value.as_str().to_string()
    }
}

impl From<&str> for TicketType {
    fn from(value: &str) -> Self {
        TicketType::from(value.to_string())
    }
}

/// Ticket priority. Closed set, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
    Critical,
}

impl TicketPriority {
    /// Wire id for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
            TicketPriority::Critical => "critical",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
            TicketPriority::Urgent => "Urgent",
            TicketPriority::Critical => "Critical",
        }
    }

    /// Parse a wire id, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "low" => Some(TicketPriority::Low),
            "medium" => Some(TicketPriority::Medium),
            "high" => Some(TicketPriority::High),
            "urgent" => Some(TicketPriority::Urgent),
            "critical" => Some(TicketPriority::Critical),
            _ => None,
        }
    }
}

/// Ticket status.
///
/// No transition rules are enforced; any status is reachable from any other.
/// Organizations can define extra statuses, which round-trip through `Custom`.
/// The legacy wire id `waiting_on_you` parses as `InProgress`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    New,
    InProgress,
    WaitingOnCustomer,
    OnHold,
    /// Organization-defined status, stored by its wire id.
    Custom(String),
}

impl TicketStatus {
    /// Wire id for this status.
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::WaitingOnCustomer => "waiting_on_customer",
            TicketStatus::OnHold => "on_hold",
            TicketStatus::Custom(id) => id,
        }
    }

    /// Display label as shown on the board (e.g. `OnHold` renders as "Done").
    pub fn label(&self) -> String {
        match self {
            TicketStatus::New => "New".to_string(),
            TicketStatus::InProgress => "In Progress".to_string(),
            TicketStatus::WaitingOnCustomer => "Review".to_string(),
            TicketStatus::OnHold => "Done".to_string(),
            TicketStatus::Custom(id) => humanize(id),
        }
    }
}

impl From<String> for TicketStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "new" => TicketStatus::New,
            // Legacy id still present in older records.
            "in_progress" | "waiting_on_you" => TicketStatus::InProgress,
            "waiting_on_customer" => TicketStatus::WaitingOnCustomer,
            "on_hold" => TicketStatus::OnHold,
            _ => TicketStatus::Custom(value),
        }
    }
}

impl From<TicketStatus> for String {
    fn from(value: TicketStatus) -> Self {
        value.as_str().to_string()
    }
}

impl From<&str> for TicketStatus {
    fn from(value: &str) -> Self {
        TicketStatus::from(value.to_string())
    }
}

/// "general_query" -> "General query"; matches how the original registry
/// labels ids it has no entry for.
fn humanize(id: &str) -> String {
    let spaced = id.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown".to_string(),
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// A ticket record as served by the external store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Server-assigned opaque id, used for all store calls.
    pub id: String,

    /// Human-facing sequence id (e.g. `TK-1759421483412-AZZU`).
    /// Assigned once at creation, immutable thereafter.
    pub display_id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub ticket_type: TicketType,

    pub priority: TicketPriority,

    pub status: TicketStatus,

    /// Requester id. Never empty for a persisted ticket.
    pub requester_id: String,

    /// Assignee ids, possibly empty. The primary assignee is the first element.
    #[serde(default)]
    pub assignee_ids: Vec<String>,

    /// Denormalized requester profile, when the store resolved it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<Person>,

    /// Denormalized assignee profiles, index-aligned with `assignee_ids`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<Person>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Set at creation, immutable.
    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// The primary assignee id, kept for single-assignee displays.
    pub fn primary_assignee_id(&self) -> Option<&str> {
        self.assignee_ids.first().map(String::as_str)
    }

    /// The primary assignee's profile, when resolved.
    pub fn primary_assignee(&self) -> Option<&Person> {
        self.assignees.first()
    }

    /// True when nobody is assigned.
    pub fn is_unassigned(&self) -> bool {
        self.assignee_ids.is_empty()
    }

    /// True when the given person id is among the assignees.
    pub fn has_assignee(&self, person_id: &str) -> bool {
        self.assignee_ids.iter().any(|id| id == person_id)
    }

    /// True when the ticket carries the given tag (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Generate a fresh display id: creation millis plus a short random suffix.
pub fn next_display_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(4)
        .collect();
    format!("TK-{}-{}", millis, suffix)
}

/// Check whether a string looks like a display id, with or without the
/// leading `#` used in list rendering. Accepts the legacy `TK-0001` form.
pub fn is_display_id(value: &str) -> bool {
    DISPLAY_ID_RE.is_match(value)
}

// ============================================================================
// Ticket type registry
// ============================================================================

/// An entry in the ticket-type registry served by the external store.
///
/// The registry drives the type-based kanban column set; it is configuration
/// data, not derived from the tickets themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketTypeEntry {
    /// Wire id (e.g. "incident").
    pub id: String,
    /// Display label (e.g. "Incident").
    pub label: String,
    /// Color token for column headers.
    pub color: String,
}

impl TicketTypeEntry {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// The default registry, used when the store has no organization overrides.
pub fn default_ticket_types() -> Vec<TicketTypeEntry> {
    vec![
        TicketTypeEntry::new("incident", "Incident", "red"),
        TicketTypeEntry::new("request", "Request", "blue"),
        TicketTypeEntry::new("problem", "Problem", "orange"),
        TicketTypeEntry::new("change", "Change", "green"),
        TicketTypeEntry::new("general_query", "General Query", "purple"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            display_id: next_display_id(),
            title: "Printer on fire".to_string(),
            description: None,
            ticket_type: TicketType::Incident,
            priority: TicketPriority::High,
            status: TicketStatus::New,
            requester_id: "u-req".to_string(),
            assignee_ids: vec![],
            requester: None,
            assignees: vec![],
            due_date: None,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_ticket_type_round_trip() {
        for id in ["incident", "request", "problem", "change", "general_query"] {
            let t = TicketType::from(id);
            assert_eq!(t.as_str(), id);
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", id));
            let back: TicketType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, t);
        }
    }

    #[test]
    fn test_custom_ticket_type_round_trip() {
        let t = TicketType::from("hardware_swap");
        assert_eq!(t, TicketType::Custom("hardware_swap".to_string()));
        assert_eq!(t.label(), "Hardware swap");
        let json = serde_json::to_string(&t).unwrap();
        let back: TicketType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_status_legacy_alias() {
        let s = TicketStatus::from("waiting_on_you");
        assert_eq!(s, TicketStatus::InProgress);
        assert_eq!(s.as_str(), "in_progress");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TicketStatus::New.label(), "New");
        assert_eq!(TicketStatus::InProgress.label(), "In Progress");
        assert_eq!(TicketStatus::WaitingOnCustomer.label(), "Review");
        assert_eq!(TicketStatus::OnHold.label(), "Done");
        assert_eq!(TicketStatus::from("escalated").label(), "Escalated");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(TicketPriority::parse("HIGH"), Some(TicketPriority::High));
        assert_eq!(TicketPriority::parse("urgent"), Some(TicketPriority::Urgent));
        assert_eq!(TicketPriority::parse("whenever"), None);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TicketPriority::Low < TicketPriority::Critical);
        assert!(TicketPriority::High < TicketPriority::Urgent);
    }

    #[test]
    fn test_primary_assignee() {
        let mut t = ticket("t-1");
        assert!(t.is_unassigned());
        assert_eq!(t.primary_assignee_id(), None);

        t.assignee_ids = vec!["u-1".to_string(), "u-2".to_string()];
        assert_eq!(t.primary_assignee_id(), Some("u-1"));
        assert!(t.has_assignee("u-2"));
        assert!(!t.has_assignee("u-3"));
    }

    #[test]
    fn test_display_id_format() {
        let id = next_display_id();
        assert!(is_display_id(&id), "generated id should validate: {}", id);
        assert!(is_display_id(&format!("#{}", id)));
        assert!(is_display_id("TK-0001"));
        assert!(is_display_id("#TK-1759421483412-AZZU"));
        assert!(!is_display_id("TICKET-42"));
        assert!(!is_display_id("TK-abc"));
    }

    #[test]
    fn test_person_best_name() {
        let p = Person::new("u-1")
            .with_name("Ada", "Lovelace")
            .with_email("ada@example.com");
        // No display name: email wins over first/last (names feed initials only).
        assert_eq!(p.best_name(), Some("ada@example.com"));

        let p = p.with_display_name("Ada Lovelace");
        assert_eq!(p.best_name(), Some("Ada Lovelace"));

        assert_eq!(Person::new("u-2").best_name(), None);
    }

    #[test]
    fn test_ticket_serde_round_trip() {
        let mut t = ticket("t-9");
        t.assignee_ids = vec!["u-1".to_string()];
        t.assignees = vec![Person::new("u-1").with_display_name("Grace Hopper")];
        t.tags = vec!["billing".to_string()];
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"type\":\"incident\""));
        let back: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        let mut t = ticket("t-1");
        t.tags = vec!["Billing".to_string()];
        assert!(t.has_tag("billing"));
        assert!(!t.has_tag("vip"));
    }
}
