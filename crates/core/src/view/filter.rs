//! Faceted filtering over normalized ticket rows.
//!
//! All active facets combine with logical AND; within a multi-value facet,
//! membership is logical OR. Filtering is a pure, order-preserving subset
//! operation over an in-memory collection (a few thousand rows at most).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::normalize::TicketRow;

/// Selection state for one classification facet (type, priority, status).
///
/// Two input modes coexist: the legacy single-select (where `None` is the
/// "all" sentinel) and the multi-select list. A non-empty `any_of` list takes
/// precedence over the single-select value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetSelection {
    /// Legacy single-select value. `None` means "all".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    /// Multi-select values. Non-empty wins over `selected`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<String>,
}

impl FacetSelection {
    /// No constraint.
    pub fn all() -> Self {
        Self::default()
    }

    /// Legacy single-select constraint.
    pub fn one(value: impl Into<String>) -> Self {
        Self {
            selected: Some(value.into()),
            any_of: Vec::new(),
        }
    }

    /// Multi-select constraint.
    pub fn any(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            selected: None,
            any_of: values.into_iter().map(Into::into).collect(),
        }
    }

    /// True when this facet constrains anything.
    pub fn is_active(&self) -> bool {
        !self.any_of.is_empty() || self.selected.is_some()
    }

    fn is_inactive(&self) -> bool {
        !self.is_active()
    }

    /// Whether a wire id passes this facet. Comparison is case-insensitive.
    pub fn matches(&self, value: &str) -> bool {
        if !self.any_of.is_empty() {
            return self
                .any_of
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(value));
        }
        match &self.selected {
            Some(selected) => selected.eq_ignore_ascii_case(value),
            None => true,
        }
    }
}

/// Inclusive bounds on a timestamp. Either side may be open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    fn is_inactive(&self) -> bool {
        !self.is_active()
    }

    /// Inclusive containment; an absent bound imposes no constraint.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(from) = self.from {
            if at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if at > to {
                return false;
            }
        }
        true
    }
}

/// Ephemeral, client-side filter state for the ticket list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetFilters {
    /// Free-text search. Empty matches everything.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(default, skip_serializing_if = "FacetSelection::is_inactive")]
    pub ticket_type: FacetSelection,
    #[serde(default, skip_serializing_if = "FacetSelection::is_inactive")]
    pub priority: FacetSelection,
    #[serde(default, skip_serializing_if = "FacetSelection::is_inactive")]
    pub status: FacetSelection,
    /// Person-id multi-select. A ticket matches when any of its assignees is
    /// listed; unassigned tickets never match a non-empty list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    /// Person-id multi-select over the requester.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requesters: Vec<String>,
    /// Inclusive bounds on `created_at`.
    #[serde(default, skip_serializing_if = "DateRange::is_inactive")]
    pub created: DateRange,
}

impl FacetFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_type(mut self, selection: FacetSelection) -> Self {
        self.ticket_type = selection;
        self
    }

    pub fn with_priority(mut self, selection: FacetSelection) -> Self {
        self.priority = selection;
        self
    }

    pub fn with_status(mut self, selection: FacetSelection) -> Self {
        self.status = selection;
        self
    }

    pub fn with_assignees(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.assignees = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_requesters(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.requesters = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created(mut self, range: DateRange) -> Self {
        self.created = range;
        self
    }

    /// True when no facet constrains anything.
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty()
            && !self.ticket_type.is_active()
            && !self.priority.is_active()
            && !self.status.is_active()
            && self.assignees.is_empty()
            && self.requesters.is_empty()
            && !self.created.is_active()
    }

    /// Whether one row satisfies every active facet.
    pub fn matches(&self, row: &TicketRow) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let assignee_name = row
                .primary_assignee()
                .map(|badge| badge.name.as_str())
                .unwrap_or("");
            let hit = row.title.to_lowercase().contains(&needle)
                || row.description.to_lowercase().contains(&needle)
                || row.display_ref.to_lowercase().contains(&needle)
                || row.requester.name.to_lowercase().contains(&needle)
                || assignee_name.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if !self.ticket_type.matches(row.ticket_type.as_str()) {
            return false;
        }
        if !self.priority.matches(row.priority.as_str()) {
            return false;
        }
        if !self.status.matches(row.status.as_str()) {
            return false;
        }

        if !self.assignees.is_empty()
            && !row
                .assignee_ids
                .iter()
                .any(|id| self.assignees.contains(id))
        {
            return false;
        }

        if !self.requesters.is_empty() && !self.requesters.contains(&row.requester_id) {
            return false;
        }

        self.created.contains(row.created_at)
    }

    /// Order-preserving subset of the input; never reorders or duplicates.
    pub fn apply(&self, rows: &[TicketRow]) -> Vec<TicketRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}
