//! Grouping of filtered rows into labeled buckets.

use serde::{Deserialize, Serialize};

use super::normalize::TicketRow;

/// Label for the single bucket produced by `GroupKey::None`.
pub const ALL_TICKETS: &str = "All Tickets";

/// Bucket label for tickets without a primary assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// Grouping dimension for the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    #[default]
    None,
    Status,
    Priority,
    Type,
    DueDate,
    /// Group by who reported the ticket.
    #[serde(alias = "reported_by")]
    Requester,
    Assignee,
}

/// One named bucket of rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketGroup {
    pub label: String,
    pub rows: Vec<TicketRow>,
}

/// Bucket label for one row under the given key.
///
/// Every row gets a label; rows with missing data land in the
/// facet-appropriate fallback bucket rather than being dropped.
fn label_for(row: &TicketRow, key: GroupKey) -> String {
    match key {
        GroupKey::None => ALL_TICKETS.to_string(),
        GroupKey::Status => row.status_label.clone(),
        GroupKey::Priority => row.priority_label.clone(),
        GroupKey::Type => row.type_label.clone(),
        GroupKey::DueDate => row.due_label.clone(),
        GroupKey::Requester => row.requester.name.clone(),
        GroupKey::Assignee => row
            .primary_assignee()
            .map(|badge| badge.name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string()),
    }
}

/// Partition rows into labeled groups.
///
/// Group order is first-encounter order while scanning the input; relative
/// order within each group is preserved. The union of all groups is exactly
/// the input: nothing is dropped, nothing is duplicated.
pub fn group_rows(rows: &[TicketRow], key: GroupKey) -> Vec<TicketGroup> {
    if key == GroupKey::None {
        return vec![TicketGroup {
            label: ALL_TICKETS.to_string(),
            rows: rows.to_vec(),
        }];
    }

    let mut groups: Vec<TicketGroup> = Vec::new();
    for row in rows {
        let label = label_for(row, key);
        match groups.iter_mut().find(|group| group.label == label) {
            Some(group) => group.rows.push(row.clone()),
            None => groups.push(TicketGroup {
                label,
                rows: vec![row.clone()],
            }),
        }
    }
    groups
}
