//! Kanban projection: fixed, ordered columns for drag-and-drop display.
//!
//! Column sets for status/priority/category are hardcoded ordered lists, not
//! derived from data; the type-based column set comes from the external
//! ticket-type registry. The board is a projection, not a partition: a row
//! whose field matches no column simply does not appear.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::{TicketPatch, TicketPriority, TicketStatus, TicketType, TicketTypeEntry};

use super::normalize::TicketRow;

/// Grouping dimension for the kanban board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KanbanDimension {
    #[default]
    Type,
    Status,
    Priority,
    Category,
}

impl KanbanDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            KanbanDimension::Type => "type",
            KanbanDimension::Status => "status",
            KanbanDimension::Priority => "priority",
            KanbanDimension::Category => "category",
        }
    }
}

/// Coarse business category, computed from the ticket type.
///
/// Category is not a stored field; it exists only as a board dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Technical,
    Billing,
    General,
    Feature,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Billing => "billing",
            Category::General => "general",
            Category::Feature => "feature",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "technical" => Some(Category::Technical),
            "billing" => Some(Category::Billing),
            "general" => Some(Category::General),
            "feature" => Some(Category::Feature),
            _ => None,
        }
    }

    /// The representative type used when a drag targets a category column,
    /// since category itself is not stored. Inverse of `category_of`.
    pub fn representative_type(&self) -> TicketType {
        match self {
            Category::Technical => TicketType::Incident,
            Category::Billing => TicketType::Request,
            Category::General => TicketType::GeneralQuery,
            Category::Feature => TicketType::Change,
        }
    }
}

/// Static type-to-category lookup. Requests carrying the `billing` tag land
/// in Billing; organization-defined types land in General.
pub fn category_of(ticket_type: &TicketType, tags: &[String]) -> Category {
    match ticket_type {
        TicketType::Incident | TicketType::Problem => Category::Technical,
        TicketType::Request => {
            if tags.iter().any(|t| t.eq_ignore_ascii_case("billing")) {
                Category::Billing
            } else {
                Category::General
            }
        }
        TicketType::Change => Category::Feature,
        TicketType::GeneralQuery | TicketType::Custom(_) => Category::General,
    }
}

/// One board column: id to match against, display title, color token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KanbanColumn {
    pub id: String,
    pub title: String,
    pub color: String,
}

impl KanbanColumn {
    fn new(id: &str, title: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            color: color.to_string(),
        }
    }
}

/// A column with its member rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardColumn {
    #[serde(flatten)]
    pub column: KanbanColumn,
    pub rows: Vec<TicketRow>,
}

/// Error for board operations.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The drop target is not a column of the active dimension.
    #[error("unknown {dimension} column: {column}")]
    UnknownColumn { dimension: String, column: String },
}

fn status_columns() -> Vec<KanbanColumn> {
    vec![
        KanbanColumn::new("new", "New", "blue"),
        KanbanColumn::new("in_progress", "In Progress", "yellow"),
        KanbanColumn::new("waiting_on_customer", "Review", "purple"),
        KanbanColumn::new("on_hold", "Done", "green"),
    ]
}

fn priority_columns() -> Vec<KanbanColumn> {
    vec![
        KanbanColumn::new("urgent", "Urgent", "red"),
        KanbanColumn::new("high", "High", "red"),
        KanbanColumn::new("medium", "Medium", "yellow"),
        KanbanColumn::new("low", "Low", "green"),
    ]
}

fn category_columns() -> Vec<KanbanColumn> {
    vec![
        KanbanColumn::new("technical", "Technical", "blue"),
        KanbanColumn::new("billing", "Billing", "green"),
        KanbanColumn::new("general", "General", "purple"),
        KanbanColumn::new("feature", "Feature Request", "orange"),
    ]
}

fn type_columns(registry: &[TicketTypeEntry]) -> Vec<KanbanColumn> {
    registry
        .iter()
        .map(|entry| KanbanColumn::new(&entry.id, &entry.label, &entry.color))
        .collect()
}

/// The ordered column set for a dimension. Status, priority and category
/// columns are fixed regardless of which values are present in the data;
/// type columns come from the registry.
pub fn columns_for(dimension: KanbanDimension, registry: &[TicketTypeEntry]) -> Vec<KanbanColumn> {
    match dimension {
        KanbanDimension::Status => status_columns(),
        KanbanDimension::Priority => priority_columns(),
        KanbanDimension::Category => category_columns(),
        KanbanDimension::Type => type_columns(registry),
    }
}

/// Whether a row belongs to the column with the given id.
fn is_member(row: &TicketRow, dimension: KanbanDimension, column_id: &str) -> bool {
    match dimension {
        KanbanDimension::Status => row.status.as_str() == column_id,
        KanbanDimension::Priority => row.priority.as_str() == column_id,
        KanbanDimension::Type => row.ticket_type.as_str() == column_id,
        KanbanDimension::Category => {
            category_of(&row.ticket_type, &row.tags).as_str() == column_id
        }
    }
}

/// Project filtered rows onto the board for a dimension.
///
/// Column order is fixed by `columns_for`; row order within a column follows
/// the input.
pub fn project_board(
    rows: &[TicketRow],
    dimension: KanbanDimension,
    registry: &[TicketTypeEntry],
) -> Vec<BoardColumn> {
    columns_for(dimension, registry)
        .into_iter()
        .map(|column| {
            let members = rows
                .iter()
                .filter(|row| is_member(row, dimension, &column.id))
                .cloned()
                .collect();
            BoardColumn {
                column,
                rows: members,
            }
        })
        .collect()
}

/// The single-field patch produced by dropping a ticket onto a column.
///
/// Status, priority and type map directly; a category target maps back to its
/// representative type. Unknown status/priority/category column ids are
/// rejected; unknown type ids resolve through the registry and otherwise pass
/// through as a custom type id.
pub fn reassignment_patch(
    dimension: KanbanDimension,
    column_id: &str,
    registry: &[TicketTypeEntry],
) -> Result<TicketPatch, ProjectionError> {
    let unknown = || ProjectionError::UnknownColumn {
        dimension: dimension.as_str().to_string(),
        column: column_id.to_string(),
    };

    match dimension {
        KanbanDimension::Status => {
            if !status_columns().iter().any(|c| c.id == column_id) {
                return Err(unknown());
            }
            Ok(TicketPatch::new().with_status(TicketStatus::from(column_id)))
        }
        KanbanDimension::Priority => {
            let priority = TicketPriority::parse(column_id).ok_or_else(unknown)?;
            // Critical exists as a priority but not as a board column, so it
            // can never be a drop target here.
            if !priority_columns().iter().any(|c| c.id == column_id) {
                return Err(unknown());
            }
            Ok(TicketPatch::new().with_priority(priority))
        }
        KanbanDimension::Type => {
            let ticket_type = registry
                .iter()
                .find(|entry| entry.id.eq_ignore_ascii_case(column_id))
                .map(|entry| TicketType::from(entry.id.as_str()))
                .unwrap_or_else(|| TicketType::from(column_id.to_lowercase().as_str()));
            Ok(TicketPatch::new().with_type(ticket_type))
        }
        KanbanDimension::Category => {
            let category = Category::parse(column_id).ok_or_else(unknown)?;
            Ok(TicketPatch::new().with_type(category.representative_type()))
        }
    }
}
