//! Ticket model and store boundary.

mod http_store;
mod store;
mod types;

pub use http_store::HttpTicketStore;
pub use store::{
    CreateTicketRequest, StoreError, TicketPage, TicketPatch, TicketQuery, TicketStore,
};
pub use types::{
    default_ticket_types, is_display_id, next_display_id, Person, Ticket, TicketPriority,
    TicketStatus, TicketType, TicketTypeEntry,
};
