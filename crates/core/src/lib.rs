pub mod config;
pub mod desk;
pub mod metrics;
pub mod notify;
pub mod testing;
pub mod ticket;
pub mod view;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, EventsConfig,
    SanitizedConfig, ServerConfig, StoreConfig,
};
pub use desk::{BulkDeleteOutcome, BulkFailure, DeskError, TicketDesk};
pub use notify::{create_notifier, run_logger, DeskEvent, DeskEventEnvelope, NotifyHandle};
pub use ticket::{
    default_ticket_types, is_display_id, next_display_id, CreateTicketRequest, HttpTicketStore,
    Person, StoreError, Ticket, TicketPage, TicketPatch, TicketPriority, TicketQuery,
    TicketStatus, TicketStore, TicketType, TicketTypeEntry,
};
pub use view::{
    category_of, columns_for, derive_board, derive_groups, group_rows, normalize_all,
    project_board, reassignment_patch, BoardColumn, Category, DateRange, FacetFilters,
    FacetSelection, GroupKey, KanbanColumn, KanbanDimension, PersonBadge, ProjectionError,
    TicketGroup, TicketRow,
};
