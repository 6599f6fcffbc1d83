//! Desk event notifications.

mod events;
mod handle;

pub use events::DeskEvent;
pub use handle::{create_notifier, run_logger, DeskEventEnvelope, NotifyHandle};
