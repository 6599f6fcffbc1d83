use std::sync::Arc;

use deskline_core::{Config, SanitizedConfig, TicketDesk};

/// Shared application state
pub struct AppState {
    config: Config,
    desk: Arc<TicketDesk>,
}

impl AppState {
    pub fn new(config: Config, desk: Arc<TicketDesk>) -> Self {
        Self { config, desk }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn desk(&self) -> &TicketDesk {
        &self.desk
    }
}
