//! Application state for the payroll HTTP API.

use std::sync::Arc;

use crate::config::{ConfigLoader, EngineSettings};

/// Shared application state.
///
/// Holds the engine settings every request's dispatcher is created with.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_settings_come_from_loader() {
        let state = AppState::new(ConfigLoader::load("./config/default").unwrap());
        assert_eq!(state.settings().utc_offset_minutes, 540);
    }
}
