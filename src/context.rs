//! Shared handles passed to every coordinator
//!
//! Tags, layer managers and the seat receive a [`Context`] at construction
//! instead of reaching for globals, so tests can build isolated instances.

use std::sync::Arc;

use crate::config::StrataConfig;
use crate::events::EventBus;

#[derive(Debug, Clone)]
pub struct Context {
    pub events: Arc<EventBus>,
    pub config: Arc<StrataConfig>,
}

impl Context {
    /// Context with its own private event bus
    pub fn new(config: StrataConfig) -> Self {
        Self::with_events(config, Arc::new(EventBus::new()))
    }

    pub fn with_events(config: StrataConfig, events: Arc<EventBus>) -> Self {
        Self {
            events,
            config: Arc::new(config),
        }
    }

    /// Context wired to the process-wide bus
    pub fn global(config: StrataConfig) -> Self {
        Self::with_events(config, EventBus::global())
    }

    /// Global gap between tiled windows
    pub fn gap(&self) -> i32 {
        self.config.general.gap
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(StrataConfig::default())
    }
}
