//! Application state for the chat server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::engine::RagEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    engine: RagEngine,
    ready: RwLock<bool>,
}

impl AppState {
    /// Wrap a fully built engine. The state starts ready.
    pub fn new(config: RagConfig, engine: RagEngine) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                ready: RwLock::new(true),
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> &RagEngine {
        &self.inner.engine
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
