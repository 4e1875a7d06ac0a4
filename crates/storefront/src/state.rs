//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{SelectorBackend, VtexSelectorBackend};
use crate::vtex::VtexError;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the platform backend.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn SelectorBackend>,
}

impl AppState {
    /// Create a new application state backed by the platform APIs.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform clients can't be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, VtexError> {
        let backend = Arc::new(VtexSelectorBackend::new(&config.vtex)?);
        Ok(Self::with_backend(config, backend))
    }

    /// Create application state over an arbitrary backend.
    #[must_use]
    pub fn with_backend(config: StorefrontConfig, backend: Arc<dyn SelectorBackend>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a handle to the selector backend.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn SelectorBackend> {
        Arc::clone(&self.inner.backend)
    }
}
