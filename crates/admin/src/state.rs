//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::TenantConfig;
use crate::db::{BindingInfoStore, PgBindingInfoStore};
use crate::services::BindingFormService;
use crate::tenant::{TenantClient, TenantError, TenantSource};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: Option<PgPool>,
    binding_form: BindingFormService,
}

impl AppState {
    /// Create the application state over `PostgreSQL` and the tenant API.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant client can't be built.
    pub fn new(tenant: &TenantConfig, pool: PgPool) -> Result<Self, TenantError> {
        let store: Arc<dyn BindingInfoStore> = Arc::new(PgBindingInfoStore::new(pool.clone()));
        let tenant: Arc<dyn TenantSource> = Arc::new(TenantClient::new(tenant)?);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool: Some(pool),
                binding_form: BindingFormService::new(store, tenant),
            }),
        })
    }

    /// Create state over arbitrary ports, without a database pool.
    #[must_use]
    pub fn with_ports(store: Arc<dyn BindingInfoStore>, tenant: Arc<dyn TenantSource>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool: None,
                binding_form: BindingFormService::new(store, tenant),
            }),
        }
    }

    /// Get the database pool, if the state was built with one.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the binding form service.
    #[must_use]
    pub fn binding_form(&self) -> &BindingFormService {
        &self.inner.binding_form
    }
}
