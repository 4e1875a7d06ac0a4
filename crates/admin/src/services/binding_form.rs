//! Admin Binding Form.
//!
//! A merchant picks a binding and, for every other storefront binding, sets
//! whether it is shown and the label shoppers see. Each submission produces
//! one `BindingsSaved` record that replaces any earlier record for the same
//! binding; the whole array is then written back. Saves are serialized so
//! overlapping submissions for different bindings keep each other's records.

use std::collections::HashMap;
use std::sync::Arc;

use binding_selector_core::{
    Binding, BindingId, BindingsSaved, FilteredBinding, TranslatedLocale, filter_bindings,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::db::{BindingInfoStore, RepositoryError};
use crate::tenant::{TenantError, TenantSource};

/// Form fields as posted by the admin UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingFormSubmission {
    /// Visibility per binding; missing means hidden.
    #[serde(default)]
    pub show: HashMap<BindingId, bool>,
    /// Translated label per binding.
    #[serde(default)]
    pub labels: HashMap<BindingId, String>,
}

/// Errors from the binding form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown binding: {0}")]
    UnknownBinding(BindingId),

    #[error("label given for unknown binding: {0}")]
    UnknownLabel(BindingId),

    #[error("label required for visible binding: {0}")]
    MissingLabel(BindingId),

    #[error("tenant error: {0}")]
    Tenant(#[from] TenantError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Everything the form needs to render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingsOverview {
    /// Storefront bindings (admin bindings excluded).
    pub bindings: Vec<FilteredBinding>,
    pub saved: Vec<BindingsSaved>,
}

/// Build the record for `chosen` from a submission.
///
/// # Errors
///
/// Returns an error if `chosen` or a labelled binding isn't a storefront
/// binding of the tenant, or a visible binding has a blank label.
pub fn build_record(
    chosen: &BindingId,
    submission: &BindingFormSubmission,
    tenant_bindings: &[Binding],
) -> Result<BindingsSaved, FormError> {
    let bindings = filter_bindings(tenant_bindings);
    let is_known = |id: &BindingId| bindings.iter().any(|binding| &binding.id == id);

    if !is_known(chosen) {
        return Err(FormError::UnknownBinding(chosen.clone()));
    }

    if let Some(id) = submission.labels.keys().find(|id| !is_known(id)) {
        return Err(FormError::UnknownLabel(id.clone()));
    }

    let label_of = |id: &BindingId| {
        submission
            .labels
            .get(id)
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
    };

    let mut translated_locales = Vec::new();
    for binding in &bindings {
        let visible = submission.show.get(&binding.id).copied().unwrap_or(false);

        match label_of(&binding.id) {
            Some(label) => translated_locales.push(TranslatedLocale {
                id: binding.id.clone(),
                label: label.to_string(),
                default_locale: binding.default_locale.clone(),
                canonical_base_address: binding.canonical_base_address.clone(),
            }),
            None if visible => return Err(FormError::MissingLabel(binding.id.clone())),
            None => {}
        }
    }

    Ok(BindingsSaved {
        binding_id: chosen.clone(),
        show: submission.show.get(chosen).copied().unwrap_or(false),
        translated_locales,
    })
}

/// Drop any record for the same binding, then append `record`.
#[must_use]
pub fn replace_record(mut saved: Vec<BindingsSaved>, record: BindingsSaved) -> Vec<BindingsSaved> {
    saved.retain(|existing| existing.binding_id != record.binding_id);
    saved.push(record);
    saved
}

/// Reads and saves the binding form.
#[derive(Clone)]
pub struct BindingFormService {
    store: Arc<dyn BindingInfoStore>,
    tenant: Arc<dyn TenantSource>,
    /// Held across read, replace and write of the saved array.
    save_lock: Arc<Mutex<()>>,
}

impl BindingFormService {
    #[must_use]
    pub fn new(store: Arc<dyn BindingInfoStore>, tenant: Arc<dyn TenantSource>) -> Self {
        Self {
            store,
            tenant,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Storefront bindings and saved records.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant query or the store read fails.
    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<BindingsOverview, FormError> {
        let (bindings, saved) = tokio::join!(self.tenant.bindings(), self.store.read());

        Ok(BindingsOverview {
            bindings: filter_bindings(&bindings?),
            saved: saved?,
        })
    }

    /// Validate a submission and persist it.
    ///
    /// Returns the full saved array after the write.
    ///
    /// # Errors
    ///
    /// Returns a validation error without writing anything, or an error if
    /// the tenant query or the store fails.
    #[instrument(skip(self, submission), fields(binding_id = %chosen))]
    pub async fn submit(
        &self,
        chosen: &BindingId,
        submission: &BindingFormSubmission,
    ) -> Result<Vec<BindingsSaved>, FormError> {
        let tenant_bindings = self.tenant.bindings().await?;
        let record = build_record(chosen, submission, &tenant_bindings)?;

        let _guard = self.save_lock.lock().await;
        let saved = replace_record(self.store.read().await?, record);
        self.store.write(&saved).await?;

        info!(records = saved.len(), "Binding labels saved");
        Ok(saved)
    }
}
