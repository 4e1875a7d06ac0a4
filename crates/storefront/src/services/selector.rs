//! Binding Selector Controller.
//!
//! Drives one shopper's binding switch:
//!
//! ```text
//! Idle -> LoadingTenantData -> Ready -> LoadingRedirect -> Navigated
//!                  \
//!                   -> Unavailable (tenant or cart fetch failed)
//! ```
//!
//! A selection is a two-phase commit. [`BindingSelector::begin_select`]
//! makes the chosen binding current and leaves the cart update pending, which
//! [`BindingSelector::view`] reports. [`BindingSelector::finish_select`] then
//! moves the cart and resolves the redirect. A failed cart update never
//! prevents navigation; whether navigation waits for it is set by
//! [`ChannelUpdateMode`]. If the redirect can't be resolved the selection is
//! rolled back to the previous binding.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use binding_selector_core::{
    AlternateRoute, Binding, BindingId, FilteredBinding, OrderForm, OrderFormId, PageContext,
    RedirectError, RedirectTarget, SalesChannel, build_redirect_url, filter_bindings, match_route,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::vtex::VtexError;

/// Everything the selector reads from the platform.
#[async_trait]
pub trait SelectorBackend: Send + Sync {
    /// Every binding configured on the tenant.
    async fn tenant_bindings(&self) -> Result<Vec<Binding>, VtexError>;

    /// The shopper's cart.
    async fn order_form(&self, order_form_id: &OrderFormId) -> Result<OrderForm, VtexError>;

    /// Whether switching binding also switches the cart's sales channel.
    async fn sales_channel_update_enabled(&self) -> Result<bool, VtexError>;

    /// Move the cart to a sales channel, returning the cart id.
    async fn update_sales_channel(
        &self,
        order_form_id: &OrderFormId,
        sales_channel: &SalesChannel,
        locale: &str,
    ) -> Result<OrderFormId, VtexError>;

    /// Equivalent routes of a page on every binding.
    async fn alternate_routes(&self, page: &PageContext) -> Result<Vec<AlternateRoute>, VtexError>;
}

// =============================================================================
// Options
// =============================================================================

/// Ordering between the cart's channel update and the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelUpdateMode {
    /// Wait for the update, then redirect whatever its result.
    #[default]
    Block,
    /// Start the update in the background and redirect immediately.
    Detach,
}

impl FromStr for ChannelUpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(Self::Block),
            "detach" => Ok(Self::Detach),
            other => Err(format!("expected 'block' or 'detach', got '{other}'")),
        }
    }
}

/// What to do when no alternate route matches the chosen binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingRoutePolicy {
    /// Redirect to the binding's canonical root.
    #[default]
    CanonicalRoot,
    /// Fail the selection with [`SelectorError::RouteNotFound`].
    Reject,
}

impl FromStr for MissingRoutePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canonical-root" => Ok(Self::CanonicalRoot),
            "reject" => Ok(Self::Reject),
            other => Err(format!("expected 'canonical-root' or 'reject', got '{other}'")),
        }
    }
}

/// Selector behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorOptions {
    pub channel_update: ChannelUpdateMode,
    pub missing_route: MissingRoutePolicy,
}

// =============================================================================
// State
// =============================================================================

/// Where the shopper is, passed in explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorContext {
    pub page: PageContext,
    /// Binding the current page was served from.
    pub runtime_binding_id: Option<BindingId>,
    pub hostname: String,
    pub protocol: String,
    pub order_form_id: OrderFormId,
}

/// Result of the cart's sales channel update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelUpdateOutcome {
    /// Update in flight.
    Pending,
    /// Flag off, or the binding has no sales channel.
    Skipped,
    Applied {
        #[serde(rename = "orderFormId")]
        order_form_id: OrderFormId,
    },
    /// The update failed; the cart keeps its old channel.
    Failed { reason: String },
    /// Running in the background; the outcome is only logged.
    Detached,
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorPhase {
    Idle,
    LoadingTenantData,
    Ready,
    /// Tenant data or cart failed to load. Nothing is rendered.
    Unavailable,
    LoadingRedirect {
        /// Selection to restore if the redirect can't be resolved.
        previous: Option<FilteredBinding>,
        channel_update: ChannelUpdateOutcome,
    },
    Navigated { url: String },
}

impl SelectorPhase {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingTenantData => "loading_tenant_data",
            Self::Ready => "ready",
            Self::Unavailable => "unavailable",
            Self::LoadingRedirect { .. } => "loading_redirect",
            Self::Navigated { .. } => "navigated",
        }
    }
}

impl fmt::Display for SelectorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render model of the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorView {
    pub current: Option<FilteredBinding>,
    /// Bindings the shopper can switch to.
    pub options: Vec<FilteredBinding>,
    pub open: bool,
    pub loading: bool,
    pub phase: &'static str,
    /// Cart update of a selection in progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_update: Option<ChannelUpdateOutcome>,
}

/// A resolved binding switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub binding_id: BindingId,
    pub url: String,
    pub channel_update: ChannelUpdateOutcome,
}

/// Errors from the selector.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// Tenant data or cart failed to load.
    #[error("binding selector unavailable (tenant: {tenant:?}, order form: {order_form:?})")]
    Unavailable {
        tenant: Option<String>,
        order_form: Option<String>,
    },

    #[error("operation not allowed while {0}")]
    InvalidPhase(&'static str),

    #[error("unknown binding: {0}")]
    UnknownBinding(BindingId),

    #[error("binding already selected: {0}")]
    AlreadySelected(BindingId),

    #[error("no alternate route for binding {0}")]
    RouteNotFound(BindingId),

    #[error("fetch failed: {0}")]
    Fetch(#[from] VtexError),

    #[error(transparent)]
    Redirect(#[from] RedirectError),
}

// =============================================================================
// Controller
// =============================================================================

/// Binding selector for one shopper and page.
pub struct BindingSelector {
    backend: Arc<dyn SelectorBackend>,
    context: SelectorContext,
    options: SelectorOptions,
    phase: SelectorPhase,
    bindings: Vec<FilteredBinding>,
    current: Option<FilteredBinding>,
    order_form: Option<OrderForm>,
    sales_channel_update: bool,
    open: bool,
}

impl BindingSelector {
    #[must_use]
    pub fn new(
        backend: Arc<dyn SelectorBackend>,
        context: SelectorContext,
        options: SelectorOptions,
    ) -> Self {
        Self {
            backend,
            context,
            options,
            phase: SelectorPhase::Idle,
            bindings: Vec::new(),
            current: None,
            order_form: None,
            sales_channel_update: false,
            open: false,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> &SelectorPhase {
        &self.phase
    }

    #[must_use]
    pub const fn current(&self) -> Option<&FilteredBinding> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn bindings(&self) -> &[FilteredBinding] {
        &self.bindings
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Bindings other than the current one.
    pub fn options(&self) -> impl Iterator<Item = &FilteredBinding> {
        let current = self.current.as_ref().map(|b| &b.id);
        self.bindings
            .iter()
            .filter(move |binding| Some(&binding.id) != current)
    }

    /// Whether the selector shows a spinner instead of the list.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        match self.phase {
            SelectorPhase::Idle
            | SelectorPhase::LoadingTenantData
            | SelectorPhase::LoadingRedirect { .. }
            | SelectorPhase::Navigated { .. } => true,
            SelectorPhase::Ready => self.current.is_none(),
            SelectorPhase::Unavailable => false,
        }
    }

    /// Render model, or `None` when the selector must not be shown at all.
    #[must_use]
    pub fn view(&self) -> Option<SelectorView> {
        if self.phase == SelectorPhase::Unavailable {
            return None;
        }

        Some(SelectorView {
            current: self.current.clone(),
            options: self.options().cloned().collect(),
            open: self.open,
            loading: self.is_loading(),
            phase: self.phase.name(),
            channel_update: match &self.phase {
                SelectorPhase::LoadingRedirect { channel_update, .. } => {
                    Some(channel_update.clone())
                }
                _ => None,
            },
        })
    }

    /// Open or close the binding list.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Load tenant bindings, the cart and the sales channel flag.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Unavailable`] if tenant data or the cart
    /// can't be loaded. A failing flag lookup only disables the cart update.
    #[instrument(skip(self), fields(order_form_id = %self.context.order_form_id))]
    pub async fn mount(&mut self) -> Result<(), SelectorError> {
        if self.phase != SelectorPhase::Idle {
            return Err(SelectorError::InvalidPhase(self.phase.name()));
        }
        self.phase = SelectorPhase::LoadingTenantData;

        let backend = Arc::clone(&self.backend);
        let (tenant, order_form, flag) = tokio::join!(
            backend.tenant_bindings(),
            backend.order_form(&self.context.order_form_id),
            backend.sales_channel_update_enabled(),
        );

        self.sales_channel_update = flag.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load sales channel update flag, treating as disabled");
            false
        });

        let (bindings, order_form) = match (tenant, order_form) {
            (Ok(bindings), Ok(order_form)) => (bindings, order_form),
            (tenant, order_form) => {
                let tenant = tenant.err().map(|e| e.to_string());
                let order_form = order_form.err().map(|e| e.to_string());
                error!(
                    tenant_error = ?tenant,
                    order_form_error = ?order_form,
                    "Error loading binding selector"
                );
                self.phase = SelectorPhase::Unavailable;
                return Err(SelectorError::Unavailable { tenant, order_form });
            }
        };

        self.bindings = filter_bindings(&bindings);
        self.order_form = Some(order_form);
        self.current = self
            .context
            .runtime_binding_id
            .as_ref()
            .and_then(|id| self.bindings.iter().find(|binding| &binding.id == id))
            .cloned();

        if self.current.is_none() {
            warn!(
                runtime_binding_id = ?self.context.runtime_binding_id,
                "Runtime binding is not among the selectable bindings"
            );
        }

        self.phase = SelectorPhase::Ready;
        Ok(())
    }

    /// Switch to another binding and resolve where to navigate.
    ///
    /// Runs [`Self::begin_select`] then [`Self::finish_select`].
    ///
    /// # Errors
    ///
    /// Returns an error if the selector isn't ready, the binding is unknown
    /// or already current, or the redirect can't be resolved. In the last
    /// case the previous selection is restored and the selector is ready
    /// again.
    #[instrument(skip_all, fields(binding_id = %binding_id))]
    pub async fn select(&mut self, binding_id: &BindingId) -> Result<Navigation, SelectorError> {
        self.begin_select(binding_id)?;
        self.finish_select().await
    }

    /// Commit the selection optimistically.
    ///
    /// The binding becomes current, the list closes and the cart update is
    /// left [`ChannelUpdateOutcome::Pending`].
    ///
    /// # Errors
    ///
    /// Returns an error if the selector isn't ready or the binding is unknown
    /// or already current. Nothing changes in that case.
    pub fn begin_select(&mut self, binding_id: &BindingId) -> Result<(), SelectorError> {
        if self.phase != SelectorPhase::Ready {
            return Err(SelectorError::InvalidPhase(self.phase.name()));
        }
        if self.current.as_ref().is_some_and(|b| &b.id == binding_id) {
            return Err(SelectorError::AlreadySelected(binding_id.clone()));
        }

        let selected = self
            .bindings
            .iter()
            .find(|binding| &binding.id == binding_id)
            .cloned()
            .ok_or_else(|| SelectorError::UnknownBinding(binding_id.clone()))?;

        let previous = self.current.replace(selected);
        self.open = false;
        self.phase = SelectorPhase::LoadingRedirect {
            previous,
            channel_update: ChannelUpdateOutcome::Pending,
        };
        Ok(())
    }

    /// Move the cart, then resolve the redirect for the pending selection.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidPhase`] unless a selection was begun,
    /// or the redirect error after restoring the previous selection.
    pub async fn finish_select(&mut self) -> Result<Navigation, SelectorError> {
        let (previous, selected) = match (&self.phase, &self.current) {
            (
                SelectorPhase::LoadingRedirect {
                    previous,
                    channel_update: ChannelUpdateOutcome::Pending,
                },
                Some(selected),
            ) => (previous.clone(), selected.clone()),
            _ => return Err(SelectorError::InvalidPhase(self.phase.name())),
        };

        let channel_update = self.update_channel(&selected).await;
        self.phase = SelectorPhase::LoadingRedirect {
            previous: previous.clone(),
            channel_update: channel_update.clone(),
        };

        match self.resolve_redirect(&selected).await {
            Ok(url) => {
                info!(url = %url, channel_update = ?channel_update, "Navigating to binding");
                self.phase = SelectorPhase::Navigated { url: url.clone() };
                Ok(Navigation {
                    binding_id: selected.id,
                    url,
                    channel_update,
                })
            }
            Err(e) => {
                warn!(error = %e, "Redirect failed, restoring previous binding");
                self.current = previous;
                self.phase = SelectorPhase::Ready;
                Err(e)
            }
        }
    }

    /// Move the cart to the selected binding's channel, if enabled.
    async fn update_channel(&self, selected: &FilteredBinding) -> ChannelUpdateOutcome {
        if !self.sales_channel_update {
            return ChannelUpdateOutcome::Skipped;
        }
        let Some(order_form) = &self.order_form else {
            return ChannelUpdateOutcome::Skipped;
        };
        let Some(sales_channel) = selected.sales_channel.clone() else {
            warn!(binding_id = %selected.id, "Binding has no sales channel, skipping cart update");
            return ChannelUpdateOutcome::Skipped;
        };

        let order_form_id = order_form.id.clone();
        let locale = selected.default_locale.clone();

        match self.options.channel_update {
            ChannelUpdateMode::Block => {
                match self
                    .backend
                    .update_sales_channel(&order_form_id, &sales_channel, &locale)
                    .await
                {
                    Ok(order_form_id) => ChannelUpdateOutcome::Applied { order_form_id },
                    Err(e) => {
                        error!(error = %e, "Failed to update sales channel");
                        ChannelUpdateOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            ChannelUpdateMode::Detach => {
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    if let Err(e) = backend
                        .update_sales_channel(&order_form_id, &sales_channel, &locale)
                        .await
                    {
                        error!(error = %e, order_form_id = %order_form_id, "Failed to update sales channel");
                    }
                });
                ChannelUpdateOutcome::Detached
            }
        }
    }

    /// Fetch alternate routes and build the destination URL.
    async fn resolve_redirect(&self, selected: &FilteredBinding) -> Result<String, SelectorError> {
        let routes = self.backend.alternate_routes(&self.context.page).await?;
        let path = match_route(&routes, &selected.id);

        if path.is_empty() {
            match self.options.missing_route {
                MissingRoutePolicy::Reject => {
                    return Err(SelectorError::RouteNotFound(selected.id.clone()));
                }
                MissingRoutePolicy::CanonicalRoot => {
                    warn!(binding_id = %selected.id, "No alternate route, redirecting to binding root");
                }
            }
        }

        Ok(build_redirect_url(RedirectTarget {
            canonical_base_address: &selected.canonical_base_address,
            hostname: &self.context.hostname,
            protocol: &self.context.protocol,
            path,
        })?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Scripted backend recording channel updates.
    pub struct FakeBackend {
        pub bindings: Result<Vec<Binding>, String>,
        pub order_form: Result<OrderForm, String>,
        pub flag: Result<bool, String>,
        pub routes: Result<Vec<AlternateRoute>, String>,
        pub fail_channel_update: bool,
        pub channel_updates: Mutex<Vec<(OrderFormId, SalesChannel, String)>>,
        pub route_fetches: AtomicUsize,
    }

    fn upstream(message: &str) -> VtexError {
        VtexError::Api {
            status: 500,
            message: message.to_string(),
        }
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self {
                bindings: Ok(vec![
                    binding("BR", "store.com.br", "1", "pt-BR"),
                    binding("ADMIN", "store.myvtex.com/admin", "1", "en-US"),
                    binding("US", "store.com/us", "2", "en-US"),
                ]),
                order_form: Ok(OrderForm {
                    id: OrderFormId::new("of-1"),
                    items: vec![],
                    client_preferences_data: None,
                }),
                flag: Ok(false),
                routes: Ok(vec![
                    AlternateRoute {
                        binding_id: BindingId::new("BR"),
                        path: "/tenis".to_string(),
                    },
                    AlternateRoute {
                        binding_id: BindingId::new("US"),
                        path: "/en/shoes".to_string(),
                    },
                ]),
                fail_channel_update: false,
                channel_updates: Mutex::new(Vec::new()),
                route_fetches: AtomicUsize::new(0),
            }
        }

        pub fn channel_updates(&self) -> Vec<(OrderFormId, SalesChannel, String)> {
            self.channel_updates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SelectorBackend for FakeBackend {
        async fn tenant_bindings(&self) -> Result<Vec<Binding>, VtexError> {
            self.bindings.clone().map_err(|e| upstream(&e))
        }

        async fn order_form(&self, _order_form_id: &OrderFormId) -> Result<OrderForm, VtexError> {
            self.order_form.clone().map_err(|e| upstream(&e))
        }

        async fn sales_channel_update_enabled(&self) -> Result<bool, VtexError> {
            self.flag.clone().map_err(|e| upstream(&e))
        }

        async fn update_sales_channel(
            &self,
            order_form_id: &OrderFormId,
            sales_channel: &SalesChannel,
            locale: &str,
        ) -> Result<OrderFormId, VtexError> {
            self.channel_updates.lock().unwrap().push((
                order_form_id.clone(),
                sales_channel.clone(),
                locale.to_string(),
            ));
            if self.fail_channel_update {
                return Err(upstream("item unavailable"));
            }
            Ok(order_form_id.clone())
        }

        async fn alternate_routes(
            &self,
            _page: &PageContext,
        ) -> Result<Vec<AlternateRoute>, VtexError> {
            self.route_fetches.fetch_add(1, Ordering::SeqCst);
            self.routes.clone().map_err(|e| upstream(&e))
        }
    }

    pub fn binding(id: &str, address: &str, channel: &str, locale: &str) -> Binding {
        Binding {
            id: BindingId::new(id),
            default_locale: locale.to_string(),
            canonical_base_address: address.to_string(),
            sales_channel: Some(SalesChannel::new(channel)),
        }
    }

    pub fn context(runtime_binding: Option<&str>) -> SelectorContext {
        SelectorContext {
            page: PageContext {
                id: "42".to_string(),
                page_type: "product".to_string(),
            },
            runtime_binding_id: runtime_binding.map(BindingId::new),
            hostname: "shop.test".to_string(),
            protocol: "https:".to_string(),
            order_form_id: OrderFormId::new("of-1"),
        }
    }

    async fn mounted(backend: Arc<FakeBackend>, options: SelectorOptions) -> BindingSelector {
        let mut selector = BindingSelector::new(backend, context(Some("BR")), options);
        selector.mount().await.unwrap();
        selector
    }

    #[tokio::test]
    async fn test_mount_filters_and_sets_current() {
        let selector = mounted(Arc::new(FakeBackend::new()), SelectorOptions::default()).await;

        assert_eq!(selector.phase(), &SelectorPhase::Ready);
        assert_eq!(selector.bindings().len(), 2);
        assert_eq!(selector.current().unwrap().id.as_str(), "BR");
        assert!(!selector.is_loading());

        let options: Vec<&str> = selector.options().map(|b| b.id.as_str()).collect();
        assert_eq!(options, vec!["US"]);
    }

    #[tokio::test]
    async fn test_mount_unknown_runtime_binding_keeps_loading() {
        let mut selector = BindingSelector::new(
            Arc::new(FakeBackend::new()),
            context(Some("ADMIN")),
            SelectorOptions::default(),
        );
        selector.mount().await.unwrap();

        assert!(selector.current().is_none());
        assert!(selector.is_loading());
    }

    #[tokio::test]
    async fn test_mount_fails_closed_on_tenant_error() {
        let mut backend = FakeBackend::new();
        backend.bindings = Err("tenant down".to_string());
        backend.order_form = Err("checkout down".to_string());
        let mut selector = BindingSelector::new(
            Arc::new(backend),
            context(Some("BR")),
            SelectorOptions::default(),
        );

        let err = selector.mount().await.unwrap_err();
        let SelectorError::Unavailable { tenant, order_form } = err else {
            panic!("expected unavailable, got {err:?}");
        };
        assert!(tenant.unwrap().contains("tenant down"));
        assert!(order_form.unwrap().contains("checkout down"));
        assert_eq!(selector.phase(), &SelectorPhase::Unavailable);
        assert!(selector.view().is_none());
    }

    #[tokio::test]
    async fn test_mount_fails_closed_on_cart_error() {
        let mut backend = FakeBackend::new();
        backend.order_form = Err("checkout down".to_string());
        let mut selector = BindingSelector::new(
            Arc::new(backend),
            context(Some("BR")),
            SelectorOptions::default(),
        );

        assert!(matches!(
            selector.mount().await,
            Err(SelectorError::Unavailable { tenant: None, .. })
        ));
        assert!(selector.view().is_none());
    }

    #[tokio::test]
    async fn test_flag_error_disables_channel_update() {
        let mut backend = FakeBackend::new();
        backend.flag = Err("settings down".to_string());
        let backend = Arc::new(backend);
        let mut selector = mounted(backend.clone(), SelectorOptions::default()).await;

        let navigation = selector.select(&BindingId::new("US")).await.unwrap();
        assert_eq!(navigation.channel_update, ChannelUpdateOutcome::Skipped);
        assert!(backend.channel_updates().is_empty());
    }

    #[tokio::test]
    async fn test_toggle() {
        let mut selector = mounted(Arc::new(FakeBackend::new()), SelectorOptions::default()).await;
        assert!(!selector.is_open());
        selector.toggle();
        assert!(selector.is_open());
        assert!(selector.view().unwrap().open);
    }

    #[tokio::test]
    async fn test_select_end_to_end_without_channel_update() {
        let backend = Arc::new(FakeBackend::new());
        let mut selector = mounted(backend.clone(), SelectorOptions::default()).await;
        selector.toggle();

        let navigation = selector.select(&BindingId::new("US")).await.unwrap();

        assert_eq!(navigation.url, "https://shop.test/us/en/shoes");
        assert_eq!(navigation.binding_id.as_str(), "US");
        assert_eq!(navigation.channel_update, ChannelUpdateOutcome::Skipped);
        assert!(backend.channel_updates().is_empty());
        assert_eq!(selector.current().unwrap().id.as_str(), "US");
        assert!(!selector.is_open());
        assert_eq!(
            selector.phase(),
            &SelectorPhase::Navigated {
                url: "https://shop.test/us/en/shoes".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_select_updates_channel_when_enabled() {
        let mut backend = FakeBackend::new();
        backend.flag = Ok(true);
        let backend = Arc::new(backend);
        let mut selector = mounted(backend.clone(), SelectorOptions::default()).await;

        let navigation = selector.select(&BindingId::new("US")).await.unwrap();

        assert_eq!(
            backend.channel_updates(),
            vec![(
                OrderFormId::new("of-1"),
                SalesChannel::new("2"),
                "en-US".to_string()
            )]
        );
        assert_eq!(
            navigation.channel_update,
            ChannelUpdateOutcome::Applied {
                order_form_id: OrderFormId::new("of-1")
            }
        );
    }

    #[tokio::test]
    async fn test_channel_update_failure_does_not_prevent_navigation() {
        let mut backend = FakeBackend::new();
        backend.flag = Ok(true);
        backend.fail_channel_update = true;
        let mut selector = mounted(Arc::new(backend), SelectorOptions::default()).await;

        let navigation = selector.select(&BindingId::new("US")).await.unwrap();

        assert_eq!(navigation.url, "https://shop.test/us/en/shoes");
        assert!(matches!(
            navigation.channel_update,
            ChannelUpdateOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_detached_channel_update() {
        let mut backend = FakeBackend::new();
        backend.flag = Ok(true);
        let backend = Arc::new(backend);
        let options = SelectorOptions {
            channel_update: ChannelUpdateMode::Detach,
            ..SelectorOptions::default()
        };
        let mut selector = mounted(backend.clone(), options).await;

        let navigation = selector.select(&BindingId::new("US")).await.unwrap();
        assert_eq!(navigation.channel_update, ChannelUpdateOutcome::Detached);

        for _ in 0..10 {
            if !backend.channel_updates().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(backend.channel_updates().len(), 1);
    }

    #[tokio::test]
    async fn test_routes_are_fetched_lazily() {
        let backend = Arc::new(FakeBackend::new());
        let mut selector = mounted(backend.clone(), SelectorOptions::default()).await;
        assert_eq!(backend.route_fetches.load(Ordering::SeqCst), 0);

        selector.select(&BindingId::new("US")).await.unwrap();
        assert_eq!(backend.route_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_route_goes_to_canonical_root() {
        let mut backend = FakeBackend::new();
        backend.routes = Ok(vec![]);
        let mut selector = mounted(Arc::new(backend), SelectorOptions::default()).await;

        let navigation = selector.select(&BindingId::new("US")).await.unwrap();
        assert_eq!(navigation.url, "https://shop.test/us");
    }

    #[tokio::test]
    async fn test_missing_route_rejected_rolls_back() {
        let mut backend = FakeBackend::new();
        backend.routes = Ok(vec![]);
        let options = SelectorOptions {
            missing_route: MissingRoutePolicy::Reject,
            ..SelectorOptions::default()
        };
        let mut selector = mounted(Arc::new(backend), options).await;

        let result = selector.select(&BindingId::new("US")).await;
        assert!(matches!(result, Err(SelectorError::RouteNotFound(_))));
        assert_eq!(selector.current().unwrap().id.as_str(), "BR");
        assert_eq!(selector.phase(), &SelectorPhase::Ready);
    }

    #[tokio::test]
    async fn test_route_fetch_error_rolls_back() {
        let mut backend = FakeBackend::new();
        backend.routes = Err("routes down".to_string());
        let mut selector = mounted(Arc::new(backend), SelectorOptions::default()).await;

        let result = selector.select(&BindingId::new("US")).await;
        assert!(matches!(result, Err(SelectorError::Fetch(_))));
        assert_eq!(selector.current().unwrap().id.as_str(), "BR");
        assert_eq!(selector.phase(), &SelectorPhase::Ready);
    }

    #[tokio::test]
    async fn test_select_rejects_current_unknown_and_admin() {
        let mut selector = mounted(Arc::new(FakeBackend::new()), SelectorOptions::default()).await;

        assert!(matches!(
            selector.select(&BindingId::new("BR")).await,
            Err(SelectorError::AlreadySelected(_))
        ));
        assert!(matches!(
            selector.select(&BindingId::new("ADMIN")).await,
            Err(SelectorError::UnknownBinding(_))
        ));
        assert_eq!(selector.phase(), &SelectorPhase::Ready);
    }

    #[tokio::test]
    async fn test_begin_select_shows_pending_channel_update() {
        let mut backend = FakeBackend::new();
        backend.flag = Ok(true);
        let backend = Arc::new(backend);
        let mut selector = mounted(backend.clone(), SelectorOptions::default()).await;
        selector.toggle();

        selector.begin_select(&BindingId::new("US")).unwrap();

        let view = selector.view().unwrap();
        assert_eq!(view.phase, "loading_redirect");
        assert_eq!(view.channel_update, Some(ChannelUpdateOutcome::Pending));
        assert_eq!(view.current.unwrap().id.as_str(), "US");
        assert!(view.loading);
        assert!(!view.open);
        assert!(backend.channel_updates().is_empty());
        assert_eq!(backend.route_fetches.load(Ordering::SeqCst), 0);

        let navigation = selector.finish_select().await.unwrap();
        assert_eq!(navigation.url, "https://shop.test/us/en/shoes");
        assert_eq!(backend.channel_updates().len(), 1);
        assert_eq!(selector.view().unwrap().channel_update, None);
    }

    #[tokio::test]
    async fn test_finish_select_requires_pending_selection() {
        let mut selector = mounted(Arc::new(FakeBackend::new()), SelectorOptions::default()).await;

        assert!(matches!(
            selector.finish_select().await,
            Err(SelectorError::InvalidPhase("ready"))
        ));

        selector.begin_select(&BindingId::new("US")).unwrap();
        assert!(matches!(
            selector.begin_select(&BindingId::new("BR")),
            Err(SelectorError::InvalidPhase("loading_redirect"))
        ));
    }

    #[tokio::test]
    async fn test_select_before_mount() {
        let mut selector = BindingSelector::new(
            Arc::new(FakeBackend::new()),
            context(Some("BR")),
            SelectorOptions::default(),
        );
        assert!(matches!(
            selector.select(&BindingId::new("US")).await,
            Err(SelectorError::InvalidPhase("idle"))
        ));
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!(
            "block".parse::<ChannelUpdateMode>().unwrap(),
            ChannelUpdateMode::Block
        );
        assert_eq!(
            "detach".parse::<ChannelUpdateMode>().unwrap(),
            ChannelUpdateMode::Detach
        );
        assert!("later".parse::<ChannelUpdateMode>().is_err());
        assert_eq!(
            "reject".parse::<MissingRoutePolicy>().unwrap(),
            MissingRoutePolicy::Reject
        );
        assert_eq!(
            "canonical-root".parse::<MissingRoutePolicy>().unwrap(),
            MissingRoutePolicy::CanonicalRoot
        );
    }

    #[test]
    fn test_channel_update_outcome_serialization() {
        let json = serde_json::to_value(ChannelUpdateOutcome::Applied {
            order_form_id: OrderFormId::new("of-1"),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "applied", "orderFormId": "of-1" })
        );
    }
}
