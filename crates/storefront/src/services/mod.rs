//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `selector` - Binding selector state machine
//! - `sales_channel` - Moves a cart between sales channels
//! - `backend` - Platform-backed implementation of the selector's data source

pub mod backend;
pub mod sales_channel;
pub mod selector;

pub use backend::VtexSelectorBackend;
pub use sales_channel::{CheckoutApi, SalesChannelUpdater};
pub use selector::{
    BindingSelector, ChannelUpdateMode, ChannelUpdateOutcome, MissingRoutePolicy, Navigation,
    SelectorBackend, SelectorContext, SelectorError, SelectorOptions, SelectorPhase, SelectorView,
};
