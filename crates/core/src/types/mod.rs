//! Core types for the binding selector.
//!
//! This module provides type-safe wrappers for platform identifiers and the
//! data shapes exchanged with the commerce platform.

pub mod binding;
pub mod id;
pub mod order_form;

pub use binding::{
    AlternateRoute, Binding, BindingsSaved, FilteredBinding, PageContext, TranslatedLocale,
};
pub use id::*;
pub use order_form::{ClientPreferencesData, OrderForm, OrderFormItem};
