//! Business logic services for admin.
//!
//! - `binding_form` - Validates and saves per-binding labels and visibility

pub mod binding_form;

pub use binding_form::{BindingFormService, BindingFormSubmission, BindingsOverview, FormError};
