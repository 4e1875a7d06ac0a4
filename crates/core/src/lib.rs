//! Binding Selector Core - Shared types and binding resolution logic.
//!
//! This crate is used by both binaries:
//! - `storefront` - Shopper-facing binding selector API
//! - `admin` - Merchant binding label configuration
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access. Everything here is deterministic and can be tested
//! without a runtime. The `client` feature adds the platform HTTP client
//! builder used by both binaries.
//!
//! # Modules
//!
//! - [`types`] - Bindings, carts (order forms), alternate routes, saved labels
//! - [`filter`] - Which tenant bindings are offered to shoppers
//! - [`redirect`] - Alternate route matching and redirect URL composition
//! - `client` - Platform HTTP client with app key/token headers (`client` feature)

#![cfg_attr(not(test), forbid(unsafe_code))]

#[cfg(feature = "client")]
pub mod client;
pub mod filter;
pub mod redirect;
pub mod types;

#[cfg(feature = "client")]
pub use client::{ClientError, platform_client};
pub use filter::{filter_bindings, is_admin_binding};
pub use redirect::{RedirectError, RedirectTarget, build_redirect_url, match_route};
pub use types::*;
