//! Binding Selector Storefront library.
//!
//! Shopper-facing side of the binding selector: platform clients, the
//! selector state machine, the sales channel updater and the JSON API,
//! exposed as a library so they can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod vtex;
