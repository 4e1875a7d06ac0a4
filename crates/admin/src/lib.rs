//! Binding Selector Admin library.
//!
//! Merchant-facing side of the binding selector: reads the tenant's
//! bindings and saves per-binding labels and visibility to `PostgreSQL`.
//!
//! # Security
//!
//! This crate holds the admin database credentials. Deploy it on private
//! infrastructure only; it has no authentication of its own.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod tenant;
