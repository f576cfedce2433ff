//! Nalan Jewel Storefront library.
//!
//! Server-rendered jewellery storefront backed by a hosted database, object
//! storage, and auth API. The binary in `main.rs` wires these modules into an
//! Axum server; the CLI reuses them from here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
