//! HTTP server for the Chirpy social posting service.
//!
//! The binary in `main.rs` wires configuration, logging, metrics and the
//! database into the router built by [`api::create_router`].

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
