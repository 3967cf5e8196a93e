//! devicemon server library entry.
//!
//! This crate wires config, the device store, the metrics registry, the
//! latency injector and the HTTP handlers into the two-listener service. It
//! is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod latency;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
pub mod store;
