//! Request handlers and the instrumentation middleware wrapped around them.

pub mod devices;
pub mod instrument;
