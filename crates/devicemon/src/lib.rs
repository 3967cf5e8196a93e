//! Top-level facade crate for devicemon.
//!
//! Re-exports the core model and the server library so users can depend on a single crate.

pub mod core {
    pub use devicemon_core::*;
}

pub mod server {
    pub use devicemon_server::*;
}
