//! devicemon core: the device model and the error surface shared by the
//! server and facade crates.
//!
//! This crate carries no HTTP or runtime dependencies so the model can be
//! reused by tooling and tests without pulling in a server stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `DeviceMonError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod device;
pub mod error;

pub use device::Device;
/// Shared result type.
pub use error::{DeviceMonError, Result};
