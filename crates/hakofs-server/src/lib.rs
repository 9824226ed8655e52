//! hakofs server library
//!
//! Mounts a [`hakofs_kernel::Tree`] through FUSE. The dispatch logic lives in
//! [`bridge`] and does not depend on `fuser`; the [`fuse`] module adapts it to
//! the kernel protocol and is only built with the `fuse` feature.

pub mod bridge;
pub mod config;
pub mod constants;
pub mod errno;
#[cfg(feature = "fuse")]
pub mod fuse;
pub mod logging;

pub use bridge::{Bridge, ListingRow};
pub use config::{Args, ServerConfig};
#[cfg(feature = "fuse")]
pub use fuse::{HakoFs, mount, mount_options};
