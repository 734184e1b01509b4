//! Gridwatch application library
//!
//! Resource modules (books, device activities, usage stats, health) and the bootstrap
//! that wires them into the HTTP server.

pub mod app;
pub mod modules;
pub mod utils;

pub use app::{build_registry, registry_with_store, run};
