//! Shelf application library
//!
//! Application modules plus the bootstrap shared by the `shelf-app` binary
//! and the CLI.

pub mod app;
pub mod modules;

pub use app::{build_registry, run};
pub use modules::*;
