//! Core building blocks shared by every shelf crate: the module contract,
//! the lifecycle registry and layered settings.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
