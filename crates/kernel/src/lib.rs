//! Core traits, settings, and the module registry.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
pub use shelf_db::{IndexDefinition, Migration};
