//! Document store access for shelf.
//!
//! Modules talk to a [`Store`] through the [`Repository`] trait. Two backends
//! exist: MongoDB for deployments and an in-process store that behaves the
//! same way for tests and local runs.

pub mod document;
pub mod error;
pub mod id;
pub mod memory;
pub mod migrate;
pub mod mongo;
pub mod repository;
pub mod settings;
pub mod store;

pub use document::Document;
pub use error::{DbError, DbResult};
pub use migrate::{IndexDefinition, Migration};
pub use mongodb::bson;
pub use repository::Repository;
pub use settings::{DatabaseBackend, DatabaseSettings};
pub use store::Store;
