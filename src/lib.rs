//! Shelf application library
//!
//! The `books` and `users` modules plus the [`app::Application`] bootstrap
//! that wires them to the document store and the HTTP server.

pub mod app;
pub mod modules;

pub use app::Application;
