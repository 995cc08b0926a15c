//! Wizi Learn client library
//!
//! In-memory API cache, toast notification store, cached fetch layer, backend client,
//! and persisted preferences. The terminal front-end in `main.rs` is built on these;
//! they are exposed here for integration tests and reuse.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod fetch;
pub mod logging;
pub mod prefs;
pub mod toast;
