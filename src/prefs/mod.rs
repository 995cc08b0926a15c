//! Persisted user preferences
//!
//! Small key/value settings (last opened tab, display choices) stored as JSON files in
//! the platform config directory so they survive restarts.

mod store;

pub use store::{PreferenceStore, PrefsError};
