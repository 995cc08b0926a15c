//! UI rendering module for the Wizi Learn client
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod catalog;
pub mod help_overlay;
pub mod toasts;

pub use catalog::render as render_catalog;
pub use help_overlay::render as render_help_overlay;
pub use toasts::render as render_toasts;
