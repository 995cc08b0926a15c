//! Command-line interface parsing for the Wizi Learn client
//!
//! This module handles parsing of CLI arguments using clap, with environment variable
//! fallbacks, and turns them into the `Settings` the application starts from.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::catalog::Tab;

/// Backend used when neither `--api-url` nor `WIZI_API_URL` is given
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified tab name is not recognized
    #[error("Invalid tab: '{0}'. Valid tabs: categories, formations, classement")]
    InvalidTab(String),

    /// The API URL is not an http(s) URL
    #[error("Invalid API URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidApiUrl(String),
}

/// Wizi Learn - browse formations and follow notifications from the terminal
#[derive(Parser, Debug)]
#[command(name = "wizi")]
#[command(about = "Wizi Learn catalogue and notifications in the terminal")]
#[command(version)]
pub struct Cli {
    /// Base URL of the Wizi Learn backend
    #[arg(long, env = "WIZI_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Bearer token sent with every API request
    #[arg(long, env = "WIZI_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// How long toasts stay on screen, in milliseconds (0 keeps them until dismissed)
    #[arg(long, env = "WIZI_TOAST_DURATION_MS", default_value_t = 3000)]
    pub toast_duration_ms: u64,

    /// Share one request between concurrent loads of the same list
    #[arg(long)]
    pub single_flight: bool,

    /// Write logs to this file instead of the default cache location
    #[arg(long, env = "WIZI_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Open on this tab instead of the last one used
    ///
    /// Valid tabs: categories, formations, classement
    #[arg(long, value_name = "TAB")]
    pub tab: Option<String>,
}

/// Validated configuration for application startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub toast_duration: Duration,
    pub single_flight: bool,
    pub log_file: Option<PathBuf>,
    /// Tab requested on the command line, overriding the saved preference
    pub initial_tab: Option<Tab>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            toast_duration: Duration::from_millis(3000),
            single_flight: false,
            log_file: None,
            initial_tab: None,
        }
    }
}

/// Parses a tab argument into a `Tab`
pub fn parse_tab_arg(s: &str) -> Result<Tab, CliError> {
    Tab::from_str(s).ok_or_else(|| CliError::InvalidTab(s.to_string()))
}

impl Settings {
    /// Creates `Settings` from parsed CLI arguments
    ///
    /// # Returns
    /// * `Ok(Settings)` with validated values
    /// * `Err(CliError)` if the tab or the API URL is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_url = cli.api_url.trim().to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(CliError::InvalidApiUrl(cli.api_url.clone()));
        }

        let initial_tab = cli.tab.as_deref().map(parse_tab_arg).transpose()?;

        Ok(Settings {
            api_url,
            token: cli.token.clone().filter(|t| !t.is_empty()),
            toast_duration: Duration::from_millis(cli.toast_duration_ms),
            single_flight: cli.single_flight,
            log_file: cli.log_file.clone(),
            initial_tab,
        })
    }
}
