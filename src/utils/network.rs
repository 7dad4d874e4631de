//! Network utilities and helpers

use reqwest::Client;
use std::time::Duration;

use crate::core::config::SourceConfig;
use crate::core::error_handling::LoadError;

/// Get user agent string
pub fn get_user_agent() -> &'static str {
    concat!("EpisodeFinder/", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client used to fetch the dataset
pub fn build_client(config: &SourceConfig) -> Result<Client, LoadError> {
    if config.timeout_seconds == 0 {
        return Err(LoadError::configuration("Timeout must be at least 1 second"));
    }

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| LoadError::configuration(format!("Failed to build HTTP client: {e}")))
}
