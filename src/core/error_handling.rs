//! Load error taxonomy
//!
//! Every failure on the way from the remote sheet to a parsed episode list
//! collapses into [`LoadError`]. Callers only need to know that loading
//! failed; the variant and [`ErrorCategory`] exist for logs and diagnostics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error categories used in log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Request could not be issued or the connection failed (DNS, TLS, timeout)
    Network,
    /// Server answered with a non-success status
    Protocol,
    /// Body could not be read as CSV with the expected header shape
    Parsing,
    /// Invalid loader settings (bad URL, zero timeout)
    Configuration,
}

/// A failed dataset load
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LoadError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP error: server responded with status {status}")]
    Http { status: u16 },

    #[error("Parsing error: {message}{}", row_suffix(.row))]
    Parse { message: String, row: Option<usize> },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" (row {row})"),
        None => String::new(),
    }
}

impl LoadError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            row: None,
        }
    }

    pub fn parse_at(message: impl Into<String>, row: usize) -> Self {
        Self::Parse {
            message: message.into(),
            row: Some(row),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network { .. } => ErrorCategory::Network,
            Self::Http { .. } => ErrorCategory::Protocol,
            Self::Parse { .. } => ErrorCategory::Parsing,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
            },
            None if err.is_builder() => Self::configuration(err.to_string()),
            None => Self::network(err.to_string()),
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        let row = err
            .position()
            .map(|position| position.line() as usize);
        Self::Parse {
            message: err.to_string(),
            row,
        }
    }
}

/// Result type alias for loader operations
pub type LoadResult<T> = Result<T, LoadError>;
