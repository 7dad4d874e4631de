//! Utility modules and helper functions
//!
//! This module contains shared utilities and helper functions used across the application.

pub mod formatting;
pub mod logging;
pub mod network;
pub mod validation;

// Re-export commonly used utilities
pub use formatting::*;
pub use logging::*;
pub use network::*;
pub use validation::*;
