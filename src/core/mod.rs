//! Core business logic module
//!
//! This module contains the domain models, the dataset loader and cache,
//! and the search pipeline for the episode finder.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error_handling;
pub mod loader;
pub mod matcher;
pub mod models;



// Re-export commonly used types
pub use config::AppConfig;
pub use controller::QueryController;
