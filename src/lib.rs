//! Episode Finder - Core Library
//!
//! Fetches the published stream episode sheet as CSV, parses it into
//! [`Episode`] records and filters them with a multi-token fuzzy search.

pub mod core;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    cache::{CacheEntry, DatasetCache, EPISODES_KEY},
    config::{AppConfig, CacheConfig, LoggingConfig, SourceConfig, SHEET_URL},
    controller::QueryController,
    error_handling::{ErrorCategory, LoadError, LoadResult},
    loader::{EpisodeSource, HttpEpisodeLoader, StaticEpisodeSource},
    matcher::{search, EpisodeIndex},
    models::{Episode, FinderView, LoadState, ParseStats},
};

pub use parsers::csv_parser::parse_episodes;
pub use utils::formatting::format_episode_date;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    utils::logging::init_tracing("info");

    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}
