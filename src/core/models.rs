//! Core data models for the episode finder

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error_handling::LoadError;

/// One row of the published episode sheet

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Raw `DD/MM/YYYY` date as delivered; not validated
    pub date: String,

    pub article_link: String,

    pub stream_title: String,

    pub stream_link: String,
}

impl Episode {
    pub fn new(
        date: impl Into<String>,
        article_link: impl Into<String>,
        stream_title: impl Into<String>,
        stream_link: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            article_link: article_link.into(),
            stream_title: stream_title.into(),
            stream_link: stream_link.into(),
        }
    }
}

/// Lifecycle of the loaded dataset

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,

    Loaded(Arc<[Episode]>),

    Failed(LoadError),
}

impl LoadState {
    pub fn from_result(result: Result<Vec<Episode>, LoadError>) -> Self {
        match result {
            Ok(episodes) => Self::Loaded(episodes.into()),
            Err(err) => Self::Failed(err),
        }
    }

    pub fn episodes(&self) -> Option<&[Episode]> {
        match self {
            Self::Loaded(episodes) => Some(episodes),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Everything a presentation layer needs to render the finder

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinderView {
    /// `None` while loading or after a failed load
    pub episodes: Option<Vec<Episode>>,

    pub is_loading: bool,

    pub error: Option<LoadError>,

    pub search_term: String,

    pub search_results: Vec<Episode>,
}

/// Parse statistics reported by the CSV parser

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data rows seen after the header
    pub total_rows: usize,

    pub parsed_rows: usize,

    /// Blank rows and (in lenient mode) unreadable rows
    pub skipped_rows: usize,

    pub parse_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_serializes_with_contract_names() {
        let episode = Episode::new(
            "01/02/2023",
            "https://article.example",
            "My Stream",
            "https://youtube.example/x",
        );
        let json = serde_json::to_value(&episode).unwrap();

        assert_eq!(json["date"], "01/02/2023");
        assert_eq!(json["articleLink"], "https://article.example");
        assert_eq!(json["streamTitle"], "My Stream");
        assert_eq!(json["streamLink"], "https://youtube.example/x");
    }

    #[test]
    fn test_load_state_accessors() {
        let loading = LoadState::Loading;
        assert!(loading.is_loading());
        assert!(loading.episodes().is_none());
        assert!(loading.error().is_none());

        let loaded = LoadState::from_result(Ok(vec![Episode::default()]));
        assert!(!loaded.is_loading());
        assert_eq!(loaded.episodes().map(|e| e.len()), Some(1));

        let failed = LoadState::from_result(Err(LoadError::Http { status: 500 }));
        assert!(failed.episodes().is_none());
        assert_eq!(failed.error(), Some(&LoadError::Http { status: 500 }));
    }
}
