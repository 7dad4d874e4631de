//! Query state for a finder front end
//!
//! Holds the current search term and the latest load outcome. Results are
//! never stored: [`QueryController::search_results`] recomputes them from the
//! current dataset and term on every call.

use tracing::{debug, info, warn};

use super::error_handling::LoadError;
use super::loader::EpisodeSource;
use super::matcher::EpisodeIndex;
use super::models::{Episode, FinderView, LoadState};

#[derive(Debug, Clone)]
pub struct QueryController {
    search_term: String,
    state: LoadState,
    /// Built when a dataset arrives; `None` unless `state` is `Loaded`
    index: Option<EpisodeIndex>,
}

impl Default for QueryController {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryController {
    /// A controller waiting for its first load
    pub fn new() -> Self {
        Self {
            search_term: String::new(),
            state: LoadState::Loading,
            index: None,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        debug!("Search term set to {:?}", self.search_term);
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Mark a (re)load as in flight. Any previous dataset is dropped.
    pub fn begin_loading(&mut self) {
        self.state = LoadState::Loading;
        self.index = None;
    }

    /// Replace the dataset wholesale with a load outcome
    pub fn apply_load_result(&mut self, result: Result<Vec<Episode>, LoadError>) {
        self.state = LoadState::from_result(result);
        self.index = match &self.state {
            LoadState::Loaded(episodes) => Some(EpisodeIndex::new(episodes.clone())),
            _ => None,
        };

        match &self.state {
            LoadState::Loaded(episodes) => info!("Loaded {} episodes", episodes.len()),
            LoadState::Failed(err) => warn!("Episode load failed: {}", err),
            LoadState::Loading => {}
        }
    }

    /// Load from `source`, replacing whatever was there
    pub async fn refresh<S: EpisodeSource + ?Sized>(&mut self, source: &S) {
        self.begin_loading();
        let result = source.load().await;
        self.apply_load_result(result);
    }

    pub fn episodes(&self) -> Option<&[Episode]> {
        self.state.episodes()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.state.error()
    }

    /// Episodes to display for the current term
    pub fn search_results(&self) -> Vec<Episode> {
        match &self.index {
            Some(index) => index.search(&self.search_term),
            None => Vec::new(),
        }
    }

    /// Snapshot of everything a presentation layer renders
    pub fn view(&self) -> FinderView {
        FinderView {
            episodes: self.episodes().map(<[Episode]>::to_vec),
            is_loading: self.is_loading(),
            error: self.error().cloned(),
            search_term: self.search_term.clone(),
            search_results: self.search_results(),
        }
    }
}
