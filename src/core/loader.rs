//! Dataset loading
//!
//! One call fetches the published sheet, reads the whole body and parses it.
//! There is no retry, no caching and no partial result: the call yields the
//! complete episode list or a [`LoadError`]. Caching and request
//! de-duplication live in [`crate::core::cache`].

use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, error, info};

use super::config::SourceConfig;
use super::error_handling::{LoadError, LoadResult};
use super::models::Episode;
use crate::parsers::csv_parser::CsvParser;
use crate::utils::network::build_client;
use crate::utils::validation::is_http_url;

/// Anything that can produce the full episode list
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    async fn load(&self) -> LoadResult<Vec<Episode>>;
}

/// Loads episodes from the published CSV endpoint
#[derive(Debug, Clone)]
pub struct HttpEpisodeLoader {
    client: Client,
    url: String,
    parser: CsvParser,
}

impl HttpEpisodeLoader {
    pub fn new(config: &SourceConfig) -> LoadResult<Self> {
        if !is_http_url(&config.url) {
            return Err(LoadError::configuration(format!(
                "Source URL must be an http(s) URL: {}",
                config.url
            )));
        }

        Ok(Self {
            client: build_client(config)?,
            url: config.url.clone(),
            parser: CsvParser::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_body(&self) -> LoadResult<String> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl EpisodeSource for HttpEpisodeLoader {
    async fn load(&self) -> LoadResult<Vec<Episode>> {
        let start_time = Instant::now();
        info!("Fetching episodes from {}", self.url);

        let result = match self.fetch_body().await {
            Ok(body) => {
                debug!("Received {} bytes", body.len());
                self.parser.parse(&body).map(|(episodes, _)| episodes)
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(episodes) => info!(
                "Loaded {} episodes in {}ms",
                episodes.len(),
                start_time.elapsed().as_millis()
            ),
            Err(e) => error!("Failed to load episodes ({:?}): {}", e.category(), e),
        }

        result
    }
}

/// Serves episodes from CSV text held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticEpisodeSource {
    csv: String,
    parser: CsvParser,
}

impl StaticEpisodeSource {
    pub fn new(csv: impl Into<String>) -> Self {
        Self {
            csv: csv.into(),
            parser: CsvParser::new(),
        }
    }
}

#[async_trait]
impl EpisodeSource for StaticEpisodeSource {
    async fn load(&self) -> LoadResult<Vec<Episode>> {
        self.parser.parse(&self.csv).map(|(episodes, _)| episodes)
    }
}
