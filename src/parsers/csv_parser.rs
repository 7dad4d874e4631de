//! CSV parsing for the published episode sheet
//!
//! The first row is the header; columns are located by header name, never by
//! position, so the sheet owner can reorder or add columns freely. Blank
//! rows (including the `,,,` rows spreadsheets export for empty lines) are
//! skipped.

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

use crate::core::error_handling::{LoadError, LoadResult};
use crate::core::models::{Episode, ParseStats};

/// The four columns an episode is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpisodeField {
    Date,
    ArticleLink,
    StreamTitle,
    StreamLink,
}

impl EpisodeField {
    pub const ALL: [EpisodeField; 4] = [
        EpisodeField::Date,
        EpisodeField::ArticleLink,
        EpisodeField::StreamTitle,
        EpisodeField::StreamLink,
    ];

    /// Header name used by the published sheet
    pub fn column_name(self) -> &'static str {
        match self {
            EpisodeField::Date => "date",
            EpisodeField::ArticleLink => "covered_link",
            EpisodeField::StreamTitle => "stream_name",
            EpisodeField::StreamLink => "stream_link",
        }
    }
}

/// Accepted header names per field
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub date_names: Vec<String>,
    pub article_link_names: Vec<String>,
    pub stream_title_names: Vec<String>,
    pub stream_link_names: Vec<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            date_names: vec!["date".to_string()],
            article_link_names: vec![
                "covered_link".to_string(),
                "article_link".to_string(),
                "articleLink".to_string(),
            ],
            stream_title_names: vec![
                "stream_name".to_string(),
                "stream_title".to_string(),
                "streamTitle".to_string(),
            ],
            stream_link_names: vec![
                "stream_link".to_string(),
                "streamLink".to_string(),
            ],
        }
    }
}

impl FieldMapping {
    fn names(&self, field: EpisodeField) -> &[String] {
        match field {
            EpisodeField::Date => &self.date_names,
            EpisodeField::ArticleLink => &self.article_link_names,
            EpisodeField::StreamTitle => &self.stream_title_names,
            EpisodeField::StreamLink => &self.stream_link_names,
        }
    }

    /// Which field, if any, a header cell names
    pub fn field_for_header(&self, header: &str) -> Option<EpisodeField> {
        let normalized = header.trim().to_lowercase();
        EpisodeField::ALL.into_iter().find(|&field| {
            self.names(field)
                .iter()
                .any(|name| name.to_lowercase() == normalized)
        })
    }
}

/// CSV parser configuration
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub field_mapping: FieldMapping,
    /// Require all four columns and fail on unreadable rows
    pub strict_mode: bool,
    pub skip_empty_rows: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            field_mapping: FieldMapping::default(),
            strict_mode: true,
            skip_empty_rows: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    config: ParserConfig,
}

/// Parse a CSV body with the default configuration
pub fn parse_episodes(text: &str) -> LoadResult<Vec<Episode>> {
    CsvParser::new().parse(text).map(|(episodes, _)| episodes)
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a complete CSV body into episodes, in row order
    pub fn parse(&self, text: &str) -> LoadResult<(Vec<Episode>, ParseStats)> {
        let start_time = Instant::now();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        if text.trim().is_empty() {
            return Err(LoadError::parse("response body is empty"));
        }

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let headers = csv_reader.headers()?.clone();
        let columns = self.build_column_index(&headers)?;
        debug!("CSV column index: {:?}", columns);

        let mut stats = ParseStats::default();
        let mut episodes = Vec::new();

        for result in csv_reader.records() {
            stats.total_rows += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    if self.config.strict_mode {
                        return Err(e.into());
                    }
                    warn!("Skipping unreadable CSV row: {}", e);
                    stats.skipped_rows += 1;
                    continue;
                }
            };

            if self.config.skip_empty_rows && is_empty_record(&record) {
                stats.skipped_rows += 1;
                continue;
            }

            episodes.push(episode_from_record(&record, &columns));
            stats.parsed_rows += 1;
        }

        stats.parse_time_ms = start_time.elapsed().as_millis() as u64;
        debug!(
            "CSV parsed: total={}, parsed={}, skipped={}",
            stats.total_rows, stats.parsed_rows, stats.skipped_rows
        );

        Ok((episodes, stats))
    }

    fn build_column_index(&self, headers: &StringRecord) -> LoadResult<HashMap<EpisodeField, usize>> {
        let mut columns = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(field) = self.config.field_mapping.field_for_header(header) {
                columns.entry(field).or_insert(index);
            }
        }

        let missing: Vec<&str> = EpisodeField::ALL
            .into_iter()
            .filter(|field| !columns.contains_key(field))
            .map(EpisodeField::column_name)
            .collect();

        if !missing.is_empty() {
            if self.config.strict_mode || columns.is_empty() {
                return Err(LoadError::parse_at(
                    format!("missing required column(s): {}", missing.join(", ")),
                    1,
                ));
            }
            warn!("CSV header lacks column(s) {}, using empty values", missing.join(", "));
        }

        Ok(columns)
    }
}

fn is_empty_record(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn episode_from_record(record: &StringRecord, columns: &HashMap<EpisodeField, usize>) -> Episode {
    let get_field = |field: EpisodeField| -> String {
        columns
            .get(&field)
            .and_then(|&index| record.get(index))
            .unwrap_or("")
            .to_string()
    };

    Episode {
        date: get_field(EpisodeField::Date),
        article_link: get_field(EpisodeField::ArticleLink),
        stream_title: get_field(EpisodeField::StreamTitle),
        stream_link: get_field(EpisodeField::StreamLink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date,covered_link,stream_name,stream_link";

    #[test]
    fn test_row_field_mapping() {
        let csv = format!(
            "{HEADER}\n01/02/2023,https://article.example,My Stream,https://youtube.example/x\n"
        );
        let episodes = parse_episodes(&csv).unwrap();

        assert_eq!(
            episodes,
            vec![Episode::new(
                "01/02/2023",
                "https://article.example",
                "My Stream",
                "https://youtube.example/x",
            )]
        );
    }

    #[test]
    fn test_columns_looked_up_by_name() {
        let csv = "stream_link,stream_name,date,covered_link\n\
                   https://youtube.example/x,My Stream,01/02/2023,https://article.example\n";
        let episodes = parse_episodes(csv).unwrap();

        assert_eq!(episodes[0].date, "01/02/2023");
        assert_eq!(episodes[0].article_link, "https://article.example");
        assert_eq!(episodes[0].stream_title, "My Stream");
        assert_eq!(episodes[0].stream_link, "https://youtube.example/x");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = format!("notes,{HEADER},views\nfoo,01/02/2023,,Title,,42\n");
        let episodes = parse_episodes(&csv).unwrap();

        assert_eq!(episodes, vec![Episode::new("01/02/2023", "", "Title", "")]);
    }

    #[test]
    fn test_blank_lines_and_empty_rows_skipped() {
        let csv = format!(
            "{HEADER}\r\n\r\n01/01/2023,,First,\r\n,,,\r\n\r\n02/01/2023,,Second,\r\n"
        );
        let (episodes, stats) = CsvParser::new().parse(&csv).unwrap();

        let titles: Vec<&str> = episodes.iter().map(|e| e.stream_title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(stats.parsed_rows, 2);
        assert_eq!(stats.skipped_rows, 1);
    }

    #[test]
    fn test_quoted_values() {
        let csv = format!(
            "{HEADER}\n03/03/2023,\"https://a.example/?q=1,2\",\"Rust, \"\"async\"\" and\nmore\",\n"
        );
        let episodes = parse_episodes(&csv).unwrap();

        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].article_link, "https://a.example/?q=1,2");
        assert_eq!(episodes[0].stream_title, "Rust, \"async\" and\nmore");
    }

    #[test]
    fn test_values_are_not_trimmed_or_validated() {
        let csv = format!("{HEADER}\n99/99/9999, x , Padded ,\n");
        let episodes = parse_episodes(&csv).unwrap();

        assert_eq!(episodes[0].date, "99/99/9999");
        assert_eq!(episodes[0].article_link, " x ");
        assert_eq!(episodes[0].stream_title, " Padded ");
    }

    #[test]
    fn test_bom_and_header_case() {
        let csv = "\u{feff}Date, Covered_Link ,STREAM_NAME,stream_link\n01/01/2024,,Title,\n";
        let episodes = parse_episodes(csv).unwrap();

        assert_eq!(episodes[0].date, "01/01/2024");
        assert_eq!(episodes[0].stream_title, "Title");
    }

    #[test]
    fn test_short_rows_fill_missing_cells() {
        let csv = format!("{HEADER}\n01/01/2024,https://a.example\n");
        let episodes = parse_episodes(&csv).unwrap();

        assert_eq!(episodes[0].stream_title, "");
        assert_eq!(episodes[0].stream_link, "");
    }

    #[test]
    fn test_header_only_yields_no_episodes() {
        let episodes = parse_episodes(HEADER).unwrap();
        assert!(episodes.is_empty());
    }

    #[test]
    fn test_empty_body_is_parse_error() {
        let err = parse_episodes("  \n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_html_body_is_parse_error() {
        let err = parse_episodes("<!DOCTYPE html><html><body>Sign in</body></html>").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_missing_column_strict_and_lenient() {
        let csv = "date,stream_name\n01/01/2024,Title\n";

        let err = parse_episodes(csv).unwrap_err();
        assert_eq!(
            err,
            LoadError::parse_at("missing required column(s): covered_link, stream_link", 1)
        );

        let lenient = CsvParser::with_config(ParserConfig {
            strict_mode: false,
            ..ParserConfig::default()
        });
        let (episodes, _) = lenient.parse(csv).unwrap();
        assert_eq!(episodes, vec![Episode::new("01/01/2024", "", "Title", "")]);
    }

    #[test]
    fn test_field_for_header_aliases() {
        let mapping = FieldMapping::default();
        assert_eq!(mapping.field_for_header("covered_link"), Some(EpisodeField::ArticleLink));
        assert_eq!(mapping.field_for_header(" streamTitle "), Some(EpisodeField::StreamTitle));
        assert_eq!(mapping.field_for_header("views"), None);
    }
}
