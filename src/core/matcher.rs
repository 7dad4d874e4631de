//! Fuzzy episode search
//!
//! A query is split on whitespace and every token narrows the candidate pool
//! left by the previous one (AND semantics). Within a pass, a token matches a
//! field when the best edit distance between the token and *any* substring of
//! the field, relative to the token length, is within the threshold. Where in
//! the field the hit occurs does not matter.
//!
//! Scores are "lower is better":
//! - field score: `errors / token_len`, floored at `0.001`; a field equal to
//!   the token scores `f64::EPSILON`
//! - record score: product over matched fields of
//!   `field_score ^ (weight * norm)` with `weight = 1 / keys` and
//!   `norm = 1 / sqrt(words in field)` rounded to three decimals, so short
//!   fields that match count for more than long ones

use std::sync::Arc;

use super::models::Episode;

/// Floor for non-exact field scores
const MIN_FIELD_SCORE: f64 = 0.001;

/// Episode fields a query is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SearchKey {
    StreamTitle,
    ArticleLink,
    Date,
}

impl SearchKey {
    fn value(self, episode: &Episode) -> &str {
        match self {
            SearchKey::StreamTitle => &episode.stream_title,
            SearchKey::ArticleLink => &episode.article_link,
            SearchKey::Date => &episode.date,
        }
    }
}

/// Matching configuration. Only the default is reachable from outside the
/// crate; other settings exist for tests.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FuzzyConfig {
    /// Highest accepted `errors / token_len`
    pub threshold: f64,
    pub keys: Vec<SearchKey>,
    pub case_sensitive: bool,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            keys: vec![SearchKey::StreamTitle, SearchKey::ArticleLink, SearchKey::Date],
            case_sensitive: false,
        }
    }
}

/// One searchable field, prepared once per dataset
#[derive(Debug, Clone)]
struct PreparedField {
    chars: Vec<char>,
    norm: f64,
}

impl PreparedField {
    fn new(value: &str, case_sensitive: bool) -> Option<Self> {
        if value.trim().is_empty() {
            return None;
        }
        let text = if case_sensitive {
            value.to_string()
        } else {
            value.to_lowercase()
        };
        Some(Self {
            chars: text.chars().collect(),
            norm: field_norm(value),
        })
    }
}

/// Search structures for one dataset, reusable across queries
#[derive(Debug, Clone)]
pub struct EpisodeIndex {
    episodes: Arc<[Episode]>,
    /// `fields[record][key]`, `None` for blank values
    fields: Vec<Vec<Option<PreparedField>>>,
    config: FuzzyConfig,
}

impl EpisodeIndex {
    pub fn new(episodes: impl Into<Arc<[Episode]>>) -> Self {
        Self::with_config(episodes, FuzzyConfig::default())
    }

    pub(crate) fn with_config(episodes: impl Into<Arc<[Episode]>>, config: FuzzyConfig) -> Self {
        let episodes = episodes.into();
        let fields = episodes
            .iter()
            .map(|episode| {
                config
                    .keys
                    .iter()
                    .map(|key| PreparedField::new(key.value(episode), config.case_sensitive))
                    .collect()
            })
            .collect();

        Self {
            episodes,
            fields,
            config,
        }
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Positions of matching episodes, best match first
    pub fn search_positions(&self, query: &str) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..self.episodes.len()).collect();

        for token in query.split_whitespace() {
            if pool.is_empty() {
                break;
            }
            let token: Vec<char> = if self.config.case_sensitive {
                token.chars().collect()
            } else {
                token.to_lowercase().chars().collect()
            };
            pool = self.narrow(&pool, &token);
        }

        pool
    }

    /// Matching episodes, best match first; every episode when the query is blank
    pub fn search(&self, query: &str) -> Vec<Episode> {
        if query.trim().is_empty() {
            return self.episodes.to_vec();
        }
        self.search_positions(query)
            .into_iter()
            .map(|position| self.episodes[position].clone())
            .collect()
    }

    /// One token pass over the pool, stable-sorted by score
    fn narrow(&self, pool: &[usize], token: &[char]) -> Vec<usize> {
        let mut scored: Vec<(usize, f64)> = pool
            .iter()
            .filter_map(|&position| {
                self.record_score(position, token)
                    .map(|score| (position, score))
            })
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.into_iter().map(|(position, _)| position).collect()
    }

    fn record_score(&self, position: usize, token: &[char]) -> Option<f64> {
        let weight = 1.0 / self.config.keys.len() as f64;
        let mut matched = false;
        let mut total = 1.0;

        for field in self.fields[position].iter().flatten() {
            if let Some(score) = field_score(token, &field.chars, self.config.threshold) {
                matched = true;
                total *= score.powf(weight * field.norm);
            }
        }

        matched.then_some(total)
    }
}

/// Filter `records` by `query`.
///
/// Blank queries return the input unchanged. Builds a throwaway
/// [`EpisodeIndex`]; keep an index around when searching the same dataset
/// repeatedly.
pub fn search(records: &[Episode], query: &str) -> Vec<Episode> {
    if query.trim().is_empty() || records.is_empty() {
        return records.to_vec();
    }
    EpisodeIndex::new(records).search(query)
}

/// Score of `token` against one field, `None` when it does not match
fn field_score(token: &[char], text: &[char], threshold: f64) -> Option<f64> {
    if token.is_empty() {
        return None;
    }
    if token == text {
        return Some(f64::EPSILON);
    }

    let errors = best_edit_distance(token, text);
    let score = errors as f64 / token.len() as f64;
    if score <= threshold {
        Some(score.max(MIN_FIELD_SCORE))
    } else {
        None
    }
}

/// Smallest Levenshtein distance between `pattern` and any substring of `text`
fn best_edit_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    let mut column: Vec<usize> = (0..=m).collect();
    let mut best = m;

    for &tc in text {
        let mut diagonal = column[0];
        column[0] = 0;
        for i in 1..=m {
            let left = column[i];
            let substitution = diagonal + usize::from(pattern[i - 1] != tc);
            column[i] = substitution.min(left + 1).min(column[i - 1] + 1);
            diagonal = left;
        }
        best = best.min(column[m]);
        if best == 0 {
            break;
        }
    }

    best
}

/// `1 / sqrt(word count)`, rounded to three decimals
fn field_norm(value: &str) -> f64 {
    let words = value.split(' ').filter(|word| !word.is_empty()).count().max(1);
    let norm = 1.0 / (words as f64).sqrt();
    (norm * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_best_edit_distance() {
        assert_eq!(best_edit_distance(&chars("dev"), &chars("weekly dev stream")), 0);
        assert_eq!(best_edit_distance(&chars("strem"), &chars("weekly dev stream")), 1);
        assert_eq!(best_edit_distance(&chars("stram"), &chars("stream")), 1);
        assert_eq!(best_edit_distance(&chars("abc"), &chars("")), 3);
        assert_eq!(best_edit_distance(&chars("abc"), &chars("xyz")), 3);
    }

    #[test]
    fn test_field_score_threshold() {
        // one error in five chars sits exactly on the 0.2 boundary
        assert_eq!(field_score(&chars("strem"), &chars("dev stream"), 0.2), Some(0.2));
        // one error in three chars does not
        assert_eq!(field_score(&chars("dev"), &chars("dex stream"), 0.2), None);
        assert_eq!(
            field_score(&chars("dev"), &chars("weekly dev"), 0.2),
            Some(MIN_FIELD_SCORE)
        );
        assert_eq!(field_score(&chars("dev"), &chars("dev"), 0.2), Some(f64::EPSILON));
    }

    #[test]
    fn test_field_norm() {
        assert_eq!(field_norm("single"), 1.0);
        assert_eq!(field_norm("two words"), 0.707);
        assert_eq!(field_norm("  spaced   out  words "), 0.577);
    }

    #[test]
    fn test_blank_fields_never_match() {
        let index = EpisodeIndex::new(vec![Episode::new("", "", "", "")]);
        assert!(index.search_positions("a").is_empty());
    }
}
