use std::sync::Arc;

use citeparse_core::{EntityRecognizer, EntitySpan, Field, ParsedReference, PublicationType};

use crate::config::{FallbackPolicy, ParsingConfig};
use crate::entities::{corroborate_institution, NoopRecognizer};
use crate::scoring::{self, MatchCandidate};
use crate::{batch, fallback, fields, ParsingError};

/// A configurable citation parser.
///
/// Holds a [`ParsingConfig`] and an injected entity recognizer. The default
/// constructor uses built-in patterns and no entity assistance; use
/// [`ReferenceParser::with_config`] and [`ReferenceParser::with_recognizer`]
/// to change either.
///
/// Parsing never fails: a line nothing recognises still produces a record
/// holding its original string.
#[derive(Clone)]
pub struct ReferenceParser {
    config: ParsingConfig,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReferenceParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceParser")
            .field("config", &self.config)
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

impl ReferenceParser {
    /// Create a parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParsingConfig::default())
    }

    /// Create a parser with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self {
            config,
            recognizer: Arc::new(NoopRecognizer),
        }
    }

    /// Replace the entity recognizer consulted for institutions.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn recognizer(&self) -> &dyn EntityRecognizer {
        self.recognizer.as_ref()
    }

    /// Run every pattern against `line` and return all matches, best-first
    /// selection not applied.
    pub fn match_patterns(&self, line: &str) -> Vec<MatchCandidate> {
        scoring::match_all(self.config.library(), line.trim())
    }

    /// Parse a single citation string.
    pub fn parse_line(&self, line: &str) -> ParsedReference {
        let line = line.trim();
        let mut record = ParsedReference::blank(line);
        let policy = self.config.fallback_policy;

        let matched = if policy == FallbackPolicy::HeuristicOnly {
            false
        } else {
            let candidates = scoring::match_all(self.config.library(), line);
            match scoring::select_best(candidates, self.config.min_pattern_score) {
                Some(best) => {
                    tracing::debug!(pattern = %best.pattern, score = best.score, "pattern selected");
                    apply_candidate(&mut record, &best);
                    true
                }
                None => {
                    tracing::debug!("no pattern matched");
                    false
                }
            }
        };

        if policy != FallbackPolicy::OnNoMatch || !matched {
            let before = record.filled_count();
            fallback::fill_blanks(&mut record, fallback::extract_heuristic(line));
            tracing::trace!(filled = record.filled_count() - before, "fallback filled blanks");
        }

        if record.institution.is_none() {
            if let Some(org) = corroborate_institution(self.recognizer.as_ref(), line) {
                let inside_other_field = [&record.title, &record.journal, &record.book_title]
                    .into_iter()
                    .flatten()
                    .any(|text| text.contains(org.as_str()));
                if !inside_other_field {
                    record.institution = Some(org);
                }
            }
        }

        record.authors.truncate(self.config.max_authors);
        record
    }

    /// Parse a multi-line blob into one record per citation, in order.
    pub fn parse_batch(&self, blob: &str) -> Vec<ParsedReference> {
        let records: Vec<ParsedReference> = batch::split_references(blob, self.config.split_mode)
            .iter()
            .map(|line| self.parse_line(line))
            .collect();

        let matched = records.iter().filter(|r| r.matched_pattern.is_some()).count();
        tracing::info!(
            total = records.len(),
            matched,
            "parsed reference batch"
        );
        records
    }

    /// Raw recognizer output for `text`, with failures surfaced.
    pub fn analyze_entities(&self, text: &str) -> Result<Vec<EntitySpan>, ParsingError> {
        Ok(self.recognizer.analyze(text)?)
    }
}

/// Copy a winning candidate's slot values into the record.
fn apply_candidate(record: &mut ParsedReference, candidate: &MatchCandidate) {
    for (field, value) in &candidate.values {
        let value = value.clone();
        match field {
            Field::Authors => record.authors = split_authors(&value),
            Field::Year => record.year = Some(value),
            Field::Title => record.title = Some(value),
            Field::Journal => record.journal = Some(value),
            Field::BookTitle => record.book_title = Some(value),
            Field::Volume => record.volume = Some(value),
            Field::Issue => record.issue = Some(value),
            Field::Pages => record.pages = Some(value),
            Field::Doi => record.doi = Some(value),
            Field::Editor => record.editor = Some(value),
            Field::Institution => record.institution = Some(value),
            Field::PublicationType => {
                record.publication_type = PublicationType::from_phrase(&value)
            }
        }
    }
    record.matched_pattern = Some(candidate.pattern.clone());
}

/// Individual "Surname, I." tokens, or the whole span as one entry.
fn split_authors(span: &str) -> Vec<String> {
    let tokens = fields::extract_authors(span);
    if tokens.is_empty() {
        vec![span.trim().to_string()]
    } else {
        tokens
    }
}
