//! Pattern matching and candidate selection.
//!
//! Every pattern in the library is tried against the full line. Each match
//! becomes a [`MatchCandidate`] scored by how many slots it filled; the
//! candidate with the strictly highest score wins and ties go to the pattern
//! listed first.

use citeparse_core::Field;

use crate::patterns::{CitationPattern, PatternLibrary};
use crate::text_processing::clean_value;

/// One pattern's match against a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub pattern: String,
    /// Position of the pattern in the library (0 = highest priority).
    pub priority: usize,
    /// Non-blank slot values in capture-group order.
    pub values: Vec<(Field, String)>,
    /// Completeness score: number of non-blank slots.
    pub score: usize,
}

impl MatchCandidate {
    pub fn value(&self, field: Field) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }
}

/// Match a single pattern. Returns `None` if the pattern does not match.
pub fn match_pattern(
    pattern: &CitationPattern,
    priority: usize,
    line: &str,
) -> Option<MatchCandidate> {
    let caps = pattern.regex().captures(line)?;

    let values: Vec<(Field, String)> = pattern
        .slots()
        .iter()
        .filter_map(|field| {
            let raw = caps.name(field.as_str())?.as_str();
            let value = match field {
                // URLs are kept verbatim
                Field::Doi => Some(raw.trim().to_string()).filter(|v| !v.is_empty()),
                _ => clean_value(raw),
            };
            value.map(|v| (*field, v))
        })
        .collect();

    let score = values.len();
    tracing::trace!(pattern = pattern.name(), score, "pattern matched");

    Some(MatchCandidate {
        pattern: pattern.name().to_string(),
        priority,
        values,
        score,
    })
}

/// Try every pattern in library order.
pub fn match_all(library: &PatternLibrary, line: &str) -> Vec<MatchCandidate> {
    library
        .iter()
        .enumerate()
        .filter_map(|(priority, pattern)| {
            let candidate = match_pattern(pattern, priority, line);
            if candidate.is_none() {
                tracing::trace!(pattern = pattern.name(), "pattern did not match");
            }
            candidate
        })
        .collect()
}

/// Pick the best candidate.
///
/// Candidates below `min_score` are discarded. Among the rest the strictly
/// highest score wins; on equal scores the earlier (lower priority index)
/// candidate is kept.
pub fn select_best(candidates: Vec<MatchCandidate>, min_score: usize) -> Option<MatchCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.score >= min_score)
        .fold(None, |best: Option<MatchCandidate>, c| match best {
            Some(b) if b.score > c.score || (b.score == c.score && b.priority <= c.priority) => {
                Some(b)
            }
            _ => Some(c),
        })
}
