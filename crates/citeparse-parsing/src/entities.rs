//! Entity recognizers and institution corroboration.

use citeparse_core::{EntityCategory, EntityRecognizer, EntitySpan, RecognizerError};

/// Recognizer that never finds anything. Used when entity assistance is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecognizer;

impl EntityRecognizer for NoopRecognizer {
    fn name(&self) -> &str {
        "none"
    }

    fn analyze(&self, _text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        Ok(Vec::new())
    }
}

/// Words that close an organisation name.
const ORG_SUFFIX: &[&str] = &[
    "corporation",
    "corp",
    "inc",
    "ltd",
    "foundation",
    "agency",
    "press",
    "society",
    "association",
    "council",
    "bureau",
    "center",
    "centre",
    "department",
    "college",
    "organization",
    "organisation",
    "ministry",
    "commission",
    "academy",
];

const CONNECTORS: &[&str] = &["of", "and", "for", "the", "de", "&"];

/// Rule-based organisation finder: a capitalised run that ends in an
/// organisation suffix, e.g. "National Science Foundation".
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    pub fn new() -> Self {
        Self
    }
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn bare(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '&')
}

fn ends_clause(word: &str) -> bool {
    word.ends_with(['.', ',', ';', ':', ')', ']'])
}

impl EntityRecognizer for HeuristicRecognizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut spans = Vec::new();

        for (i, word) in words.iter().enumerate() {
            let suffix = bare(word).to_lowercase();
            if !is_capitalized(word) || !ORG_SUFFIX.contains(&suffix.as_str()) {
                continue;
            }

            let mut start = i;
            while start > 0 {
                let prev = words[start - 1];
                if ends_clause(prev) {
                    break;
                }
                if is_capitalized(prev) || CONNECTORS.contains(&prev.to_lowercase().as_str()) {
                    start -= 1;
                } else {
                    break;
                }
            }
            while start < i && CONNECTORS.contains(&words[start].to_lowercase().as_str()) {
                start += 1;
            }
            if start == i {
                continue;
            }

            let name = words[start..=i].join(" ");
            let name = name.trim_end_matches(|c: char| !c.is_alphanumeric());
            spans.push(EntitySpan::new(name, EntityCategory::Organization));
        }

        Ok(spans)
    }
}

/// Ask the recognizer for the first organisation in `line`.
///
/// Failures and empty results leave the institution blank; they never
/// propagate to the caller.
pub fn corroborate_institution(recognizer: &dyn EntityRecognizer, line: &str) -> Option<String> {
    match recognizer.analyze(line) {
        Ok(spans) => {
            let org = spans
                .into_iter()
                .find(|s| s.category == EntityCategory::Organization)
                .map(|s| s.text);
            if org.is_none() {
                tracing::debug!(recognizer = recognizer.name(), "no organization span found");
            }
            org
        }
        Err(e) => {
            tracing::warn!(recognizer = recognizer.name(), error = %e, "entity recognizer failed");
            None
        }
    }
}
