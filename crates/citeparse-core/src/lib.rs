use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod config_file;
pub mod entity;

// Re-export for convenience
pub use entity::{EntityCategory, EntityRecognizer, EntitySpan, RecognizerError};

/// Kind of non-journal publication recognised from a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicationType {
    TechnicalReport,
    WorkingPaper,
    Thesis,
    Dissertation,
    #[default]
    Unknown,
}

impl PublicationType {
    /// Map a matched vocabulary phrase ("Technical report", "thesis", ...) to its type.
    ///
    /// Case and inner whitespace are ignored. Anything outside the vocabulary is `Unknown`.
    pub fn from_phrase(phrase: &str) -> Self {
        let normalized = phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "technical report" => PublicationType::TechnicalReport,
            "working paper" => PublicationType::WorkingPaper,
            "thesis" => PublicationType::Thesis,
            "dissertation" => PublicationType::Dissertation,
            _ => PublicationType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationType::TechnicalReport => "technical-report",
            PublicationType::WorkingPaper => "working-paper",
            PublicationType::Thesis => "thesis",
            PublicationType::Dissertation => "dissertation",
            PublicationType::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != PublicationType::Unknown
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationType {
    type Err = std::convert::Infallible;

    /// Accepts both the kebab-case identifiers and the natural phrases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "technical-report" => PublicationType::TechnicalReport,
            "working-paper" => PublicationType::WorkingPaper,
            other => PublicationType::from_phrase(other),
        })
    }
}

/// A named bibliographic field. Doubles as the slot name in citation patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Authors,
    Year,
    Title,
    Journal,
    BookTitle,
    Volume,
    Issue,
    Pages,
    Doi,
    Editor,
    Institution,
    PublicationType,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Authors,
        Field::Year,
        Field::Title,
        Field::Journal,
        Field::BookTitle,
        Field::Volume,
        Field::Issue,
        Field::Pages,
        Field::Doi,
        Field::Editor,
        Field::Institution,
        Field::PublicationType,
    ];

    /// Snake-case name, also used as the regex capture-group name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Authors => "authors",
            Field::Year => "year",
            Field::Title => "title",
            Field::Journal => "journal",
            Field::BookTitle => "book_title",
            Field::Volume => "volume",
            Field::Issue => "issue",
            Field::Pages => "pages",
            Field::Doi => "doi",
            Field::Editor => "editor",
            Field::Institution => "institution",
            Field::PublicationType => "publication_type",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields recovered from one citation string.
///
/// Every field is always present: `None` is the explicit blank marker and
/// serializes as `null`, so JSON consumers see the full key set on every record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReference {
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub book_title: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    /// Full URL as it appeared in the citation, not a bare identifier.
    pub doi: Option<String>,
    pub editor: Option<String>,
    pub institution: Option<String>,
    pub publication_type: PublicationType,
    /// Trimmed input line this record was built from.
    pub original_string: String,
    /// Name of the structural pattern that produced the record, if any.
    pub matched_pattern: Option<String>,
}

impl ParsedReference {
    /// A record with every field blank except the original string.
    pub fn blank(original: &str) -> Self {
        Self {
            original_string: original.to_string(),
            ..Default::default()
        }
    }

    /// Value of a field as display text. Authors are joined with `", "`.
    pub fn field(&self, field: Field) -> Option<String> {
        match field {
            Field::Authors => (!self.authors.is_empty()).then(|| self.authors_display()),
            Field::Year => self.year.clone(),
            Field::Title => self.title.clone(),
            Field::Journal => self.journal.clone(),
            Field::BookTitle => self.book_title.clone(),
            Field::Volume => self.volume.clone(),
            Field::Issue => self.issue.clone(),
            Field::Pages => self.pages.clone(),
            Field::Doi => self.doi.clone(),
            Field::Editor => self.editor.clone(),
            Field::Institution => self.institution.clone(),
            Field::PublicationType => self
                .publication_type
                .is_known()
                .then(|| self.publication_type.as_str().to_string()),
        }
    }

    /// Number of non-blank fields (the original string is not counted).
    pub fn filled_count(&self) -> usize {
        Field::ALL
            .iter()
            .filter(|f| self.field(**f).is_some())
            .count()
    }

    /// True if nothing beyond the original string was recovered.
    pub fn is_blank(&self) -> bool {
        self.filled_count() == 0
    }

    pub fn authors_display(&self) -> String {
        self.authors.join(", ")
    }

    /// Journal or, for chapter-style entries, the book title.
    pub fn venue(&self) -> Option<&str> {
        self.journal.as_deref().or(self.book_title.as_deref())
    }
}
