//! Interface to an external named-entity recognition service.
//!
//! The parsing engine only ever asks for organization spans, and treats the
//! service as optional: implementations may fail or return nothing and
//! parsing carries on without them.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    #[error("entity recognizer unavailable: {0}")]
    Unavailable(String),
    #[error("entity analysis failed: {0}")]
    Failed(String),
}

/// Category attached to a recognised span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Organization,
    Person,
    Location,
    Date,
    Other(String),
}

impl EntityCategory {
    /// Map common NER label spellings (`ORG`, `PERSON`, `GPE`, ...) to a category.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_uppercase().as_str() {
            "ORG" | "ORGANIZATION" | "ORGANISATION" => EntityCategory::Organization,
            "PER" | "PERSON" => EntityCategory::Person,
            "LOC" | "GPE" | "LOCATION" => EntityCategory::Location,
            "DATE" => EntityCategory::Date,
            _ => EntityCategory::Other(label.to_string()),
        }
    }
}

/// A span of text labelled by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub category: EntityCategory,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, category: EntityCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// A named-entity recognition service.
///
/// Implementations must be idempotent for the same input and free of
/// observable side effects. Long-lived models are constructed once by the
/// caller and injected into the parser.
pub trait EntityRecognizer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Label spans of `text`.
    fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError>;
}
