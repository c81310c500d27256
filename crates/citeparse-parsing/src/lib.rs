use thiserror::Error;

pub mod batch;
pub mod config;
pub mod entities;
pub mod extractor;
pub mod fallback;
pub mod fields;
pub mod patterns;
pub mod scoring;
pub mod text_processing;

pub use batch::split_references;
pub use config::{FallbackPolicy, ListOverride, ParsingConfig, ParsingConfigBuilder, SplitMode};
pub use entities::{HeuristicRecognizer, NoopRecognizer};
pub use extractor::ReferenceParser;
pub use patterns::{CitationPattern, PatternLibrary, PatternSpec};
pub use scoring::{select_best, MatchCandidate};
// Re-export domain types from core (canonical definitions live there)
pub use citeparse_core::{
    EntityCategory, EntityRecognizer, EntitySpan, Field, ParsedReference, PublicationType,
    RecognizerError,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("pattern '{pattern}' uses unknown slot '{slot}'")]
    UnknownSlot { pattern: String, slot: String },
    #[error("invalid value '{value}' for {setting}")]
    InvalidSetting { setting: &'static str, value: String },
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
}

/// Parse one citation string with the default parser.
pub fn parse_reference(line: &str) -> ParsedReference {
    ReferenceParser::new().parse_line(line)
}

/// Parse a multi-line blob with the default parser, one record per
/// non-empty line.
pub fn parse_references(blob: &str) -> Vec<ParsedReference> {
    ReferenceParser::new().parse_batch(blob)
}
