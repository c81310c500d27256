//! End-to-end parsing of citation strings through the public API.

use std::sync::Arc;

use citeparse_parsing::{
    parse_reference, parse_references, EntityRecognizer, EntitySpan, FallbackPolicy,
    ParsingConfigBuilder, PatternSpec, PublicationType, RecognizerError, ReferenceParser,
    SplitMode,
};

const SMITH: &str = "Smith, J. (2009a). Title. Journal, 1(2), 10–20.";
const TANG_SHORT: &str =
    "Tang, K. (2009). Benchmark functions. Technical report. University of Science.";
const TANG_FULL: &str = "Tang, K., Li, X., Suganthan, P. N., Yang, Z., & Weise, T. (2009). \
    Benchmark functions for the CEC'2010 special session and competition on large-scale global \
    optimization. Technical report (p. 23). Nature Inspired Computation and Applications \
    Laboratory (NICAL), School of Computer Science and Technology, University of Science and \
    Technology of China.";

fn heuristic_only() -> ReferenceParser {
    let config = ParsingConfigBuilder::new()
        .fallback_policy(FallbackPolicy::HeuristicOnly)
        .build()
        .unwrap();
    ReferenceParser::with_config(config)
}

// =============================================================================
// Journal articles
// =============================================================================

#[test]
fn journal_article_with_issue() {
    let r = parse_reference(SMITH);
    assert_eq!(r.year.as_deref(), Some("2009a"));
    assert_eq!(r.volume.as_deref(), Some("1"));
    assert_eq!(r.issue.as_deref(), Some("2"));
    assert_eq!(r.pages.as_deref(), Some("10–20"));
    assert_eq!(r.original_string, SMITH);
}

#[test]
fn journal_article_without_issue() {
    let r = parse_reference("Lee, A., & Kim, B. (2011). Some findings. Cognition, 12, 45-67.");
    assert_eq!(r.matched_pattern.as_deref(), Some("journal_without_issue"));
    assert_eq!(r.authors, vec!["Lee, A.", "Kim, B."]);
    assert_eq!(r.journal.as_deref(), Some("Cognition"));
    assert_eq!(r.volume.as_deref(), Some("12"));
    assert!(r.issue.is_none());
    assert_eq!(r.pages.as_deref(), Some("45-67"));
}

#[test]
fn doi_is_kept_verbatim_up_to_whitespace() {
    let r = parse_reference(&format!("{SMITH} https://doi.org/10.1000/xyz more text"));
    assert_eq!(r.doi.as_deref(), Some("https://doi.org/10.1000/xyz"));
    assert_eq!(r.pages.as_deref(), Some("10–20"));
}

#[test]
fn doi_alone_is_recovered_by_fallback() {
    let r = parse_reference("see https://doi.org/10.1000/xyz more text");
    assert_eq!(r.doi.as_deref(), Some("https://doi.org/10.1000/xyz"));
    assert!(r.matched_pattern.is_none());
}

// =============================================================================
// Chapters and reports
// =============================================================================

#[test]
fn chapter_in_edited_book() {
    let r = parse_reference(
        "Doe, A. (2010). Chapter title. In B. Editor (Ed.), Big Book (pp. 5–9). Publisher.",
    );
    assert_eq!(r.matched_pattern.as_deref(), Some("chapter"));
    assert_eq!(r.title.as_deref(), Some("Chapter title"));
    assert_eq!(r.editor.as_deref(), Some("B. Editor"));
    assert_eq!(r.book_title.as_deref(), Some("Big Book"));
    assert_eq!(r.pages.as_deref(), Some("5–9"));
    assert_eq!(r.venue(), Some("Big Book"));
}

#[test]
fn chapter_with_edition_before_pages() {
    let r = parse_reference(
        "Doe, A. (2010). Chapter title. In C. Ed (Ed.), Big Book (2nd ed., pp. 5–9). Publisher.",
    );
    assert_eq!(r.matched_pattern.as_deref(), Some("chapter"));
    assert_eq!(r.book_title.as_deref(), Some("Big Book"));
    assert_eq!(r.pages.as_deref(), Some("5–9"));
}

#[test]
fn title_containing_publication_type_word() {
    let r = parse_reference(
        "Smith, J. (2020). Working paper on trade. NBER Working Paper 123. \
         National Bureau of Economic Research.",
    );
    assert_eq!(r.title.as_deref(), Some("Working paper on trade"));
    assert_eq!(r.year.as_deref(), Some("2020"));
}

#[test]
fn technical_report_via_pattern() {
    let r = parse_reference(TANG_SHORT);
    assert_eq!(r.matched_pattern.as_deref(), Some("report"));
    assert_eq!(r.title.as_deref(), Some("Benchmark functions"));
    assert!(r.institution.as_deref().unwrap().contains("University of Science"));
    assert_eq!(r.publication_type, PublicationType::TechnicalReport);
}

#[test]
fn technical_report_via_fallback_alone() {
    let r = heuristic_only().parse_line(TANG_SHORT);
    assert!(r.matched_pattern.is_none());
    assert_eq!(r.title.as_deref(), Some("Benchmark functions"));
    assert!(r.institution.as_deref().unwrap().contains("University of Science"));
    assert_eq!(r.publication_type, PublicationType::TechnicalReport);
    assert_eq!(r.year.as_deref(), Some("2009"));
}

#[test]
fn long_technical_report() {
    let r = parse_reference(TANG_FULL);
    assert_eq!(r.matched_pattern.as_deref(), Some("report"));
    assert_eq!(
        r.authors,
        vec!["Tang, K.", "Li, X.", "Suganthan, P. N.", "Yang, Z.", "Weise, T."]
    );
    assert!(r.title.as_deref().unwrap().starts_with("Benchmark functions for the CEC'2010"));
    assert!(r.title.as_deref().unwrap().ends_with("global optimization"));
    assert!(r
        .institution
        .as_deref()
        .unwrap()
        .contains("University of Science and Technology of China"));
}

#[test]
fn long_technical_report_title_via_fallback() {
    let r = heuristic_only().parse_line(TANG_FULL);
    assert_eq!(r.authors.len(), 5);
    assert!(r.title.as_deref().unwrap().ends_with("large-scale global optimization"));
    assert_eq!(r.publication_type, PublicationType::TechnicalReport);
}

#[test]
fn doctoral_dissertation() {
    let r = parse_reference("Doe, J. (2015). On things [Doctoral dissertation, Harvard University].");
    assert_eq!(r.publication_type, PublicationType::Dissertation);
    assert_eq!(r.institution.as_deref(), Some("Harvard University"));
    assert_eq!(r.title.as_deref(), Some("On things"));
}

// =============================================================================
// Degenerate input
// =============================================================================

#[test]
fn unparsable_line_keeps_only_original() {
    let r = parse_reference("not a citation at all");
    assert_eq!(r.original_string, "not a citation at all");
    assert!(r.is_blank());
    assert!(r.authors.is_empty());
    assert_eq!(r.publication_type, PublicationType::Unknown);
}

#[test]
fn empty_blob_yields_no_records() {
    assert!(parse_references("").is_empty());
    assert!(parse_references("  \n \r\n\t").is_empty());
}

#[test]
fn every_key_is_serialized() {
    let value = serde_json::to_value(parse_reference("not a citation at all")).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 14);
    assert!(obj["doi"].is_null());
    assert_eq!(obj["authors"], serde_json::json!([]));
}

// =============================================================================
// Batches
// =============================================================================

#[test]
fn one_record_per_line_in_order() {
    let blob = format!("{SMITH}\n\nnot a citation at all\r\n{TANG_SHORT}\n");
    let records = parse_references(&blob);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].original_string, SMITH);
    assert_eq!(records[1].original_string, "not a citation at all");
    assert_eq!(records[2].original_string, TANG_SHORT);
}

#[test]
fn entries_mode_joins_wrapped_lines() {
    let config = ParsingConfigBuilder::new()
        .split_mode(SplitMode::Entries)
        .build()
        .unwrap();
    let blob = "Smith, J. (2009a). Title. Journal,\n1(2), 10–20.\nTang, K. (2009). Benchmark \
                functions. Technical report. University of Science.";
    let records = ReferenceParser::with_config(config).parse_batch(blob);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].issue.as_deref(), Some("2"));
}

#[test]
fn parsing_is_idempotent() {
    let parser = ReferenceParser::new();
    for line in [SMITH, TANG_SHORT, TANG_FULL, "not a citation at all"] {
        assert_eq!(parser.parse_line(line), parser.parse_line(line));
    }
}

// =============================================================================
// Pattern priority
// =============================================================================

#[test]
fn equal_scores_prefer_earlier_pattern() {
    let first = PatternSpec::new("first", r"\((?P<year>\d{4})\)");
    let second = PatternSpec::new("second", r"(?P<year>\d{4})");

    let config = ParsingConfigBuilder::new()
        .set_patterns(vec![first.clone(), second.clone()])
        .build()
        .unwrap();
    let r = ReferenceParser::with_config(config).parse_line("X (2001).");
    assert_eq!(r.matched_pattern.as_deref(), Some("first"));

    let config = ParsingConfigBuilder::new()
        .set_patterns(vec![second, first])
        .build()
        .unwrap();
    let r = ReferenceParser::with_config(config).parse_line("X (2001).");
    assert_eq!(r.matched_pattern.as_deref(), Some("second"));
}

#[test]
fn min_pattern_score_discards_weak_candidates() {
    let config = ParsingConfigBuilder::new()
        .set_patterns(vec![PatternSpec::new("year_only", r"\((?P<year>\d{4})\)")])
        .min_pattern_score(2)
        .build()
        .unwrap();
    let r = ReferenceParser::with_config(config).parse_line("X (2001).");
    assert!(r.matched_pattern.is_none());
    // fallback still recovers the year
    assert_eq!(r.year.as_deref(), Some("2001"));
}

// =============================================================================
// Entity recognizer
// =============================================================================

struct BrokenRecognizer;

impl EntityRecognizer for BrokenRecognizer {
    fn name(&self) -> &str {
        "broken"
    }

    fn analyze(&self, _text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        Err(RecognizerError::Failed("connection reset".into()))
    }
}

#[test]
fn failing_recognizer_does_not_abort_batch() {
    let parser = ReferenceParser::new().with_recognizer(Arc::new(BrokenRecognizer));
    let records = parser.parse_batch(&format!("{SMITH}\nDoe, J. (2012). Survey. Acme Corp."));
    assert_eq!(records.len(), 2);
    assert!(records[1].institution.is_none());
    assert_eq!(records[0].year.as_deref(), Some("2009a"));
    assert!(parser.analyze_entities("anything").is_err());
}
