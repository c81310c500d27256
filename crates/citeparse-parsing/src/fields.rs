//! Single-purpose field extractors.
//!
//! Each extractor looks at the raw citation line on its own and returns
//! `None` when its field is absent. The `find_*` variants also report the
//! byte range of the match so the fallback can slice around it.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text_processing::clean_value;

/// A parenthesised year such as `(2009a)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearMatch {
    /// Digits plus optional disambiguation letter, without parentheses.
    pub year: String,
    /// Range of the whole parenthesised match.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeIssuePages {
    pub volume: String,
    pub issue: String,
    pub pages: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionMatch {
    pub name: String,
    pub span: Range<usize>,
}

/// A "Journal Name, 12(3), 45" run. `span` starts at the journal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalVolumeMatch {
    pub journal: String,
    pub span: Range<usize>,
}

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4}[a-z]?)\)").unwrap());

static DOI_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

static VOLUME_ISSUE_PAGES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\((\d+)\),\s*(\d+(?:\s*[–-]\s*\d+)?)").unwrap()
});

static PUBLICATION_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:technical\s+report|working\s+paper|thesis|dissertation)\b").unwrap()
});

/// Publication-type phrase at a clause boundary: a period or opening bracket,
/// then up to two qualifier words such as `Doctoral` or `NBER`.
/// Used only as a slicing anchor.
static PUBLICATION_TYPE_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[.(\[]\s*(?:(?:ph\.?\s?d\.?|[\p{L}'’]+)\s+){0,2}(?:technical\s+report|working\s+paper|thesis|dissertation)\b",
    )
    .unwrap()
});

/// Capitalised words and connectors around an institution keyword. The span
/// ends at the first comma, so a trailing location is not part of the name.
static INSTITUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:\b\p{Lu}[\w'&-]*\s+(?:(?:of|and|for|the|de|&)\s+)*)*",
        r"\b(?i:universit(?:y|ies)|institutes?|laborator(?:y|ies)|technology|school\s+of\s+[\w&'-]+)\b",
        r"(?:\s+(?:(?:of|and|for|the|at|de|&)\s+)*\p{Lu}[\w'&-]*)*",
    ))
    .unwrap()
});

static JOURNAL_VOLUME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?P<journal>\p{Lu}[\p{L}&:'\s-]*?)(?:,\s*|\s+)(?P<volume>\d+)\s*(?:\([^)]*\))?,\s*\d",
    )
    .unwrap()
});

static AUTHOR_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:&\s*)?\b(\p{Lu}[\p{L}'’-]+,\s+\p{Lu}\.(?:\s?-?\p{Lu}\.)*)").unwrap()
});

/// Year with optional disambiguation letter, e.g. `"2009a"`. First match wins.
pub fn extract_year(text: &str) -> Option<String> {
    find_year(text).map(|m| m.year)
}

pub fn find_year(text: &str) -> Option<YearMatch> {
    let caps = YEAR_RE.captures(text)?;
    let whole = caps.get(0)?;
    Some(YearMatch {
        year: caps[1].to_string(),
        span: whole.range(),
    })
}

/// First `http(s)://` token up to whitespace, verbatim.
pub fn extract_doi(text: &str) -> Option<String> {
    DOI_URL_RE.find(text).map(|m| m.as_str().to_string())
}

/// `<volume>(<issue>), <pages>` where pages is a number or a dash range.
pub fn extract_volume_issue_pages(text: &str) -> Option<VolumeIssuePages> {
    let caps = VOLUME_ISSUE_PAGES_RE.captures(text)?;
    Some(VolumeIssuePages {
        volume: caps[1].to_string(),
        issue: caps[2].to_string(),
        pages: caps[3].to_string(),
    })
}

/// Technical report / working paper / thesis / dissertation, as written.
pub fn extract_publication_type(text: &str) -> Option<String> {
    PUBLICATION_TYPE_RE.find(text).map(|m| m.as_str().to_string())
}

/// Starts of every publication-type phrase that opens a clause, in text
/// order. Each position is the boundary character in front of the phrase.
pub fn publication_type_anchors(text: &str) -> impl Iterator<Item = usize> + '_ {
    PUBLICATION_TYPE_ANCHOR_RE.find_iter(text).map(|m| m.start())
}

/// Institution span such as "University of Science and Technology of China".
pub fn extract_institution(text: &str) -> Option<String> {
    find_institution(text).map(|m| m.name)
}

pub fn find_institution(text: &str) -> Option<InstitutionMatch> {
    let m = INSTITUTION_RE.find(text)?;
    let name = clean_value(m.as_str())?;
    Some(InstitutionMatch {
        name,
        span: m.range(),
    })
}

/// Journal name followed by a volume (and optional issue) and pages.
pub fn find_journal_volume(text: &str) -> Option<JournalVolumeMatch> {
    let caps = JOURNAL_VOLUME_RE.captures(text)?;
    let journal = caps.name("journal")?;
    Some(JournalVolumeMatch {
        journal: clean_value(journal.as_str())?,
        span: journal.start()..caps.get(0)?.end(),
    })
}

/// Every "Surname, I." token in order, with any leading `&` dropped.
pub fn extract_authors(text: &str) -> Vec<String> {
    AUTHOR_TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOURNAL_REF: &str = "Smith, J. (2009a). Title. Journal, 1(2), 10–20.";
    const REPORT_REF: &str =
        "Tang, K. (2009). Benchmark functions. Technical report. University of Science.";

    #[test]
    fn test_year_with_letter() {
        assert_eq!(extract_year(JOURNAL_REF).as_deref(), Some("2009a"));
    }

    #[test]
    fn test_year_span_covers_parentheses() {
        let m = find_year(JOURNAL_REF).unwrap();
        assert_eq!(&JOURNAL_REF[m.span.clone()], "(2009a)");
    }

    #[test]
    fn test_year_first_match_wins() {
        assert_eq!(extract_year("A (1999). B (2005).").as_deref(), Some("1999"));
    }

    #[test]
    fn test_year_requires_parentheses() {
        assert_eq!(extract_year("Published 2009 somewhere"), None);
    }

    #[test]
    fn test_volume_issue_pages() {
        let vip = extract_volume_issue_pages(JOURNAL_REF).unwrap();
        assert_eq!(vip.volume, "1");
        assert_eq!(vip.issue, "2");
        assert_eq!(vip.pages, "10–20");
    }

    #[test]
    fn test_volume_issue_single_page() {
        let vip = extract_volume_issue_pages("Nature, 412(6), 233.").unwrap();
        assert_eq!(vip.volume, "412");
        assert_eq!(vip.pages, "233");
    }

    #[test]
    fn test_doi_stops_at_whitespace() {
        assert_eq!(
            extract_doi("see https://doi.org/10.1000/xyz more text").as_deref(),
            Some("https://doi.org/10.1000/xyz")
        );
        assert_eq!(extract_doi("no link here"), None);
    }

    #[test]
    fn test_doi_is_verbatim() {
        assert_eq!(
            extract_doi("http://dx.doi.org/10.1/ABC.").as_deref(),
            Some("http://dx.doi.org/10.1/ABC.")
        );
    }

    #[test]
    fn test_publication_type_case_insensitive() {
        assert_eq!(
            extract_publication_type(REPORT_REF).as_deref(),
            Some("Technical report")
        );
        assert_eq!(
            extract_publication_type("An unpublished WORKING PAPER.").as_deref(),
            Some("WORKING PAPER")
        );
        assert_eq!(extract_publication_type("A journal article."), None);
    }

    #[test]
    fn test_publication_type_anchor_includes_qualifier() {
        let text = "Title [Doctoral dissertation, Uni]";
        let pos = publication_type_anchors(text).next().unwrap();
        assert_eq!(&text[pos..pos + 9], "[Doctoral");
    }

    #[test]
    fn test_publication_type_anchor_needs_clause_boundary() {
        assert_eq!(publication_type_anchors("A thesis on trade").next(), None);
        let text = ". Working paper on trade. NBER Working Paper 123.";
        let anchors: Vec<usize> = publication_type_anchors(text).collect();
        assert_eq!(anchors, vec![0, 24]);

        let text = ". Benchmark functions. Technical report. Uni";
        assert_eq!(publication_type_anchors(text).collect::<Vec<_>>(), vec![21]);
    }

    #[test]
    fn test_institution_full_span() {
        let m = find_institution(REPORT_REF).unwrap();
        assert_eq!(m.name, "University of Science");
        assert_eq!(&REPORT_REF[m.span.clone()], "University of Science");
    }

    #[test]
    fn test_institution_with_leading_words() {
        assert_eq!(
            extract_institution("Report. Massachusetts Institute of Technology.").as_deref(),
            Some("Massachusetts Institute of Technology")
        );
        assert_eq!(
            extract_institution(
                "Technical report (p. 1). University of Science and Technology of China."
            )
            .as_deref(),
            Some("University of Science and Technology of China")
        );
    }

    #[test]
    fn test_institution_school_of() {
        assert_eq!(
            extract_institution("Thesis, Harvard School of Medicine, Boston").as_deref(),
            Some("Harvard School of Medicine")
        );
    }

    #[test]
    fn test_institution_stops_before_location() {
        let text = "Title of thesis (Master's thesis). Stanford University, Stanford, CA.";
        let m = find_institution(text).unwrap();
        assert_eq!(m.name, "Stanford University");
        assert_eq!(&text[m.span.clone()], "Stanford University");
    }

    #[test]
    fn test_institution_absent() {
        assert_eq!(extract_institution("Smith, J. (2001). A title. Nature, 1, 2."), None);
    }

    #[test]
    fn test_journal_volume_anchor() {
        let text = ". Title. Journal of Tests, 12(3), 45–67.";
        let m = find_journal_volume(text).unwrap();
        assert_eq!(m.journal, "Journal of Tests");
        assert_eq!(&text[m.span.start..m.span.start + 7], "Journal");
    }

    #[test]
    fn test_journal_volume_without_issue() {
        let m = find_journal_volume(". Title. Cognition, 12, 45–67.").unwrap();
        assert_eq!(m.journal, "Cognition");
    }

    #[test]
    fn test_authors_chained() {
        let authors = extract_authors(
            "Tang, K., Li, X., Suganthan, P. N., Yang, Z., & Weise, T. (Eds.). (2009a). Benchmark.",
        );
        assert_eq!(
            authors,
            vec!["Tang, K.", "Li, X.", "Suganthan, P. N.", "Yang, Z.", "Weise, T."]
        );
    }

    #[test]
    fn test_authors_none() {
        assert!(extract_authors("not a citation at all").is_empty());
    }
}
