//! Heuristic field recovery for lines no pattern handled completely.
//!
//! Each field is recovered independently with the primitives in
//! [`crate::fields`]; the title is sliced out between the year and the
//! nearest following anchor (institution, journal/volume run, or
//! publication-type phrase).

use citeparse_core::{ParsedReference, PublicationType};

use crate::fields::{
    extract_authors, extract_doi, extract_publication_type, extract_volume_issue_pages,
    find_institution, find_journal_volume, find_year, publication_type_anchors,
};
use crate::text_processing::{find_first_real_period, strip_periods};

/// Fields recovered heuristically from one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeuristicFields {
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub publication_type: Option<String>,
    pub institution: Option<String>,
    pub doi: Option<String>,
}

pub fn extract_heuristic(line: &str) -> HeuristicFields {
    let vip = extract_volume_issue_pages(line);
    HeuristicFields {
        authors: extract_authors(line),
        year: find_year(line).map(|m| m.year),
        title: recover_title(line),
        journal: find_journal_volume(line).map(|m| m.journal),
        volume: vip.as_ref().map(|v| v.volume.clone()),
        issue: vip.as_ref().map(|v| v.issue.clone()),
        pages: vip.map(|v| v.pages),
        publication_type: extract_publication_type(line),
        institution: find_institution(line).map(|m| m.name),
        doi: extract_doi(line),
    }
}

/// Slice the title out of a line.
///
/// With a year: the text after the year parenthesis up to the earliest
/// anchor that leaves a non-empty title, or up to the next sentence period if
/// no anchor does. Without a year: the second sentence, skipping periods
/// after author initials.
pub fn recover_title(line: &str) -> Option<String> {
    let Some(year) = find_year(line) else {
        let start = find_first_real_period(line)? + 1;
        return first_sentence(&line[start..]);
    };

    let rest = &line[year.span.end..];
    let mut anchors: Vec<usize> = find_institution(rest)
        .map(|m| m.span.start)
        .into_iter()
        .chain(find_journal_volume(rest).map(|m| m.span.start))
        .chain(publication_type_anchors(rest))
        .collect();
    anchors.sort_unstable();

    anchors
        .into_iter()
        .find_map(|end| strip_periods(&rest[..end]))
        .or_else(|| first_sentence(rest))
}

fn first_sentence(text: &str) -> Option<String> {
    let body = text.trim_start_matches(|c: char| c == '.' || c.is_whitespace());
    let end = find_first_real_period(body).unwrap_or(body.len());
    strip_periods(&body[..end])
}

/// Write heuristic values into the blank slots of `record`.
///
/// Slots the record already holds are never overwritten. An institution
/// that appears inside the record's title or venue is skipped.
pub fn fill_blanks(record: &mut ParsedReference, fields: HeuristicFields) {
    if record.authors.is_empty() {
        record.authors = fields.authors;
    }
    fill(&mut record.year, fields.year);
    fill(&mut record.title, fields.title);
    fill(&mut record.journal, fields.journal);
    fill(&mut record.volume, fields.volume);
    fill(&mut record.issue, fields.issue);
    fill(&mut record.pages, fields.pages);
    fill(&mut record.doi, fields.doi);

    if !record.publication_type.is_known() {
        if let Some(phrase) = fields.publication_type {
            record.publication_type = PublicationType::from_phrase(&phrase);
        }
    }

    if record.institution.is_none() {
        if let Some(inst) = fields.institution {
            let inside_other_field = [&record.title, &record.journal, &record.book_title]
                .into_iter()
                .flatten()
                .any(|text| text.contains(inst.as_str()));
            if inside_other_field {
                tracing::debug!(institution = %inst, "institution span lies inside title or venue, skipped");
            } else {
                record.institution = Some(inst);
            }
        }
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}
