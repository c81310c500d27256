use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SplitMode;

/// Cut a text blob into citation strings, in input order.
///
/// `\r\n` and `\n` both end a line; lines are trimmed and blank lines
/// dropped. In [`SplitMode::Entries`] a line that does not look like the
/// start of a new reference is appended to the previous one.
pub fn split_references(blob: &str, mode: SplitMode) -> Vec<String> {
    let lines = blob.lines().map(str::trim).filter(|l| !l.is_empty());

    match mode {
        SplitMode::Lines => lines.map(str::to_string).collect(),
        SplitMode::Entries => {
            let mut entries: Vec<String> = Vec::new();
            for line in lines {
                match entries.last_mut() {
                    Some(current) if !starts_entry(line) => {
                        current.push(' ');
                        current.push_str(line);
                    }
                    _ => entries.push(line.to_string()),
                }
            }
            entries
        }
    }
}

/// A reference starts with a capital letter and carries a parenthesised year.
fn starts_entry(line: &str) -> bool {
    static YEAR_PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d{4}[a-z]?\)").unwrap());

    line.chars().next().is_some_and(char::is_uppercase) && YEAR_PAREN_RE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_mode_drops_blank_and_trims() {
        let blob = "  first line  \r\n\r\n   \nsecond line\n";
        assert_eq!(
            split_references(blob, SplitMode::Lines),
            vec!["first line", "second line"]
        );
    }

    #[test]
    fn test_empty_blob() {
        assert!(split_references("", SplitMode::Lines).is_empty());
        assert!(split_references(" \n\t\n", SplitMode::Entries).is_empty());
    }

    #[test]
    fn test_entries_mode_joins_continuations() {
        let blob = "Smith, J. (2009). A title that\nwraps onto a second line. Journal, 1(2), 3.\n\
                    Doe, A. (2010). Another. Journal, 4(5), 6.";
        let entries = split_references(blob, SplitMode::Entries);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            "Smith, J. (2009). A title that wraps onto a second line. Journal, 1(2), 3."
        );
        assert!(entries[1].starts_with("Doe, A."));
    }

    #[test]
    fn test_entries_mode_leading_continuation_kept() {
        let entries = split_references("orphan text\nSmith, J. (2009). T.", SplitMode::Entries);
        assert_eq!(entries, vec!["orphan text", "Smith, J. (2009). T."]);
    }
}
