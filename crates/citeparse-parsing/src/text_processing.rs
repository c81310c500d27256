use once_cell::sync::Lazy;
use regex::Regex;

/// Collapse every whitespace run (including embedded newlines) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// Normalize a captured slot value: collapse whitespace and drop separator
/// punctuation left dangling at either end. Returns `None` if nothing remains.
pub fn clean_value(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let cleaned = collapsed
        .trim_start_matches([',', ';', ':'])
        .trim_end_matches([',', ';', ':'])
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Strip leading/trailing periods and whitespace (title slices).
pub fn strip_periods(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let cleaned = collapsed.trim_matches(|c: char| c == '.' || c == ',' || c.is_whitespace());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Find the first "real" period: one that ends a sentence rather than an
/// author initial like "M." or "J.". The period must be followed by
/// whitespace or end the text.
pub fn find_first_real_period(text: &str) -> Option<usize> {
    static PERIOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:\s|$)").unwrap());

    let bytes = text.as_bytes();
    let is_initial = |pos: usize| {
        bytes[pos - 1].is_ascii_uppercase() && (pos == 1 || !bytes[pos - 2].is_ascii_alphabetic())
    };

    PERIOD_RE
        .find_iter(text)
        .map(|m| m.start())
        .find(|&pos| pos > 0 && !is_initial(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n  b\t c "), "a b c");
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value(" Journal of Tests, ").as_deref(), Some("Journal of Tests"));
        assert_eq!(clean_value(" , "), None);
        assert_eq!(clean_value("Smith, J."), Some("Smith, J.".to_string()));
    }

    #[test]
    fn test_strip_periods() {
        assert_eq!(strip_periods(". Benchmark functions. ").as_deref(), Some("Benchmark functions"));
        assert_eq!(strip_periods(" .. "), None);
    }

    #[test]
    fn test_first_real_period_skips_initials() {
        let text = "Smith, J. K. A title here. Journal.";
        let pos = find_first_real_period(text).unwrap();
        assert_eq!(&text[..pos], "Smith, J. K. A title here");
    }

    #[test]
    fn test_first_real_period_at_end() {
        assert_eq!(find_first_real_period("no stop here."), Some(12));
        assert_eq!(find_first_real_period("no stop here"), None);
    }
}
