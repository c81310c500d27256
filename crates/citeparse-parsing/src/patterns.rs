//! The citation pattern library.
//!
//! Patterns are plain data: an ordered list of separators and typed slots.
//! Each descriptor is rendered into one regex with a named capture group per
//! slot (group name = [`Field::as_str`]). Custom patterns supplied through
//! configuration are raw regex strings whose group names must be field names.

use citeparse_core::Field;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ParsingError;

/// Pages: a single number or two numbers joined by an en-dash or hyphen.
const PAGES_RULE: &str = r"\d+(?:\s*[–-]\s*\d+)?";

/// A typed slot inside a pattern.
#[derive(Debug, Clone, Copy)]
pub struct SlotRule {
    pub field: Field,
    /// Literal context matched right before the slot, inside the optional group.
    pub prefix: &'static str,
    /// Recognition rule for the slot value itself.
    pub rule: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum Piece {
    Sep(&'static str),
    Slot(SlotRule),
}

const fn req(field: Field, prefix: &'static str, rule: &'static str) -> Piece {
    Piece::Slot(SlotRule {
        field,
        prefix,
        rule,
        required: true,
    })
}

const fn opt(field: Field, prefix: &'static str, rule: &'static str) -> Piece {
    Piece::Slot(SlotRule {
        field,
        prefix,
        rule,
        required: false,
    })
}

const AUTHORS: Piece = req(Field::Authors, "", ".+?");
const YEAR: Piece = req(Field::Year, r"\s*\(", r"\d{4}[a-z]?");
const TITLE: Piece = req(Field::Title, r"\)\.?\s*", ".+?");
const JOURNAL: Piece = req(Field::Journal, r"[.?!]\s+", r"[^.]+?");
const VOLUME: Piece = req(Field::Volume, r",\s*", r"\d+");
const ISSUE: Piece = req(Field::Issue, r"\s*\(", r"\d+(?:[–-]\d+)?");
const DOI: Piece = opt(Field::Doi, ".*?", r"https?://\S+");

/// A named, ordered pattern descriptor.
#[derive(Debug, Clone, Copy)]
pub struct PatternDescriptor {
    pub name: &'static str,
    pub pieces: &'static [Piece],
}

impl PatternDescriptor {
    /// Render the descriptor as a regex source string.
    ///
    /// The regex is anchored at the start of the line only, so trailing
    /// publisher or access notes never prevent a match.
    pub fn regex_source(&self) -> String {
        let mut src = String::from(r"(?s)^\s*");
        for piece in self.pieces {
            match piece {
                Piece::Sep(sep) => src.push_str(sep),
                Piece::Slot(slot) if slot.required => {
                    src.push_str(slot.prefix);
                    src.push_str(&format!("(?P<{}>{})", slot.field.as_str(), slot.rule));
                }
                Piece::Slot(slot) => {
                    src.push_str(&format!(
                        "(?:{}(?P<{}>{}))?",
                        slot.prefix,
                        slot.field.as_str(),
                        slot.rule
                    ));
                }
            }
        }
        src
    }

    pub fn to_spec(&self) -> PatternSpec {
        PatternSpec::new(self.name, self.regex_source())
    }
}

/// Built-in patterns in priority order. Earlier entries win score ties.
pub const BUILTIN_PATTERNS: [PatternDescriptor; 4] = [
    PatternDescriptor {
        name: "journal_with_issue",
        pieces: &[
            AUTHORS,
            YEAR,
            TITLE,
            JOURNAL,
            VOLUME,
            ISSUE,
            req(Field::Pages, r"\),\s*", PAGES_RULE),
            DOI,
        ],
    },
    PatternDescriptor {
        name: "journal_without_issue",
        pieces: &[
            AUTHORS,
            YEAR,
            TITLE,
            JOURNAL,
            VOLUME,
            req(Field::Pages, r",\s*", PAGES_RULE),
            DOI,
        ],
    },
    PatternDescriptor {
        name: "chapter",
        pieces: &[
            AUTHORS,
            YEAR,
            TITLE,
            Piece::Sep(r"[.?!]\s+[Ii]n:?\s+"),
            req(Field::Editor, "", ".+?"),
            // a parenthetical stays in the book title only when it holds no pages
            req(Field::BookTitle, r"\s*\([Ee]ds?\.?\),?\s*", r"[^(]+?(?:\s*\([^)]*\))??"),
            // edition or volume notes may precede the pages: "(2nd ed., pp. 5–9)"
            opt(Field::Pages, r"\s*\((?:[^)]*?,\s*)?(?:pp?\.\s*)?", PAGES_RULE),
            Piece::Sep(r"\)?\s*\."),
            DOI,
        ],
    },
    PatternDescriptor {
        name: "report",
        pieces: &[
            AUTHORS,
            YEAR,
            TITLE,
            // optional qualifier word such as "Doctoral" or "Master's"
            Piece::Sep(r"\s*[.(\[]\s*(?:[A-Z][a-z]+'?s?\s+)?"),
            req(
                Field::PublicationType,
                "",
                r"(?i:technical\s+report|working\s+paper|thesis|dissertation)",
            ),
            Piece::Sep(r"(?:\s*\([^)]*\))?(?:,\s*|[^.]*\.\s*)"),
            req(Field::Institution, "", r"[A-Z][^.\]]*?"),
            Piece::Sep(r"\s*(?:[\].]|$)"),
            DOI,
        ],
    },
];

/// A pattern as configuration sees it: a name and a raw regex source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSpec {
    pub name: String,
    pub regex: String,
}

impl PatternSpec {
    pub fn new(name: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regex: regex.into(),
        }
    }
}

/// Specs for the built-in library, in priority order.
pub fn builtin_specs() -> Vec<PatternSpec> {
    BUILTIN_PATTERNS.iter().map(PatternDescriptor::to_spec).collect()
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct CitationPattern {
    name: String,
    slots: Vec<Field>,
    regex: Regex,
}

impl CitationPattern {
    /// Compile a spec. Every named capture group must be a field name.
    pub fn compile(spec: &PatternSpec) -> Result<Self, ParsingError> {
        let regex = Regex::new(&spec.regex).map_err(|e| ParsingError::InvalidPattern {
            pattern: spec.name.clone(),
            source: e,
        })?;

        let mut slots = Vec::new();
        for name in regex.capture_names().flatten() {
            let field = Field::from_name(name).ok_or_else(|| ParsingError::UnknownSlot {
                pattern: spec.name.clone(),
                slot: name.to_string(),
            })?;
            slots.push(field);
        }

        Ok(Self {
            name: spec.name.clone(),
            slots,
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields this pattern can fill, in group order.
    pub fn slots(&self) -> &[Field] {
        &self.slots
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Ordered set of compiled patterns.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<CitationPattern>,
}

static BUILTIN_LIBRARY: Lazy<PatternLibrary> = Lazy::new(|| {
    PatternLibrary::compile(&builtin_specs()).expect("built-in citation patterns must compile")
});

impl PatternLibrary {
    /// The process-wide built-in library.
    pub fn builtin() -> &'static PatternLibrary {
        &BUILTIN_LIBRARY
    }

    pub fn compile(specs: &[PatternSpec]) -> Result<Self, ParsingError> {
        let patterns = specs
            .iter()
            .map(CitationPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CitationPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
