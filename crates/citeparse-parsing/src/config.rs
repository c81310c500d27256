use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use citeparse_core::config_file::ParsingSection;

use crate::patterns::{builtin_specs, PatternLibrary, PatternSpec};
use crate::ParsingError;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// When the heuristic fallback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// After pattern matching, fill every slot the pattern left blank.
    #[default]
    FillBlanks,
    /// Only when no pattern matched at all.
    OnNoMatch,
    /// Skip patterns entirely.
    HeuristicOnly,
}

impl FromStr for FallbackPolicy {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "fill-blanks" => Ok(FallbackPolicy::FillBlanks),
            "on-no-match" => Ok(FallbackPolicy::OnNoMatch),
            "heuristic-only" => Ok(FallbackPolicy::HeuristicOnly),
            _ => Err(ParsingError::InvalidSetting {
                setting: "fallback_policy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackPolicy::FillBlanks => "fill-blanks",
            FallbackPolicy::OnNoMatch => "on-no-match",
            FallbackPolicy::HeuristicOnly => "heuristic-only",
        })
    }
}

/// How a text blob is cut into citation strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// One non-empty line per citation.
    #[default]
    Lines,
    /// Join wrapped continuation lines onto the entry they belong to.
    Entries,
}

impl FromStr for SplitMode {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lines" => Ok(SplitMode::Lines),
            "entries" => Ok(SplitMode::Entries),
            _ => Err(ParsingError::InvalidSetting {
                setting: "split_mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitMode::Lines => "lines",
            SplitMode::Entries => "entries",
        })
    }
}

/// Configuration for the reference parser.
///
/// Use [`ParsingConfigBuilder`] to construct with custom string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    /// Candidates filling fewer slots are discarded (default: 1).
    pub(crate) min_pattern_score: usize,
    pub(crate) fallback_policy: FallbackPolicy,
    pub(crate) split_mode: SplitMode,
    /// Maximum number of authors to retain per reference (default: 50).
    pub(crate) max_authors: usize,
    /// Compiled custom library; `None` means the built-in one.
    pub(crate) library: Option<Arc<PatternLibrary>>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            min_pattern_score: 1,
            fallback_policy: FallbackPolicy::default(),
            split_mode: SplitMode::default(),
            max_authors: 50,
            library: None,
        }
    }
}

impl ParsingConfig {
    pub fn min_pattern_score(&self) -> usize {
        self.min_pattern_score
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback_policy
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }

    pub fn max_authors(&self) -> usize {
        self.max_authors
    }

    /// The pattern library in effect.
    pub fn library(&self) -> &PatternLibrary {
        match &self.library {
            Some(lib) => lib,
            None => PatternLibrary::builtin(),
        }
    }
}

/// Builder for [`ParsingConfig`].
///
/// Custom patterns are compiled in [`build()`](Self::build), which fails fast
/// if any of them is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    min_pattern_score: Option<usize>,
    fallback_policy: Option<FallbackPolicy>,
    split_mode: Option<SplitMode>,
    max_authors: Option<usize>,
    patterns: ListOverride<PatternSpec>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[parsing]` section of a config file.
    ///
    /// Unknown policy or split-mode strings are reported as
    /// [`ParsingError::InvalidSetting`].
    pub fn from_file_settings(section: &ParsingSection) -> Result<Self, ParsingError> {
        let mut builder = Self::new();
        if let Some(n) = section.min_pattern_score {
            builder = builder.min_pattern_score(n);
        }
        if let Some(ref policy) = section.fallback_policy {
            builder = builder.fallback_policy(policy.parse()?);
        }
        if let Some(ref mode) = section.split_mode {
            builder = builder.split_mode(mode.parse()?);
        }
        if let Some(n) = section.max_authors {
            builder = builder.max_authors(n);
        }
        Ok(builder)
    }

    // ── Scalars ──

    pub fn min_pattern_score(mut self, n: usize) -> Self {
        self.min_pattern_score = Some(n);
        self
    }

    pub fn fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.fallback_policy = Some(policy);
        self
    }

    pub fn split_mode(mut self, mode: SplitMode) -> Self {
        self.split_mode = Some(mode);
        self
    }

    pub fn max_authors(mut self, n: usize) -> Self {
        self.max_authors = Some(n);
        self
    }

    // ── Patterns ──

    pub fn set_patterns(mut self, patterns: Vec<PatternSpec>) -> Self {
        self.patterns = ListOverride::Replace(patterns);
        self
    }

    pub fn add_pattern(mut self, pattern: PatternSpec) -> Self {
        match &mut self.patterns {
            ListOverride::Extend(v) => v.push(pattern),
            _ => self.patterns = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    /// Compile custom patterns and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let defaults = ParsingConfig::default();

        let library = match self.patterns {
            ListOverride::Default => None,
            ref overridden => {
                let specs = overridden.resolve(&builtin_specs());
                Some(Arc::new(PatternLibrary::compile(&specs)?))
            }
        };

        Ok(ParsingConfig {
            min_pattern_score: self.min_pattern_score.unwrap_or(defaults.min_pattern_score),
            fallback_policy: self.fallback_policy.unwrap_or(defaults.fallback_policy),
            split_mode: self.split_mode.unwrap_or(defaults.split_mode),
            max_authors: self.max_authors.unwrap_or(defaults.max_authors),
            library,
        })
    }
}
