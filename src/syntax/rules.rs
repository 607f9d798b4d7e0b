//! Highlighting rules
//!
//! This module defines the rule types used to match and style text,
//! and the per-block state used to carry multi-line regions across
//! block boundaries.

use regex::{Captures, Regex, RegexBuilder};

use super::style::Format;

/// A compiled match expression that remembers its source pattern
#[derive(Debug, Clone)]
pub struct Expr {
    pattern: String,
    regex: Regex,
}

impl Expr {
    /// Compile a case-sensitive expression
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Self::with_options(pattern, false)
    }

    /// Compile an expression with pattern options
    pub fn with_options(pattern: &str, ignore_case: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Expression for a literal word, delimited by word boundaries
    pub fn term(word: &str) -> Result<Self, regex::Error> {
        Self::new(&format!(r"\b{}\b", regex::escape(word)))
    }

    /// Source text of the pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Recompile the same pattern with other options
    pub fn rebuild(&self, ignore_case: bool) -> Result<Self, regex::Error> {
        Self::with_options(&self.pattern, ignore_case)
    }

    /// Find the first match in text starting at byte position
    ///
    /// Anchors and word boundaries still see the text before `start`.
    pub fn find_at(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start > text.len() {
            return None;
        }
        self.regex.find_at(text, start).map(|m| (m.start(), m.end()))
    }

    /// Find the first match with its capture groups
    pub fn captures_at<'t>(&self, text: &'t str, start: usize) -> Option<Captures<'t>> {
        if start > text.len() {
            return None;
        }
        self.regex.captures_at(text, start)
    }
}

/// A single highlighting rule
///
/// A plain rule styles every match of its expressions. A multiline
/// rule has exactly two expressions once loaded: the region start
/// and the region end.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    /// Name, unique within a spec
    pub name: String,
    /// Compiled expressions
    pub exprs: Vec<Expr>,
    /// Literal words, alternative to `exprs`
    pub terms: Vec<String>,
    /// Format applied to matches
    pub format: Format,
    /// Capture group to style (0 = whole match)
    pub group: usize,
    /// Matched text becomes a link to itself
    pub hyperlink: bool,
    /// Rule describes a region with start and end expressions
    pub multiline: bool,
    /// Font size offset from the buffer's default size
    pub font_size_delta: i32,
}

impl Rule {
    /// Create an empty rule
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Region start and end expressions of a multiline rule
    pub fn region_exprs(&self) -> Option<(&Expr, &Expr)> {
        if !self.multiline {
            return None;
        }
        match self.exprs.as_slice() {
            [start, end, ..] => Some((start, end)),
            _ => None,
        }
    }
}

/// State stored at the end of each text block
///
/// Holds the region id (rule index) of the multiline rule that is
/// still open at the end of the block. Only one region can be open
/// across a block boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlockState {
    region: Option<usize>,
}

impl BlockState {
    /// State for a block that ends inside region `region`
    pub fn inside(region: usize) -> Self {
        Self {
            region: Some(region),
        }
    }

    /// Region open at the end of the block
    pub fn region(&self) -> Option<usize> {
        self.region
    }

    /// Check if the block ends inside the given region
    pub fn is_inside(&self, region: usize) -> bool {
        self.region == Some(region)
    }

    /// Check if no region is open
    pub fn is_normal(&self) -> bool {
        self.region.is_none()
    }
}
