//! Highlighter definitions
//!
//! A [`Spec`] is the parsed form of one `.phl` file: its metadata and
//! the ordered list of rules. Specs are immutable once loaded and are
//! shared as `Rc<Spec>` between storages, editors and highlighters.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::rules::Rule;
use super::storage::SpecStorage;

/// Line number in a spec source, 1-based
pub type SpecLineNo = usize;

/// Parse diagnostics keyed by source line
///
/// File-level diagnostics are reported at line 1.
pub type SpecWarnings = BTreeMap<SpecLineNo, String>;

/// Identity of a highlighter definition
#[derive(Clone, Default)]
pub struct Meta {
    /// Unique key
    pub name: String,
    /// Display name, may be empty
    pub title: String,
    /// Storage-specific locator (file path, resource id)
    pub source: String,
    /// Storage that produced this meta, used to route saves
    pub storage: Option<Weak<dyn SpecStorage>>,
}

impl Meta {
    /// Title if set, name otherwise
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    /// Storage this meta came from, if it is still alive
    pub fn storage(&self) -> Option<Rc<dyn SpecStorage>> {
        self.storage.as_ref().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("source", &self.source)
            .field("storage", &self.storage().map(|s| s.name().to_string()))
            .finish()
    }
}

/// Source text kept for editing tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawData {
    /// Rule section exactly as read, without the `---` separator
    pub code: String,
    /// Sample text following the separator
    pub sample: String,
    /// Line of the `name` key
    pub name_line: Option<SpecLineNo>,
    /// Line of the `title` key
    pub title_line: Option<SpecLineNo>,
}

/// One complete highlighter definition
#[derive(Debug, Clone, Default)]
pub struct Spec {
    pub meta: Meta,
    /// Rules in declaration order; a rule's index is its region id
    pub rules: Vec<Rule>,
    /// Present only when loaded with raw data
    pub raw: Option<RawData>,
}

impl Spec {
    /// Create an empty spec with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: Meta {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Find a rule by name
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Check if any rule describes a multi-line region
    pub fn has_multiline(&self) -> bool {
        self.rules.iter().any(|r| r.multiline)
    }

    /// Raw source code, empty if not loaded with raw data
    pub fn raw_code(&self) -> &str {
        self.raw.as_ref().map(|r| r.code.as_str()).unwrap_or("")
    }

    /// Raw sample text, empty if not loaded with raw data
    pub fn raw_sample(&self) -> &str {
        self.raw.as_ref().map(|r| r.sample.as_str()).unwrap_or("")
    }

    /// Replace the sample text kept with the raw data
    pub fn set_raw_sample(&mut self, sample: impl Into<String>) {
        self.raw.get_or_insert_with(RawData::default).sample = sample.into();
    }

    /// Text written back to storage: rules, separator, sample
    pub fn storable_string(&self) -> String {
        format!("{}\n\n---\n{}", self.raw_code().trim(), self.raw_sample().trim())
    }
}

/// Result of loading a single spec file
#[derive(Debug)]
pub struct SpecResult {
    pub spec: Rc<Spec>,
    pub warnings: SpecWarnings,
}
