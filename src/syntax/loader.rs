//! Loader for the `.phl` highlighter format
//!
//! The format is a sequence of `key: value` lines. Blank lines and
//! lines starting with `#` are ignored. The header holds `name` and
//! `title`, then every `rule:` line starts a new rule. A line starting
//! with `---` ends the rules; the rest of the file is sample text.
//!
//! ```text
//! name: c
//! title: C
//! rule: comment
//! expr: //.*$
//! color: gray
//! style: italic
//! rule: block-comment
//! expr: /\*
//! expr: \*/
//! color: gray
//! opts: multiline
//! ---
//! int main() { /* sample */ }
//! ```
//!
//! The `size:` rule key (a signed font size offset) is an extension of
//! the format. Definitions that use it are not understood by loaders
//! without it, which report it as an unknown key.
//!
//! Loading never fails. Problems are reported as [`SpecWarnings`] and
//! the offending line is skipped.

use std::collections::HashMap;
use std::str::Lines;

use tracing::warn;

use super::rules::{Expr, Rule};
use super::spec::{Meta, RawData, Spec, SpecLineNo, SpecWarnings};
use super::style::Color;

/// Start of the sample section
const SAMPLE_SEPARATOR: &str = "---";

const MSG_KEY_NOT_FOUND: &str = "Key not found";
const MSG_UNKNOWN_KEY: &str = "Unknown key";
const MSG_NAME_REQUIRED: &str = "Not all required top-level properties set, required: \"name\"";
const MSG_EXPR_AND_TERMS: &str = "Can't have \"expr\" and \"terms\" in the same rule";
const MSG_INVALID_EXPR: &str = "Invalid expression";
const MSG_INVALID_COLOR: &str = "Invalid color value";
const MSG_INVALID_INT: &str = "Invalid integer value";
const MSG_MULTILINE_EMPTY: &str = "Must be at least one \"expr\" when multiline";
const MSG_DUPLICATE_RULE: &str = "Duplicated rule name";

/// Result of reading one physical line
enum LineKind {
    /// Nothing to process (blank, comment, malformed)
    Skip,
    /// A `key: value` pair is in `key`/`val`
    Pair,
    /// The `---` separator
    Separator,
    /// A line of sample text is in `val`
    Sample,
}

/// Line-by-line parser state
struct SpecLoader<'a> {
    lines: Lines<'a>,
    line_no: SpecLineNo,
    key: String,
    val: String,
    in_sample: bool,
    with_raw_data: bool,
    code: Vec<&'a str>,
    sample: Vec<&'a str>,
    warnings: SpecWarnings,
    rule_starts: HashMap<String, SpecLineNo>,
    /// Name from the `rule:` line that ended the header
    first_rule: Option<String>,
}

impl<'a> SpecLoader<'a> {
    fn new(text: &'a str, with_raw_data: bool) -> Self {
        Self {
            lines: text.lines(),
            line_no: 0,
            key: String::new(),
            val: String::new(),
            in_sample: false,
            with_raw_data,
            code: Vec::new(),
            sample: Vec::new(),
            warnings: SpecWarnings::new(),
            rule_starts: HashMap::new(),
            first_rule: None,
        }
    }

    /// Record a diagnostic at the current line, or at `line` if given
    fn warning(&mut self, msg: impl Into<String>, line: Option<SpecLineNo>) {
        let line = line.filter(|&n| n > 0).unwrap_or(self.line_no);
        let msg = msg.into();
        warn!(line, "highlighter spec: {}", msg);
        self.warnings.insert(line, msg);
    }

    /// Read the next physical line, `None` at end of input
    fn read_line(&mut self) -> Option<LineKind> {
        let line = self.lines.next()?;
        self.line_no += 1;

        if self.in_sample {
            self.sample.push(line);
            self.val = line.to_string();
            return Some(LineKind::Sample);
        }

        if line.starts_with(SAMPLE_SEPARATOR) {
            self.in_sample = true;
            return Some(LineKind::Separator);
        }

        self.code.push(line);

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Some(LineKind::Skip);
        }
        match line.split_once(':') {
            Some((key, val)) if !key.trim().is_empty() => {
                self.key = key.trim().to_string();
                self.val = val.trim().to_string();
                Some(LineKind::Pair)
            }
            _ => {
                self.warning(MSG_KEY_NOT_FOUND, None);
                Some(LineKind::Skip)
            }
        }
    }

    /// Read the header up to the first rule
    ///
    /// Returns false when the required `name` key is missing.
    fn load_meta(&mut self, meta: &mut Meta, mut raw: Option<&mut RawData>) -> bool {
        let mut has_name = false;
        while let Some(kind) = self.read_line() {
            match kind {
                LineKind::Skip => continue,
                LineKind::Separator | LineKind::Sample => break,
                LineKind::Pair => {}
            }
            match self.key.as_str() {
                "name" => {
                    meta.name = self.val.clone();
                    has_name = true;
                    if let Some(raw) = raw.as_deref_mut() {
                        raw.name_line = Some(self.line_no);
                    }
                }
                "title" => {
                    meta.title = self.val.clone();
                    if let Some(raw) = raw.as_deref_mut() {
                        raw.title_line = Some(self.line_no);
                    }
                }
                "rule" => {
                    self.first_rule = Some(self.val.clone());
                    break;
                }
                _ => self.warning(MSG_UNKNOWN_KEY, None),
            }
        }
        if !has_name {
            self.warning(MSG_NAME_REQUIRED, Some(1));
        }
        has_name
    }

    /// Read the header and all rules
    fn load_spec(mut self) -> (Spec, SpecWarnings) {
        let mut spec = Spec::default();
        let mut raw = RawData::default();

        if !self.load_meta(&mut spec.meta, Some(&mut raw)) {
            return self.finish(spec, raw);
        }

        let mut rule = self.first_rule.take().map(|name| {
            self.rule_starts.insert(name.clone(), self.line_no);
            Rule::new(name)
        });
        let mut ignore_case = false;

        loop {
            if self.in_sample && !self.with_raw_data {
                break;
            }
            let Some(kind) = self.read_line() else {
                break;
            };
            match kind {
                LineKind::Skip | LineKind::Separator | LineKind::Sample => continue,
                LineKind::Pair => {}
            }

            if self.key == "rule" {
                if let Some(done) = rule.take() {
                    self.finalize_rule(done, &mut spec, ignore_case);
                }
                let name = self.val.clone();
                if spec.rules.iter().any(|r| r.name == name) {
                    let first_line = self.rule_starts.get(&name).copied();
                    self.warning(MSG_DUPLICATE_RULE, None);
                    self.warning(MSG_DUPLICATE_RULE, first_line);
                }
                self.rule_starts.insert(name.clone(), self.line_no);
                rule = Some(Rule::new(name));
                ignore_case = false;
                continue;
            }

            let Some(current) = rule.as_mut() else {
                self.warning(MSG_UNKNOWN_KEY, None);
                continue;
            };
            if let Err(msg) = self.apply_key(current, &mut ignore_case) {
                self.warning(msg, None);
            }
        }

        if let Some(done) = rule.take() {
            self.finalize_rule(done, &mut spec, ignore_case);
        }
        self.finish(spec, raw)
    }

    /// Apply one rule property, returning the diagnostic on failure
    ///
    /// Flag lists report only the last unknown flag, the rest of the
    /// list still applies.
    fn apply_key(&self, rule: &mut Rule, ignore_case: &mut bool) -> Result<(), String> {
        let val = self.val.as_str();
        match self.key.as_str() {
            "expr" => {
                if !rule.terms.is_empty() {
                    return Err(MSG_EXPR_AND_TERMS.into());
                }
                let expr = Expr::new(val).map_err(|_| MSG_INVALID_EXPR.to_string())?;
                rule.exprs.push(expr);
            }
            "terms" => {
                if !rule.exprs.is_empty() {
                    return Err(MSG_EXPR_AND_TERMS.into());
                }
                rule.terms.extend(split_list(val).map(str::to_string));
            }
            "color" => {
                let color = Color::parse(val).ok_or(MSG_INVALID_COLOR)?;
                rule.format.fg = Some(color);
            }
            "back" => {
                let color = Color::parse(val).ok_or(MSG_INVALID_COLOR)?;
                rule.format.bg = Some(color);
            }
            "group" => {
                rule.group = val.parse().map_err(|_| MSG_INVALID_INT.to_string())?;
            }
            "size" => {
                rule.font_size_delta = val.parse().map_err(|_| MSG_INVALID_INT.to_string())?;
            }
            "style" => {
                let mut unknown = None;
                for style in split_list(val) {
                    match style {
                        "bold" => rule.format.bold = true,
                        "italic" => rule.format.italic = true,
                        "underline" => rule.format.underline = true,
                        "strikeout" => rule.format.strikeout = true,
                        "hyperlink" => {
                            rule.format.anchor = true;
                            rule.hyperlink = true;
                        }
                        other => unknown = Some(format!("Unknown style {}", other)),
                    }
                }
                if let Some(msg) = unknown {
                    return Err(msg);
                }
            }
            "opts" => {
                let mut unknown = None;
                for opt in split_list(val) {
                    match opt {
                        "multiline" => rule.multiline = true,
                        "ignore-case" => *ignore_case = true,
                        other => unknown = Some(format!("Unknown option {}", other)),
                    }
                }
                if let Some(msg) = unknown {
                    return Err(msg);
                }
            }
            _ => return Err(MSG_UNKNOWN_KEY.into()),
        }
        Ok(())
    }

    /// Complete a rule and append it to the spec
    fn finalize_rule(&mut self, mut rule: Rule, spec: &mut Spec, ignore_case: bool) {
        let start_line = self.rule_starts.get(&rule.name).copied();

        if !rule.terms.is_empty() {
            rule.exprs = rule
                .terms
                .iter()
                .filter_map(|term| Expr::term(term).ok())
                .collect();
        }

        if rule.multiline {
            match rule.exprs.len() {
                0 => {
                    self.warning(MSG_MULTILINE_EMPTY, start_line);
                    rule.multiline = false;
                }
                1 => {
                    let same = rule.exprs[0].clone();
                    rule.exprs.push(same);
                }
                _ => rule.exprs.truncate(2),
            }
        }

        if ignore_case {
            let mut exprs = Vec::with_capacity(rule.exprs.len());
            for expr in &rule.exprs {
                match expr.rebuild(true) {
                    Ok(expr) => exprs.push(expr),
                    Err(_) => self.warning(MSG_INVALID_EXPR, start_line),
                }
            }
            rule.exprs = exprs;
        }

        spec.rules.push(rule);
    }

    fn finish(self, mut spec: Spec, mut raw: RawData) -> (Spec, SpecWarnings) {
        if self.with_raw_data {
            raw.code = self.code.join("\n");
            raw.sample = self.sample.join("\n");
            spec.raw = Some(raw);
        }
        (spec, self.warnings)
    }
}

/// Split a comma-separated list, skipping empty items
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a complete spec
///
/// With `with_raw_data` the source code and the sample text are kept in
/// [`Spec::raw`] for editing tools, otherwise reading stops at the
/// sample separator.
pub fn load_spec(text: &str, with_raw_data: bool) -> (Spec, SpecWarnings) {
    SpecLoader::new(text, with_raw_data).load_spec()
}

/// Parse only the header of a spec
///
/// Returns `None` when the required `name` key is missing.
pub fn load_meta(text: &str) -> (Option<Meta>, SpecWarnings) {
    let mut loader = SpecLoader::new(text, false);
    let mut meta = Meta::default();
    let ok = loader.load_meta(&mut meta, None);
    (ok.then_some(meta), loader.warnings)
}
