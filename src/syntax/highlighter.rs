//! Block highlighter
//!
//! Applies the rules of a [`Spec`] to text one block at a time. Plain
//! rules are matched first, in declaration order. Multiline rules run
//! in a second pass and use the previous block's state to continue a
//! region that was left open.

use std::rc::Rc;

use super::document::TextBuffer;
use super::rules::{BlockState, Expr, Rule};
use super::spec::Spec;
use super::style::{Format, FormatRange};

/// Result of highlighting a single block
#[derive(Debug, Clone, Default)]
pub struct BlockHighlight {
    /// Ranges in the order they were applied
    pub ranges: Vec<FormatRange>,
    /// State at end of block (for the next block)
    pub state: BlockState,
}

/// Highlighter bound to one spec
#[derive(Debug, Clone)]
pub struct Highlighter {
    spec: Rc<Spec>,
}

impl Highlighter {
    pub fn new(spec: Rc<Spec>) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &Rc<Spec> {
        &self.spec
    }

    /// Switch to another spec
    ///
    /// Existing block formats are stale afterwards; call
    /// [`rehighlight`](Self::rehighlight) to recompute them.
    pub fn set_spec(&mut self, spec: Rc<Spec>) {
        self.spec = spec;
    }

    /// Highlight one block of text
    ///
    /// Takes the state of the previous block and returns the ranges
    /// and the state for the next block.
    pub fn highlight_block(
        &self,
        text: &str,
        previous: BlockState,
        default_font_size: f32,
    ) -> BlockHighlight {
        let mut ranges = Vec::new();
        let mut has_multiline = false;

        for rule in &self.spec.rules {
            if rule.multiline {
                has_multiline = true;
                continue;
            }
            for expr in &rule.exprs {
                match_rule(text, rule, expr, default_font_size, &mut ranges);
            }
        }

        let mut state = BlockState::default();
        if has_multiline {
            // Each region rule starts where the previous one stopped
            let mut offset = 0;
            for (region, rule) in self.spec.rules.iter().enumerate() {
                if !rule.multiline {
                    continue;
                }
                match match_region(text, rule, region, offset, previous, &mut ranges) {
                    Some(next) => offset = next,
                    None => {
                        state = BlockState::inside(region);
                        break;
                    }
                }
            }
        }

        BlockHighlight { ranges, state }
    }

    /// Recompute every block of the buffer
    pub fn rehighlight<B: TextBuffer + ?Sized>(&self, buffer: &mut B) {
        let mut previous = BlockState::default();
        for index in 0..buffer.block_count() {
            previous = self.restyle(buffer, index, previous);
        }
    }

    /// Recompute a changed block
    ///
    /// Following blocks are recomputed as long as the state handed to
    /// them differs from what they saw before. Returns the number of
    /// blocks restyled.
    pub fn rehighlight_block<B: TextBuffer + ?Sized>(&self, buffer: &mut B, index: usize) -> usize {
        let mut previous = match index {
            0 => BlockState::default(),
            i => buffer.block_state(i - 1),
        };
        let mut count = 0;
        for i in index..buffer.block_count() {
            let old = buffer.block_state(i);
            previous = self.restyle(buffer, i, previous);
            count += 1;
            if previous == old {
                break;
            }
        }
        count
    }

    fn restyle<B: TextBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        index: usize,
        previous: BlockState,
    ) -> BlockState {
        let result = self.highlight_block(
            buffer.block_text(index),
            previous,
            buffer.default_font_size(),
        );
        buffer.set_block_formats(index, result.ranges);
        buffer.set_block_state(index, result.state);
        result.state
    }
}

/// Style every match of one expression of a plain rule
fn match_rule(
    text: &str,
    rule: &Rule,
    expr: &Expr,
    default_font_size: f32,
    ranges: &mut Vec<FormatRange>,
) {
    let mut pos = 0;
    loop {
        // Capture slots are only needed to style a sub-group
        let (whole, styled) = if rule.group == 0 {
            let Some(m) = expr.find_at(text, pos) else {
                break;
            };
            (m, Some(m))
        } else {
            let Some(caps) = expr.captures_at(text, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let group = caps.get(rule.group).map(|m| (m.start(), m.end()));
            ((whole.start(), whole.end()), group)
        };
        if let Some((start, end)) = styled.filter(|(start, end)| end > start) {
            let mut format = rule.format.clone();
            if rule.hyperlink {
                format.anchor_href = Some(text[start..end].to_string());
            }
            if rule.font_size_delta != 0 {
                format.font_size = Some(default_font_size + rule.font_size_delta as f32);
            }
            ranges.push(FormatRange::new(start, end, format));
        }
        pos = advance(text, whole.0, whole.1);
    }
}

/// Track the region of a multiline rule through one block
///
/// Returns the offset where scanning stopped, or `None` when the
/// region is still open at the end of the block.
fn match_region(
    text: &str,
    rule: &Rule,
    region: usize,
    initial_offset: usize,
    previous: BlockState,
    ranges: &mut Vec<FormatRange>,
) -> Option<usize> {
    let Some((begin, end)) = rule.region_exprs() else {
        return Some(initial_offset);
    };
    let format: &Format = &rule.format;

    let mut start = 0;
    let mut offset = initial_offset;
    let mut inside = previous.is_inside(region);
    loop {
        let expr = if inside { end } else { begin };
        match expr.find_at(text, offset) {
            Some((m_start, m_end)) => {
                if inside {
                    ranges.push(FormatRange::new(start, m_end, format.clone()));
                    inside = false;
                } else {
                    start = m_start;
                    inside = true;
                }
                offset = advance(text, m_start, m_end);
            }
            None if inside => {
                ranges.push(FormatRange::new(start, text.len(), format.clone()));
                return None;
            }
            None => return Some(offset),
        }
    }
}

/// Offset to resume matching after a match
///
/// Empty matches step over one character so scanning always makes
/// progress; past the last character the offset is beyond the text.
fn advance(text: &str, start: usize, end: usize) -> usize {
    if end > start {
        return end;
    }
    match text[end..].chars().next() {
        Some(ch) => end + ch.len_utf8(),
        None => text.len() + 1,
    }
}
