//! Text buffers the highlighter works on
//!
//! A buffer is a sequence of blocks (lines). Each block carries the
//! state left at its end and the format ranges computed for it.

use super::rules::BlockState;
use super::style::{resolve_spans, FormatRange, Span};

/// Default font size in points
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Block storage driven by a [`Highlighter`](super::Highlighter)
pub trait TextBuffer {
    /// Number of blocks
    fn block_count(&self) -> usize;
    /// Text of a block, without the line terminator
    fn block_text(&self, index: usize) -> &str;
    /// State stored at the end of a block
    fn block_state(&self, index: usize) -> BlockState;
    /// Store the state at the end of a block
    fn set_block_state(&mut self, index: usize, state: BlockState);
    /// Replace the format ranges of a block
    fn set_block_formats(&mut self, index: usize, ranges: Vec<FormatRange>);
    /// Font size that rule size offsets are relative to
    fn default_font_size(&self) -> f32;
}

/// A single block of a [`Document`]
#[derive(Debug, Clone, Default)]
pub struct Block {
    text: String,
    state: BlockState,
    formats: Vec<FormatRange>,
}

impl Block {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Format ranges in the order they were applied
    pub fn formats(&self) -> &[FormatRange] {
        &self.formats
    }

    /// Disjoint styled spans, later ranges win
    pub fn spans(&self) -> Vec<Span> {
        resolve_spans(self.text.len(), &self.formats)
    }
}

/// In-memory text buffer
#[derive(Debug, Clone)]
pub struct Document {
    /// Always holds at least one block
    blocks: Vec<Block>,
    default_font_size: f32,
}

impl Document {
    /// Create a document with one empty block
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
            default_font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Create a document with one block per line of text
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        let blocks: Vec<Block> = text.lines().map(Block::new).collect();
        if !blocks.is_empty() {
            doc.blocks = blocks;
        }
        doc
    }

    /// Builder: set the default font size
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Replace the text of a block
    ///
    /// The block's formats are stale until it is highlighted again.
    pub fn set_block_text(&mut self, index: usize, text: impl Into<String>) {
        if let Some(block) = self.blocks.get_mut(index) {
            block.text = text.into();
        }
    }

    /// Insert a block before `index` (or append when past the end)
    pub fn insert_block(&mut self, index: usize, text: impl Into<String>) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, Block::new(text));
    }

    /// Remove a block; the last remaining block is cleared instead
    pub fn remove_block(&mut self, index: usize) {
        if index >= self.blocks.len() {
            return;
        }
        if self.blocks.len() == 1 {
            self.blocks[0] = Block::default();
        } else {
            self.blocks.remove(index);
        }
    }

    /// Whole text with `\n` between blocks
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer for Document {
    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn block_text(&self, index: usize) -> &str {
        self.blocks.get(index).map(|b| b.text.as_str()).unwrap_or("")
    }

    fn block_state(&self, index: usize) -> BlockState {
        self.blocks.get(index).map(|b| b.state).unwrap_or_default()
    }

    fn set_block_state(&mut self, index: usize, state: BlockState) {
        if let Some(block) = self.blocks.get_mut(index) {
            block.state = state;
        }
    }

    fn set_block_formats(&mut self, index: usize, ranges: Vec<FormatRange>) {
        if let Some(block) = self.blocks.get_mut(index) {
            block.formats = ranges;
        }
    }

    fn default_font_size(&self) -> f32 {
        self.default_font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let doc = Document::from_text("one\ntwo\r\nthree");
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.block_text(1), "two");
        assert_eq!(doc.text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_empty_document_has_one_block() {
        let doc = Document::from_text("");
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.block_text(0), "");
    }

    #[test]
    fn test_insert_and_remove() {
        let mut doc = Document::from_text("a\nc");
        doc.insert_block(1, "b");
        doc.insert_block(99, "d");
        assert_eq!(doc.text(), "a\nb\nc\nd");
        doc.remove_block(0);
        assert_eq!(doc.text(), "b\nc\nd");

        let mut single = Document::from_text("only");
        single.remove_block(0);
        assert_eq!(single.block_count(), 1);
        assert_eq!(single.block_text(0), "");
    }

    #[test]
    fn test_state_slot() {
        let mut doc = Document::from_text("x\ny");
        doc.set_block_state(0, BlockState::inside(2));
        assert!(doc.block_state(0).is_inside(2));
        assert!(doc.block_state(1).is_normal());
        assert!(doc.block_state(10).is_normal());
    }

    #[test]
    fn test_font_size() {
        let doc = Document::new().with_font_size(14.0);
        assert_eq!(doc.default_font_size(), 14.0);
        assert_eq!(Document::new().default_font_size(), DEFAULT_FONT_SIZE);
    }
}
