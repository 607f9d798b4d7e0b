//! Built-in highlighter definitions
//!
//! These `.phl` files are compiled into the crate and served by
//! [`BundledStorage`](super::BundledStorage).

const BUNDLED: &[(&str, &str)] = &[
    ("c", include_str!("c.phl")),
    ("rust", include_str!("rust.phl")),
    ("python", include_str!("python.phl")),
    ("toml", include_str!("toml.phl")),
    ("markdown", include_str!("markdown.phl")),
    ("phl", include_str!("phl.phl")),
];

/// Ids of all bundled definitions
pub fn ids() -> impl Iterator<Item = &'static str> {
    BUNDLED.iter().map(|(id, _)| *id)
}

/// Source text of a bundled definition
pub fn bundled(id: &str) -> Option<&'static str> {
    BUNDLED
        .iter()
        .find(|(bundled_id, _)| *bundled_id == id)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::document::{Document, TextBuffer};
    use crate::syntax::loader::load_spec;
    use crate::syntax::Highlighter;
    use std::rc::Rc;

    fn highlight_sample(id: &str) -> Document {
        let (spec, _) = load_spec(bundled(id).unwrap(), true);
        let mut doc = Document::from_text(spec.raw_sample());
        Highlighter::new(Rc::new(spec)).rehighlight(&mut doc);
        doc
    }

    #[test]
    fn test_lookup() {
        assert!(bundled("rust").is_some());
        assert!(bundled("cobol").is_none());
        assert_eq!(ids().count(), BUNDLED.len());
    }

    #[test]
    fn test_c_block_comment_spans_lines() {
        let doc = highlight_sample("c");
        // "/* Entry point," opens the comment, the next line closes it
        assert!(doc.block_state(2).is_inside(8));
        assert!(doc.block_state(3).is_normal());
        assert!(!doc.block(3).unwrap().formats().is_empty());
    }

    #[test]
    fn test_python_docstring() {
        let doc = highlight_sample("python");
        assert!(doc.block_text(2).contains("\"\"\"A point,"));
        assert!(doc.block_state(2).region().is_some());
        assert!(doc.block_state(3).is_normal());
    }

    #[test]
    fn test_rust_keywords_and_comment() {
        let doc = highlight_sample("rust");
        let main_line = doc
            .blocks()
            .iter()
            .find(|b| b.text().starts_with("fn main"))
            .unwrap();
        assert!(main_line.spans().iter().any(|s| s.start == 0 && s.end == 2));
        assert!(main_line.spans().iter().any(|s| s.start == 3 && s.end == 7));
    }
}
