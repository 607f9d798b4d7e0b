//! Terminal rendering of highlighted documents using crossterm

use std::io::Write;

use crossterm::{
    queue,
    style::{
        Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
};

use crate::error::Result;
use crate::syntax::{Color, Document, Format, Span};

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Emit the escape sequences for a format
///
/// Font sizes have no terminal equivalent and are dropped. Anchors are
/// shown underlined.
fn apply_format<W: Write>(out: &mut W, format: &Format) -> Result<()> {
    if let Some(fg) = format.fg.filter(|c| c.a > 0) {
        queue!(out, SetForegroundColor(term_color(fg)))?;
    }
    if let Some(bg) = format.bg.filter(|c| c.a > 0) {
        queue!(out, SetBackgroundColor(term_color(bg)))?;
    }
    if format.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if format.italic {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if format.underline || format.anchor {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if format.strikeout {
        queue!(out, SetAttribute(Attribute::CrossedOut))?;
    }
    Ok(())
}

fn reset<W: Write>(out: &mut W) -> Result<()> {
    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
    Ok(())
}

/// Write one line of text with its styled spans
fn render_line<W: Write>(out: &mut W, text: &str, spans: &[Span]) -> Result<()> {
    let mut pos = 0;
    for span in spans {
        let before = text.get(pos..span.start);
        let styled = text.get(span.start..span.end);
        let (Some(before), Some(styled)) = (before, styled) else {
            continue;
        };
        queue!(out, Print(before))?;
        apply_format(out, &span.format)?;
        queue!(out, Print(styled))?;
        reset(out)?;
        pos = span.end;
    }
    queue!(out, Print(text.get(pos..).unwrap_or("")), Print('\n'))?;
    Ok(())
}

/// Write a highlighted document
///
/// With `color` off only the text is written.
pub fn render_document<W: Write>(out: &mut W, doc: &Document, color: bool) -> Result<()> {
    for block in doc.blocks() {
        if color {
            render_line(out, block.text(), &block.spans())?;
        } else {
            writeln!(out, "{}", block.text())?;
        }
    }
    out.flush()?;
    Ok(())
}
