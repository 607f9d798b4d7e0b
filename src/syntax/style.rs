//! Style types for highlighted text
//!
//! This module provides colors, the character format a rule applies,
//! and the styled ranges produced by the highlighter.

/// An RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Named colors accepted by `color:` and `back:` (SVG/CSS names)
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("aliceblue", (240, 248, 255)),
    ("antiquewhite", (250, 235, 215)),
    ("aqua", (0, 255, 255)),
    ("aquamarine", (127, 255, 212)),
    ("azure", (240, 255, 255)),
    ("beige", (245, 245, 220)),
    ("bisque", (255, 228, 196)),
    ("black", (0, 0, 0)),
    ("blanchedalmond", (255, 235, 205)),
    ("blue", (0, 0, 255)),
    ("blueviolet", (138, 43, 226)),
    ("brown", (165, 42, 42)),
    ("burlywood", (222, 184, 135)),
    ("cadetblue", (95, 158, 160)),
    ("chartreuse", (127, 255, 0)),
    ("chocolate", (210, 105, 30)),
    ("coral", (255, 127, 80)),
    ("cornflowerblue", (100, 149, 237)),
    ("cornsilk", (255, 248, 220)),
    ("crimson", (220, 20, 60)),
    ("cyan", (0, 255, 255)),
    ("darkblue", (0, 0, 139)),
    ("darkcyan", (0, 139, 139)),
    ("darkgoldenrod", (184, 134, 11)),
    ("darkgray", (169, 169, 169)),
    ("darkgreen", (0, 100, 0)),
    ("darkgrey", (169, 169, 169)),
    ("darkkhaki", (189, 183, 107)),
    ("darkmagenta", (139, 0, 139)),
    ("darkolivegreen", (85, 107, 47)),
    ("darkorange", (255, 140, 0)),
    ("darkorchid", (153, 50, 204)),
    ("darkred", (139, 0, 0)),
    ("darksalmon", (233, 150, 122)),
    ("darkseagreen", (143, 188, 143)),
    ("darkslateblue", (72, 61, 139)),
    ("darkslategray", (47, 79, 79)),
    ("darkslategrey", (47, 79, 79)),
    ("darkturquoise", (0, 206, 209)),
    ("darkviolet", (148, 0, 211)),
    ("deeppink", (255, 20, 147)),
    ("deepskyblue", (0, 191, 255)),
    ("dimgray", (105, 105, 105)),
    ("dimgrey", (105, 105, 105)),
    ("dodgerblue", (30, 144, 255)),
    ("firebrick", (178, 34, 34)),
    ("floralwhite", (255, 250, 240)),
    ("forestgreen", (34, 139, 34)),
    ("fuchsia", (255, 0, 255)),
    ("gainsboro", (220, 220, 220)),
    ("ghostwhite", (248, 248, 255)),
    ("gold", (255, 215, 0)),
    ("goldenrod", (218, 165, 32)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("green", (0, 128, 0)),
    ("greenyellow", (173, 255, 47)),
    ("honeydew", (240, 255, 240)),
    ("hotpink", (255, 105, 180)),
    ("indianred", (205, 92, 92)),
    ("indigo", (75, 0, 130)),
    ("ivory", (255, 255, 240)),
    ("khaki", (240, 230, 140)),
    ("lavender", (230, 230, 250)),
    ("lavenderblush", (255, 240, 245)),
    ("lawngreen", (124, 252, 0)),
    ("lemonchiffon", (255, 250, 205)),
    ("lightblue", (173, 216, 230)),
    ("lightcoral", (240, 128, 128)),
    ("lightcyan", (224, 255, 255)),
    ("lightgoldenrodyellow", (250, 250, 210)),
    ("lightgray", (211, 211, 211)),
    ("lightgreen", (144, 238, 144)),
    ("lightgrey", (211, 211, 211)),
    ("lightpink", (255, 182, 193)),
    ("lightsalmon", (255, 160, 122)),
    ("lightseagreen", (32, 178, 170)),
    ("lightskyblue", (135, 206, 250)),
    ("lightslategray", (119, 136, 153)),
    ("lightslategrey", (119, 136, 153)),
    ("lightsteelblue", (176, 196, 222)),
    ("lightyellow", (255, 255, 224)),
    ("lime", (0, 255, 0)),
    ("limegreen", (50, 205, 50)),
    ("linen", (250, 240, 230)),
    ("magenta", (255, 0, 255)),
    ("maroon", (128, 0, 0)),
    ("mediumaquamarine", (102, 205, 170)),
    ("mediumblue", (0, 0, 205)),
    ("mediumorchid", (186, 85, 211)),
    ("mediumpurple", (147, 112, 219)),
    ("mediumseagreen", (60, 179, 113)),
    ("mediumslateblue", (123, 104, 238)),
    ("mediumspringgreen", (0, 250, 154)),
    ("mediumturquoise", (72, 209, 204)),
    ("mediumvioletred", (199, 21, 133)),
    ("midnightblue", (25, 25, 112)),
    ("mintcream", (245, 255, 250)),
    ("mistyrose", (255, 228, 225)),
    ("moccasin", (255, 228, 181)),
    ("navajowhite", (255, 222, 173)),
    ("navy", (0, 0, 128)),
    ("oldlace", (253, 245, 230)),
    ("olive", (128, 128, 0)),
    ("olivedrab", (107, 142, 35)),
    ("orange", (255, 165, 0)),
    ("orangered", (255, 69, 0)),
    ("orchid", (218, 112, 214)),
    ("palegoldenrod", (238, 232, 170)),
    ("palegreen", (152, 251, 152)),
    ("paleturquoise", (175, 238, 238)),
    ("palevioletred", (219, 112, 147)),
    ("papayawhip", (255, 239, 213)),
    ("peachpuff", (255, 218, 185)),
    ("peru", (205, 133, 63)),
    ("pink", (255, 192, 203)),
    ("plum", (221, 160, 221)),
    ("powderblue", (176, 224, 230)),
    ("purple", (128, 0, 128)),
    ("red", (255, 0, 0)),
    ("rosybrown", (188, 143, 143)),
    ("royalblue", (65, 105, 225)),
    ("saddlebrown", (139, 69, 19)),
    ("salmon", (250, 128, 114)),
    ("sandybrown", (244, 164, 96)),
    ("seagreen", (46, 139, 87)),
    ("seashell", (255, 245, 238)),
    ("sienna", (160, 82, 45)),
    ("silver", (192, 192, 192)),
    ("skyblue", (135, 206, 235)),
    ("slateblue", (106, 90, 205)),
    ("slategray", (112, 128, 144)),
    ("slategrey", (112, 128, 144)),
    ("snow", (255, 250, 250)),
    ("springgreen", (0, 255, 127)),
    ("steelblue", (70, 130, 180)),
    ("tan", (210, 180, 140)),
    ("teal", (0, 128, 128)),
    ("thistle", (216, 191, 216)),
    ("tomato", (255, 99, 71)),
    ("turquoise", (64, 224, 208)),
    ("violet", (238, 130, 238)),
    ("wheat", (245, 222, 179)),
    ("white", (255, 255, 255)),
    ("whitesmoke", (245, 245, 245)),
    ("yellow", (255, 255, 0)),
    ("yellowgreen", (154, 205, 50)),
];

impl Color {
    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color or an SVG color name
    ///
    /// Hex forms are `#rgb`, `#rrggbb`, `#aarrggbb`, `#rrrgggbbb` and
    /// `#rrrrggggbbbb`; the wide forms are reduced to 8 bits per channel.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let name = value.to_ascii_lowercase();
        if name == "transparent" {
            return Some(Self { r: 0, g: 0, b: 0, a: 0 });
        }
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, (r, g, b))| Self::rgb(*r, *g, *b))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
                Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            9 | 12 => {
                let digits = hex.len() / 3;
                let shift = 4 * (digits as u32 - 2);
                let channel = |i: usize| {
                    u16::from_str_radix(&hex[i * digits..(i + 1) * digits], 16)
                        .ok()
                        .map(|v| (v >> shift) as u8)
                };
                Some(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            8 => Some(Self {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// Format as `#rrggbb` (or `#aarrggbb` when not opaque)
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

/// Character format applied by a rule
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Format {
    /// Foreground color
    pub fg: Option<Color>,
    /// Background color
    pub bg: Option<Color>,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
    /// Struck-out text
    pub strikeout: bool,
    /// Text is an anchor
    pub anchor: bool,
    /// Link target of an anchor
    pub anchor_href: Option<String>,
    /// Absolute font size in points
    pub font_size: Option<f32>,
}

impl Format {
    /// Create a format with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A format applied to a byte range of a block
///
/// Ranges of one block may overlap; the one applied later wins.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatRange {
    /// Byte offset where this range starts (inclusive)
    pub start: usize,
    /// Byte offset where this range ends (exclusive)
    pub end: usize,
    /// Format to apply
    pub format: Format,
}

impl FormatRange {
    /// Create a new range
    pub fn new(start: usize, end: usize, format: Format) -> Self {
        Self { start, end, format }
    }

    /// Check if this range contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the length of this range in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if range is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A styled span of text after overlapping ranges were resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub format: Format,
}

/// Flatten layered ranges into disjoint spans ordered left to right
///
/// Where ranges overlap the later one replaces the earlier one, the
/// same way repeated formatting calls behave in a text editor.
pub fn resolve_spans(len: usize, ranges: &[FormatRange]) -> Vec<Span> {
    let mut owner: Vec<Option<usize>> = vec![None; len];
    for (i, range) in ranges.iter().enumerate() {
        let end = range.end.min(len);
        for slot in owner.iter_mut().take(end).skip(range.start) {
            *slot = Some(i);
        }
    }

    let mut spans: Vec<Span> = Vec::new();
    let mut pos = 0;
    while pos < len {
        let Some(idx) = owner[pos] else {
            pos += 1;
            continue;
        };
        let start = pos;
        while pos < len && owner[pos] == Some(idx) {
            pos += 1;
        }
        spans.push(Span {
            start,
            end: pos,
            format: ranges[idx].format.clone(),
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#0f0"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(
            Color::parse("#80112233"),
            Some(Color { r: 0x11, g: 0x22, b: 0x33, a: 0x80 })
        );
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#gg0000"), None);
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(Color::parse("navy"), Some(Color::rgb(0, 0, 128)));
        assert_eq!(Color::parse("DarkGreen"), Some(Color::rgb(0, 100, 0)));
        assert_eq!(Color::parse("transparent").map(|c| c.a), Some(0));
        assert_eq!(Color::parse("notacolor"), None);
        assert_eq!(Color::parse(""), None);
    }

    #[test]
    fn test_parse_full_svg_name_set() {
        assert_eq!(NAMED_COLORS.len(), 147);
        assert_eq!(Color::parse("wheat"), Some(Color::rgb(245, 222, 179)));
        assert_eq!(Color::parse("aliceblue"), Some(Color::rgb(240, 248, 255)));
        assert_eq!(Color::parse("lightseagreen"), Some(Color::rgb(32, 178, 170)));
        assert_eq!(Color::parse("darkslategrey"), Some(Color::rgb(47, 79, 79)));
        assert_eq!(Color::parse("LightGoldenrodYellow"), Some(Color::rgb(250, 250, 210)));
    }

    #[test]
    fn test_parse_wide_hex_colors() {
        assert_eq!(Color::parse("#fff000fff"), Some(Color::rgb(255, 0, 255)));
        assert_eq!(Color::parse("#800400080"), Some(Color::rgb(128, 64, 8)));
        assert_eq!(Color::parse("#ffff00008000"), Some(Color::rgb(255, 0, 128)));
        assert_eq!(Color::parse("#12345"), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::rgb(0x12, 0xab, 0x00).to_hex(), "#12ab00");
        assert_eq!(Color { r: 1, g: 2, b: 3, a: 4 }.to_hex(), "#04010203");
    }

    #[test]
    fn test_format_default() {
        assert!(Format::default().is_default());
        let format = Format::fg(Color::rgb(1, 2, 3)).with_bold();
        assert!(!format.is_default());
        assert!(format.bold);
    }

    #[test]
    fn test_range_contains() {
        let range = FormatRange::new(5, 10, Format::default());
        assert!(!range.contains(4));
        assert!(range.contains(5));
        assert!(range.contains(9));
        assert!(!range.contains(10));
        assert_eq!(range.len(), 5);
    }

    #[test]
    fn test_resolve_later_range_wins() {
        let red = Format::fg(Color::rgb(255, 0, 0));
        let blue = Format::fg(Color::rgb(0, 0, 255));
        let ranges = vec![
            FormatRange::new(0, 6, red.clone()),
            FormatRange::new(2, 4, blue.clone()),
        ];
        let spans = resolve_spans(8, &ranges);
        assert_eq!(spans.len(), 3);
        assert_eq!((spans[0].start, spans[0].end), (0, 2));
        assert_eq!(spans[0].format, red);
        assert_eq!((spans[1].start, spans[1].end), (2, 4));
        assert_eq!(spans[1].format, blue);
        assert_eq!((spans[2].start, spans[2].end), (4, 6));
    }

    #[test]
    fn test_resolve_clamps_to_length() {
        let ranges = vec![FormatRange::new(3, 100, Format::default().with_italic())];
        let spans = resolve_spans(5, &ranges);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (3, 5));
    }
}
