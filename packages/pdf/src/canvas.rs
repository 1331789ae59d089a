//! Page model.
//!
//! Drawing happens in millimetres from the top-left corner of an A4 page.
//! Pages are plain lists of [`DrawOp`]s; [`crate::writer`] turns them into
//! PDF content streams.

/// 8-bit RGB colour.
pub type Rgb = (u8, u8, u8);

/// Body text.
pub const BLACK: Rgb = (17, 24, 39);
/// Secondary text: header lines and footers.
pub const GREY: Rgb = (107, 114, 128);
/// Table borders and separators.
pub const RULE: Rgb = (209, 213, 219);
/// Table header background and section headings.
pub const HEADER_FILL: Rgb = (30, 64, 175);
pub const WHITE: Rgb = (255, 255, 255);
/// Alternate table row background.
pub const STRIPE: Rgb = (243, 244, 246);

const A4_SHORT: f32 = 210.0;
const A4_LONG: f32 = 297.0;

/// Points per millimetre.
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// Average Helvetica glyph width, as a share of the font size.
const AVG_GLYPH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const PORTRAIT: Self = Self {
        width: A4_SHORT,
        height: A4_LONG,
    };
    pub const LANDSCAPE: Self = Self {
        width: A4_LONG,
        height: A4_SHORT,
    };

    #[must_use]
    pub fn is_landscape(self) -> bool {
        self.width > self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    /// Size in points.
    pub size: f32,
    pub bold: bool,
    pub color: Rgb,
}

impl Font {
    #[must_use]
    pub const fn regular(size: f32) -> Self {
        Self {
            size,
            bold: false,
            color: BLACK,
        }
    }

    #[must_use]
    pub const fn bold(size: f32) -> Self {
        Self {
            size,
            bold: true,
            color: BLACK,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text whose baseline starts at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        font: Font,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Estimated rendered width of `text` in millimetres.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_width(text: &str, font: Font) -> f32 {
    let factor = if font.bold { 1.08 } else { 1.0 };
    text.chars().count() as f32 * font.size * AVG_GLYPH * factor / MM_TO_PT
}

/// Cuts `text` so it fits in `width` millimetres.
#[must_use]
pub fn fit_text(text: &str, font: Font, width: f32) -> String {
    if text_width(text, font) <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width(&format!("{out}.."), font) > width {
            out.pop();
            break;
        }
    }
    format!("{}..", out.trim_end())
}

/// Splits `text` on whitespace into lines no wider than `width`.
#[must_use]
pub fn wrap_text(text: &str, font: Font, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if text_width(&candidate, font) > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// A growing list of pages of one size.
#[derive(Debug, Clone)]
pub struct Canvas {
    size: PageSize,
    pages: Vec<Page>,
    current: usize,
}

impl Canvas {
    #[must_use]
    pub const fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: Vec::new(),
            current: 0,
        }
    }

    #[must_use]
    pub const fn size(&self) -> PageSize {
        self.size
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Appends a blank page and makes it current.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.current = self.pages.len() - 1;
        self.current
    }

    /// Makes an existing page current.
    pub fn select(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current = index;
        }
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.add_page();
        }
        if let Some(page) = self.pages.get_mut(self.current) {
            page.ops.push(op);
        }
    }

    pub fn text(&mut self, x: f32, y: f32, font: Font, text: impl Into<String>) {
        self.push(DrawOp::Text {
            x,
            y,
            font,
            text: text.into(),
        });
    }

    /// Right-aligned text ending at `right`.
    pub fn text_right(&mut self, right: f32, y: f32, font: Font, text: impl Into<String>) {
        let text = text.into();
        let x = right - text_width(&text, font);
        self.text(x, y, font, text);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Rgb) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_land_on_the_current_page() {
        let mut canvas = Canvas::new(PageSize::PORTRAIT);
        canvas.add_page();
        canvas.text(10.0, 10.0, Font::regular(10.0), "un");
        canvas.add_page();
        canvas.text(10.0, 10.0, Font::regular(10.0), "deux");
        canvas.select(0);
        canvas.text(10.0, 20.0, Font::regular(10.0), "trois");

        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.pages()[0].texts().collect::<Vec<_>>(), vec!["un", "trois"]);
        assert_eq!(canvas.pages()[1].texts().collect::<Vec<_>>(), vec!["deux"]);
    }

    #[test]
    fn fit_text_truncates() {
        let font = Font::regular(10.0);
        let long = "Gare de Marseille Saint-Charles, quai principal";
        let fitted = fit_text(long, font, 30.0);
        assert!(fitted.ends_with(".."));
        assert!(text_width(&fitted, font) <= 30.0);
        assert_eq!(fit_text("Nice", font, 30.0), "Nice");
    }

    #[test]
    fn wrap_respects_width() {
        let font = Font::regular(9.0);
        let lines = wrap_text(
            "Plusieurs voyageurs ont franchi la ligne de contrôle avant l'arrivée des agents",
            font,
            50.0,
        );
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, font) <= 50.0));
    }

    #[test]
    fn landscape_is_wider() {
        assert!(PageSize::LANDSCAPE.is_landscape());
        assert!(!PageSize::PORTRAIT.is_landscape());
    }
}
