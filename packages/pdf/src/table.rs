//! Manual tables.

use crate::canvas::{Font, Rgb, text_width};

/// Header row height in millimetres.
pub const HEADER_HEIGHT: f32 = 7.0;
/// Body row height in millimetres.
pub const ROW_HEIGHT: f32 = 6.0;
pub const CELL_PADDING: f32 = 1.5;
/// Narrowest a [`ColumnWidth::Auto`] column is allowed to get.
pub const MIN_AUTO_WIDTH: f32 = 12.0;
/// Extra room given to [`ColumnWidth::Fit`] columns so rounding never
/// truncates their widest cell.
pub const FIT_SLACK: f32 = 0.5;

pub const HEADER_FONT: Font = Font::bold(8.5);
pub const BODY_FONT: Font = Font::regular(8.5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Millimetres.
    Fixed(f32),
    /// Share of the remaining width, proportional to the widest cell.
    Auto,
    /// Exactly as wide as the widest cell, never shrunk. For dates and
    /// figures that must print in full.
    Fit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header cell text.
    pub header: String,
    pub width: ColumnWidth,
    pub align: Align,
}

impl Column {
    #[must_use]
    pub fn fixed(header: &str, width: f32) -> Self {
        Self {
            header: header.to_string(),
            width: ColumnWidth::Fixed(width),
            align: Align::Left,
        }
    }

    #[must_use]
    pub fn auto(header: &str) -> Self {
        Self {
            header: header.to_string(),
            width: ColumnWidth::Auto,
            align: Align::Left,
        }
    }

    #[must_use]
    pub fn fit(header: &str) -> Self {
        Self {
            header: header.to_string(),
            width: ColumnWidth::Fit,
            align: Align::Left,
        }
    }

    #[must_use]
    pub const fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Background colour; the text turns white on a fill.
    pub fill: Option<Rgb>,
}

impl Cell {
    #[must_use]
    pub const fn filled(text: String, fill: Rgb) -> Self {
        Self {
            text,
            fill: Some(fill),
        }
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self { text, fill: None }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    /// Body rows, one cell per column.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    #[must_use]
    pub const fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn widest(&self, column: usize) -> f32 {
        let header = self
            .columns
            .get(column)
            .map_or(0.0, |c| text_width(&c.header, HEADER_FONT));
        self.rows
            .iter()
            .filter_map(|row| row.get(column))
            .map(|cell| text_width(&cell.text, BODY_FONT))
            .fold(header, f32::max)
            + 2.0 * CELL_PADDING
    }

    /// Column widths in millimetres for a table `usable` wide.
    ///
    /// Fit columns take their natural width first. Fixed columns keep their
    /// width unless they overflow what is left, in which case they shrink
    /// proportionally. Auto columns split the remainder in proportion to
    /// their widest cell, with a floor of [`MIN_AUTO_WIDTH`], so any
    /// shrinking lands on them.
    #[must_use]
    pub fn resolve_widths(&self, usable: f32) -> Vec<f32> {
        let natural = (0..self.columns.len())
            .map(|i| self.widest(i))
            .collect::<Vec<_>>();

        let mut fixed_total = 0.0_f32;
        let mut fit_total = 0.0_f32;
        let mut auto_total = 0.0_f32;
        let mut auto_count = 0_u16;
        for (column, natural) in self.columns.iter().zip(&natural) {
            match column.width {
                ColumnWidth::Fixed(w) => fixed_total += w,
                ColumnWidth::Fit => fit_total += natural + FIT_SLACK,
                ColumnWidth::Auto => {
                    auto_total += natural;
                    auto_count += 1;
                }
            }
        }

        let auto_floor = MIN_AUTO_WIDTH * f32::from(auto_count);
        let fixed_budget = usable - fit_total - auto_floor;
        let fixed_scale = if fixed_total > fixed_budget && fixed_total > 0.0 {
            (fixed_budget / fixed_total).max(0.0)
        } else {
            1.0
        };

        let remaining = fixed_total.mul_add(-fixed_scale, usable - fit_total);

        self.columns
            .iter()
            .zip(&natural)
            .map(|(c, natural)| match c.width {
                ColumnWidth::Fixed(w) => w * fixed_scale,
                ColumnWidth::Fit => natural + FIT_SLACK,
                ColumnWidth::Auto => {
                    if auto_total > 0.0 {
                        (remaining * natural / auto_total).max(MIN_AUTO_WIDTH)
                    } else {
                        MIN_AUTO_WIDTH
                    }
                }
            })
            .collect()
    }
}
