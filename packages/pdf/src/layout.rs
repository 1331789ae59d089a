//! Block layout over a [`Canvas`].
//!
//! A document is a header plus a list of [`Block`]s. [`Layout::run`] walks
//! them with an explicit [`Phase`] machine:
//!
//! `NewPage -> DrawHeader -> DrawSections -> (NewPage ...) -> DrawFooter -> Done`
//!
//! A block that does not fit at the cursor asks for a page break and is
//! resumed on the next page. Tables resume at the first row not drawn yet
//! and repeat their header row.

use std::collections::VecDeque;

use crate::canvas::{
    Canvas, Font, GREY, HEADER_FILL, PageSize, RULE, Rgb, STRIPE, WHITE, fit_text,
    text_width, wrap_text,
};
use crate::table::{
    Align, BODY_FONT, CELL_PADDING, HEADER_FONT, HEADER_HEIGHT, ROW_HEIGHT, Table,
};

/// Break before the summary heading past this cursor position (mm).
pub const SUMMARY_BREAK_AT: f32 = 240.0;
/// Break before breakdown headings past this cursor position (mm).
pub const BREAKDOWN_BREAK_AT: f32 = 250.0;
/// Break before amount, trend and detail headings past this position (mm).
pub const DETAIL_BREAK_AT: f32 = 260.0;

pub const MARGIN_X: f32 = 14.0;
pub const MARGIN_TOP: f32 = 16.0;
/// Height kept free at the bottom of each page for the footer band.
pub const FOOTER_RESERVE: f32 = 18.0;
/// Room a heading needs below it before the page bottom.
const KEEP_WITH_NEXT: f32 = 15.0;

const HEADING_FONT: Font = Font::bold(12.0);
const TEXT_FONT: Font = Font::regular(9.5);
const LINE_HEIGHT: f32 = 5.5;

/// First-page header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentHeader {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Titled subsection start, preceded by a break when the cursor is
    /// past `break_at`.
    Heading { text: String, break_at: f32 },
    /// Wrapped text.
    Paragraph(String),
    /// Label and value pairs, the value optionally on a coloured badge.
    KeyValues(Vec<(String, String, Option<Rgb>)>),
    Table(Table),
    Spacer(f32),
    /// Forces the next block onto a fresh page.
    PageBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NewPage,
    DrawHeader,
    DrawSections,
    DrawFooter,
    Done,
}

/// What the pagination callback gets for each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber {
    /// 1-based.
    pub number: usize,
    pub total: usize,
}

enum Step {
    Continue,
    Break,
    Finished,
}

/// Outcome of a layout run.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub canvas: Canvas,
    /// Body rows drawn for each table block, in block order.
    pub table_rows: Vec<usize>,
}

pub struct Layout {
    canvas: Canvas,
    header: DocumentHeader,
    blocks: VecDeque<Block>,
    /// Items of the front block already drawn.
    progress: usize,
    cursor: f32,
    content_top: f32,
    table_rows: Vec<usize>,
}

impl Layout {
    #[must_use]
    pub fn new(size: PageSize, header: DocumentHeader, blocks: Vec<Block>) -> Self {
        Self {
            canvas: Canvas::new(size),
            header,
            blocks: blocks.into(),
            progress: 0,
            cursor: MARGIN_TOP,
            content_top: MARGIN_TOP,
            table_rows: Vec::new(),
        }
    }

    fn width(&self) -> f32 {
        2.0f32.mul_add(-MARGIN_X, self.canvas.size().width)
    }

    fn bottom(&self) -> f32 {
        self.canvas.size().height - FOOTER_RESERVE
    }

    /// Section threshold, capped so a heading always keeps room above the
    /// footer band.
    fn effective_break_at(&self, break_at: f32) -> f32 {
        break_at.min(self.bottom() - KEEP_WITH_NEXT)
    }

    fn page_is_fresh(&self) -> bool {
        self.cursor <= self.content_top + f32::EPSILON
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor + height <= self.bottom() || self.page_is_fresh()
    }

    /// Lays every block out, then fires `footer` once per page with the
    /// canvas positioned on that page.
    pub fn run<F>(mut self, mut footer: F) -> Rendered
    where
        F: FnMut(&mut Canvas, PageNumber),
    {
        let mut phase = Phase::NewPage;

        loop {
            phase = match phase {
                Phase::NewPage => {
                    self.canvas.add_page();
                    self.cursor = MARGIN_TOP;
                    Phase::DrawHeader
                }
                Phase::DrawHeader => {
                    self.draw_header();
                    self.content_top = self.cursor;
                    Phase::DrawSections
                }
                Phase::DrawSections => match self.step() {
                    Step::Continue => Phase::DrawSections,
                    Step::Break => {
                        log::debug!(
                            "page break at {:.1}mm on page {}",
                            self.cursor,
                            self.canvas.page_count()
                        );
                        Phase::NewPage
                    }
                    Step::Finished => Phase::DrawFooter,
                },
                Phase::DrawFooter => {
                    let total = self.canvas.page_count();
                    for index in 0..total {
                        self.canvas.select(index);
                        footer(
                            &mut self.canvas,
                            PageNumber {
                                number: index + 1,
                                total,
                            },
                        );
                    }
                    Phase::Done
                }
                Phase::Done => break,
            };
        }

        Rendered {
            canvas: self.canvas,
            table_rows: self.table_rows,
        }
    }

    fn draw_header(&mut self) {
        let right = self.canvas.size().width - MARGIN_X;

        if self.canvas.page_count() == 1 {
            let title_font = Font::bold(16.0).with_color(HEADER_FILL);
            self.cursor += 6.0;
            self.canvas
                .text(MARGIN_X, self.cursor, title_font, self.header.title.clone());
            self.cursor += 2.0;
            for line in self.header.lines.clone() {
                self.cursor += LINE_HEIGHT;
                self.canvas
                    .text(MARGIN_X, self.cursor, Font::regular(10.0).with_color(GREY), line);
            }
            self.cursor += 3.0;
            self.canvas
                .line(MARGIN_X, self.cursor, right, self.cursor, 0.6, HEADER_FILL);
            self.cursor += 7.0;
        } else {
            self.cursor += 2.0;
            self.canvas.text(
                MARGIN_X,
                self.cursor,
                Font::regular(8.0).with_color(GREY),
                self.header.title.clone(),
            );
            self.cursor += 2.0;
            self.canvas
                .line(MARGIN_X, self.cursor, right, self.cursor, 0.3, RULE);
            self.cursor += 6.0;
        }
    }

    fn finish_block(&mut self) {
        self.blocks.pop_front();
        self.progress = 0;
    }

    fn step(&mut self) -> Step {
        let Some(block) = self.blocks.front().cloned() else {
            return Step::Finished;
        };

        match block {
            Block::Heading { text, break_at } => {
                if self.cursor > self.effective_break_at(break_at) && !self.page_is_fresh() {
                    return Step::Break;
                }
                self.cursor += 2.0;
                self.canvas
                    .text(MARGIN_X, self.cursor, HEADING_FONT.with_color(HEADER_FILL), text);
                self.cursor += 5.0;
                self.finish_block();
                Step::Continue
            }
            Block::Paragraph(text) => {
                let lines = wrap_text(&text, TEXT_FONT, self.width());
                while let Some(line) = lines.get(self.progress) {
                    if !self.fits(LINE_HEIGHT) {
                        return Step::Break;
                    }
                    self.cursor += LINE_HEIGHT;
                    self.canvas.text(MARGIN_X, self.cursor, TEXT_FONT, line.clone());
                    self.progress += 1;
                }
                self.cursor += 2.0;
                self.finish_block();
                Step::Continue
            }
            Block::KeyValues(pairs) => {
                let value_x = MARGIN_X + 70.0;
                while let Some((label, value, badge)) = pairs.get(self.progress) {
                    if !self.fits(LINE_HEIGHT + 1.0) {
                        return Step::Break;
                    }
                    self.cursor += LINE_HEIGHT + 1.0;
                    self.canvas
                        .text(MARGIN_X, self.cursor, TEXT_FONT.with_color(GREY), label.clone());
                    let value_font = Font::bold(10.0);
                    if let Some(color) = badge {
                        let w = text_width(value, value_font) + 4.0;
                        self.canvas
                            .fill_rect(value_x - 2.0, self.cursor - 4.2, w, 5.6, *color);
                        self.canvas
                            .text(value_x, self.cursor, value_font.with_color(WHITE), value.clone());
                    } else {
                        self.canvas.text(value_x, self.cursor, value_font, value.clone());
                    }
                    self.progress += 1;
                }
                self.cursor += 4.0;
                self.finish_block();
                Step::Continue
            }
            Block::Table(table) => self.table_step(&table),
            Block::Spacer(height) => {
                self.cursor += height;
                self.finish_block();
                Step::Continue
            }
            Block::PageBreak => {
                self.finish_block();
                if self.page_is_fresh() {
                    Step::Continue
                } else {
                    Step::Break
                }
            }
        }
    }

    fn table_step(&mut self, table: &Table) -> Step {
        if !self.fits(HEADER_HEIGHT + ROW_HEIGHT) {
            return Step::Break;
        }
        if self.progress == 0 {
            self.table_rows.push(0);
        }

        let widths = table.resolve_widths(self.width());
        self.draw_table_header(table, &widths);

        while let Some(row) = table.rows.get(self.progress) {
            if !self.fits(ROW_HEIGHT) {
                return Step::Break;
            }
            let top = self.cursor;
            if self.progress % 2 == 1 {
                self.canvas
                    .fill_rect(MARGIN_X, top, self.width(), ROW_HEIGHT, STRIPE);
            }

            let mut x = MARGIN_X;
            for ((cell, width), column) in row.iter().zip(&widths).zip(&table.columns) {
                let font = cell.fill.map_or(BODY_FONT, |fill| {
                    self.canvas.fill_rect(x, top, *width, ROW_HEIGHT, fill);
                    BODY_FONT.with_color(WHITE)
                });
                let text = fit_text(&cell.text, font, width - 2.0 * CELL_PADDING);
                let baseline = top + ROW_HEIGHT - 1.8;
                match column.align {
                    Align::Left => self.canvas.text(x + CELL_PADDING, baseline, font, text),
                    Align::Right => {
                        self.canvas
                            .text_right(x + width - CELL_PADDING, baseline, font, text);
                    }
                }
                x += width;
            }

            self.cursor += ROW_HEIGHT;
            self.progress += 1;
            if let Some(count) = self.table_rows.last_mut() {
                *count += 1;
            }
        }

        let right = MARGIN_X + self.width();
        self.canvas
            .line(MARGIN_X, self.cursor, right, self.cursor, 0.3, RULE);
        self.cursor += 6.0;
        self.finish_block();
        Step::Continue
    }

    fn draw_table_header(&mut self, table: &Table, widths: &[f32]) {
        let top = self.cursor;
        self.canvas
            .fill_rect(MARGIN_X, top, self.width(), HEADER_HEIGHT, HEADER_FILL);
        let font = HEADER_FONT.with_color(WHITE);
        let baseline = top + HEADER_HEIGHT - 2.2;
        let mut x = MARGIN_X;
        for (column, width) in table.columns.iter().zip(widths) {
            let text = fit_text(&column.header, font, width - 2.0 * CELL_PADDING);
            match column.align {
                Align::Left => self.canvas.text(x + CELL_PADDING, baseline, font, text),
                Align::Right => {
                    self.canvas
                        .text_right(x + width - CELL_PADDING, baseline, font, text);
                }
            }
            x += width;
        }
        self.cursor += HEADER_HEIGHT;
    }
}

/// Default footer: generation stamp on the left, `Page n / N` on the right.
pub fn draw_footer(canvas: &mut Canvas, page: PageNumber, stamp: &str) {
    let size = canvas.size();
    let y = size.height - 10.0;
    let font = Font::regular(8.0).with_color(GREY);
    canvas.line(
        MARGIN_X,
        y - 4.0,
        size.width - MARGIN_X,
        y - 4.0,
        0.3,
        RULE,
    );
    canvas.text(MARGIN_X, y, font, stamp.to_string());
    canvas.text_right(
        size.width - MARGIN_X,
        y,
        font,
        format!("Page {} / {}", page.number, page.total),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn rows_table(n: usize) -> Table {
        let mut table = Table::new(vec![Column::fixed("N", 20.0), Column::auto("Valeur")]);
        for i in 0..n {
            table.push_row(vec![i.to_string().into(), format!("ligne {i}").into()]);
        }
        table
    }

    fn header() -> DocumentHeader {
        DocumentHeader {
            title: "Essai".to_string(),
            lines: vec!["du 01/03/2025 au 31/03/2025".to_string()],
        }
    }

    #[test]
    fn footer_fires_once_per_page() {
        let layout = Layout::new(
            PageSize::PORTRAIT,
            header(),
            vec![Block::Table(rows_table(120))],
        );
        let mut calls = Vec::new();
        let rendered = layout.run(|_, page| calls.push(page));

        let pages = rendered.canvas.page_count();
        assert!(pages > 1);
        assert_eq!(calls.len(), pages);
        assert_eq!(calls.first().map(|p| p.number), Some(1));
        assert!(calls.iter().all(|p| p.total == pages));
    }

    #[test]
    fn table_body_rows_match_input_across_pages() {
        let layout = Layout::new(
            PageSize::LANDSCAPE,
            header(),
            vec![Block::Table(rows_table(75)), Block::Table(rows_table(3))],
        );
        let rendered = layout.run(|_, _| {});
        assert_eq!(rendered.table_rows, vec![75, 3]);

        let header_repeats = rendered
            .canvas
            .pages()
            .iter()
            .filter(|p| p.texts().any(|t| t == "Valeur"))
            .count();
        assert_eq!(header_repeats, rendered.canvas.page_count());
    }

    #[test]
    fn nothing_is_drawn_in_the_footer_band() {
        let layout = Layout::new(
            PageSize::LANDSCAPE,
            header(),
            vec![Block::Table(rows_table(90))],
        );
        let rendered = layout.run(|_, _| {});
        let limit = PageSize::LANDSCAPE.height - FOOTER_RESERVE;
        for page in rendered.canvas.pages() {
            for op in &page.ops {
                if let crate::canvas::DrawOp::Text { y, .. } = op {
                    assert!(*y <= limit);
                }
            }
        }
    }

    #[test]
    fn heading_past_threshold_breaks_first() {
        let mut blocks = vec![Block::Table(rows_table(35))];
        blocks.push(Block::Heading {
            text: "Montants".to_string(),
            break_at: DETAIL_BREAK_AT,
        });
        let rendered = Layout::new(PageSize::PORTRAIT, header(), blocks).run(|_, _| {});

        assert_eq!(rendered.canvas.page_count(), 2);
        assert!(rendered.canvas.pages()[1].texts().any(|t| t == "Montants"));
    }

    #[test]
    fn summary_breaks_earlier_than_breakdown() {
        // The first-page header ends near 40mm, so this lands between the
        // summary and breakdown thresholds.
        let heading_after_spacer = |break_at| {
            let blocks = vec![
                Block::Spacer(205.0),
                Block::Heading {
                    text: "Section".to_string(),
                    break_at,
                },
            ];
            Layout::new(PageSize::PORTRAIT, header(), blocks).run(|_, _| {})
        };

        let summary = heading_after_spacer(SUMMARY_BREAK_AT);
        assert_eq!(summary.canvas.page_count(), 2);
        assert!(summary.canvas.pages()[1].texts().any(|t| t == "Section"));

        let breakdown = heading_after_spacer(BREAKDOWN_BREAK_AT);
        assert_eq!(breakdown.canvas.page_count(), 1);
        assert!(breakdown.canvas.pages()[0].texts().any(|t| t == "Section"));
    }

    #[test]
    fn landscape_threshold_is_capped() {
        let layout = Layout::new(PageSize::LANDSCAPE, header(), vec![]);
        let capped = layout.effective_break_at(SUMMARY_BREAK_AT);
        assert!(capped < PageSize::LANDSCAPE.height - FOOTER_RESERVE);

        let layout = Layout::new(PageSize::PORTRAIT, header(), vec![]);
        assert!((layout.effective_break_at(DETAIL_BREAK_AT) - DETAIL_BREAK_AT).abs() < f32::EPSILON);
    }

    #[test]
    fn page_break_block_starts_fresh_page() {
        let blocks = vec![
            Block::Paragraph("Couverture".to_string()),
            Block::PageBreak,
            Block::Paragraph("Mission".to_string()),
        ];
        let rendered = Layout::new(PageSize::PORTRAIT, header(), blocks).run(|_, _| {});
        assert_eq!(rendered.canvas.page_count(), 2);
        assert!(rendered.canvas.pages()[1].texts().any(|t| t == "Mission"));
    }
}
