//! Detailed-solutions pagination
//!
//! Rows are placed top to bottom under a repeated header. A row that would
//! cross the bottom margin starts a new page. A row taller than an entire
//! fresh page is split line-by-line across pages; its continuation segments
//! keep only the lines that did not fit.

use crate::constants::{
    CELL_PADDING_X, CELL_PADDING_Y, SOLUTION_FONT_SIZE, SOLUTION_LINE_HEIGHT, TABLE_ROW_HEIGHT,
    mm_to_pt,
};
use crate::font::FontSet;
use crate::layout::wrap::wrap_text;
use crate::options::PageGeometry;
use crate::types::SolutionEntry;

/// Tolerance for float comparisons against the bottom margin
const EPSILON: f32 = 1e-3;

/// Wrapped text of one entry: number, answer and explanation lines
pub type WrappedCells = [Vec<String>; 3];

/// Vertical limits for solution rows on every page, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationConfig {
    /// Top of the first row (just below the header row)
    pub content_top: f32,
    /// No row may extend below this line
    pub bottom_margin: f32,
    pub line_height: f32,
    /// Space above and below the text inside a row
    pub padding: f32,
}

impl PaginationConfig {
    pub fn from_geometry(geometry: &PageGeometry) -> Self {
        Self {
            content_top: geometry.table_top_pt() - TABLE_ROW_HEIGHT,
            bottom_margin: mm_to_pt(geometry.solution_bottom_margin_mm),
            line_height: SOLUTION_LINE_HEIGHT,
            padding: CELL_PADDING_Y,
        }
    }

    pub fn row_height(&self, lines: usize) -> f32 {
        lines as f32 * self.line_height + 2.0 * self.padding
    }

    /// Lines that fit between `top` and the bottom margin
    fn lines_below(&self, top: f32) -> usize {
        let space = top - self.bottom_margin - 2.0 * self.padding;
        if space < self.line_height - EPSILON {
            return 0;
        }
        ((space + EPSILON) / self.line_height).floor() as usize
    }

    /// Lines that fit on a page with no rows yet (at least one)
    pub fn lines_per_page(&self) -> usize {
        self.lines_below(self.content_top).max(1)
    }
}

/// A row segment positioned on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    /// Index into the entry list this segment came from
    pub entry_index: usize,
    /// True for the second and later segments of a split row
    pub continuation: bool,
    /// Top edge in points
    pub top: f32,
    pub height: f32,
    pub cells: WrappedCells,
}

impl PlacedRow {
    pub fn bottom(&self) -> f32 {
        self.top - self.height
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionPage {
    pub rows: Vec<PlacedRow>,
}

/// Wrap each entry's cells to the fixed column widths (points). Number and
/// answer use the bold face, explanations the regular one.
pub fn wrap_entries(
    entries: &[SolutionEntry],
    column_widths: [f32; 3],
    fonts: &FontSet,
) -> Vec<WrappedCells> {
    let inner = column_widths.map(|w| (w - 2.0 * CELL_PADDING_X).max(1.0));
    let bold = |s: &str| fonts.bold.text_width(s, SOLUTION_FONT_SIZE);
    let regular = |s: &str| fonts.regular.text_width(s, SOLUTION_FONT_SIZE);

    entries
        .iter()
        .map(|entry| {
            [
                wrap_text(&entry.number, inner[0], bold),
                wrap_text(&entry.answer, inner[1], bold),
                wrap_text(&entry.explanation, inner[2], regular),
            ]
        })
        .collect()
}

/// Place wrapped rows onto as many pages as needed.
///
/// Returns no pages for an empty list.
pub fn paginate(rows: &[WrappedCells], config: &PaginationConfig) -> Vec<SolutionPage> {
    let mut paginator = Paginator::new(config);
    for (index, cells) in rows.iter().enumerate() {
        paginator.push_entry(index, cells);
    }
    paginator.finish()
}

struct Paginator<'a> {
    config: &'a PaginationConfig,
    pages: Vec<SolutionPage>,
    current: SolutionPage,
    cursor: f32,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a PaginationConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: SolutionPage::default(),
            cursor: config.content_top,
        }
    }

    fn break_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = self.config.content_top;
    }

    fn push_entry(&mut self, entry_index: usize, cells: &WrappedCells) {
        let total = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let per_page = self.config.lines_per_page();
        let oversized = total > per_page;

        let mut start = 0;
        while start < total {
            let remaining = total - start;
            let fits = self.config.lines_below(self.cursor);

            if remaining <= fits {
                self.place(entry_index, cells, start, remaining);
                return;
            }

            if oversized && fits > 0 {
                self.place(entry_index, cells, start, fits);
                start += fits;
            } else if self.current.rows.is_empty() {
                // Fresh page that still cannot hold one line; force progress
                self.place(entry_index, cells, start, remaining.min(per_page));
                start += remaining.min(per_page);
                if start >= total {
                    return;
                }
            }

            self.break_page();
        }
    }

    fn place(&mut self, entry_index: usize, cells: &WrappedCells, start: usize, lines: usize) {
        let segment = cells
            .clone()
            .map(|column| column.into_iter().skip(start).take(lines).collect());
        let height = self.config.row_height(lines);

        self.current.rows.push(PlacedRow {
            entry_index,
            continuation: start > 0,
            top: self.cursor,
            height,
            cells: segment,
        });
        self.cursor -= height;
    }

    fn finish(mut self) -> Vec<SolutionPage> {
        if !self.current.rows.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}
