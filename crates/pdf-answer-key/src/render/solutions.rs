//! Detailed-solutions pages
//!
//! Every page repeats the template, the title and the column header; rows
//! come from [`paginate`](crate::layout::paginate).

use crate::constants::{
    CAP_HEIGHT_RATIO, CELL_PADDING_X, CELL_PADDING_Y, SOLUTION_FONT_SIZE, SOLUTION_HEADERS,
    SOLUTION_LINE_HEIGHT, SOLUTIONS_TITLE, TABLE_FONT_SIZE, TABLE_ROW_HEIGHT, mm_to_pt,
};
use crate::font::FontSet;
use crate::layout::{PaginationConfig, PlacedRow, SolutionPage, paginate, wrap_entries};
use crate::options::PageGeometry;
use crate::render::answer_page::centered_title;
use crate::render::content::{Color, fill_rect, text};
use crate::render::page::{GeneratedPages, PageFonts};
use crate::render::table::{
    HEADER_BACKGROUND, NUMBER_COLUMN_BACKGROUND, body_row_background, centered_cell_text,
    grid_lines,
};
use crate::render::template::PageTemplate;
use crate::types::{Result, SolutionEntry};

/// Wrap and paginate `entries` without drawing anything
pub fn layout_solutions(
    entries: &[SolutionEntry],
    fonts: &FontSet,
    geometry: &PageGeometry,
) -> Vec<SolutionPage> {
    let wrapped = wrap_entries(entries, geometry.solution_columns.widths_pt(), fonts);
    paginate(&wrapped, &PaginationConfig::from_geometry(geometry))
}

/// Render the solutions section and append its pages. Returns the number of
/// pages added (0 for no entries).
pub fn build_solution_pages(
    pages: &mut GeneratedPages,
    template: &PageTemplate,
    fonts: &PageFonts,
    geometry: &PageGeometry,
    entries: &[SolutionEntry],
) -> Result<usize> {
    let font_set = FontSet {
        regular: fonts.regular.face.clone(),
        bold: fonts.bold.face.clone(),
    };
    let layout = layout_solutions(entries, &font_set, geometry);

    let (page_width, _) = geometry.page_size_pt();
    let left = mm_to_pt(geometry.solution_left_margin_mm);
    let widths = geometry.solution_columns.widths_pt();
    let header_top = geometry.table_top_pt();

    for (page_index, solution_page) in layout.iter().enumerate() {
        let mut page = template.begin_page();
        page.use_font(&fonts.regular);
        page.use_font(&fonts.bold);

        page.push(&centered_title(
            &fonts.bold,
            page_width,
            geometry.title_y_pt(),
            SOLUTIONS_TITLE,
        ));
        page.push(&draw_header(fonts, left, header_top, &widths));

        for row in &solution_page.rows {
            page.push(&draw_row(fonts, left, &widths, row));
        }

        log::debug!(
            "Solutions page {} holds {} rows",
            page_index + 1,
            solution_page.rows.len()
        );
        pages.add_page(page)?;
    }

    Ok(layout.len())
}

fn draw_header(fonts: &PageFonts, left: f32, top: f32, widths: &[f32; 3]) -> String {
    let total: f32 = widths.iter().sum();
    let bottom = top - TABLE_ROW_HEIGHT;

    let mut ops = fill_rect(left, bottom, total, TABLE_ROW_HEIGHT, HEADER_BACKGROUND);
    ops.push_str(&grid_lines(left, top, widths, &[TABLE_ROW_HEIGHT]));

    let mut x = left;
    for (label, width) in SOLUTION_HEADERS.iter().zip(widths) {
        ops.push_str(&centered_cell_text(
            &fonts.bold,
            TABLE_FONT_SIZE,
            x,
            bottom,
            *width,
            TABLE_ROW_HEIGHT,
            Color::WHITE,
            label,
        ));
        x += width;
    }

    ops
}

fn draw_row(fonts: &PageFonts, left: f32, widths: &[f32; 3], row: &PlacedRow) -> String {
    let total: f32 = widths.iter().sum();
    let bottom = row.bottom();

    let mut ops = fill_rect(left, bottom, total, row.height, body_row_background(row.entry_index));
    ops.push_str(&fill_rect(left, bottom, widths[0], row.height, NUMBER_COLUMN_BACKGROUND));
    ops.push_str(&grid_lines(left, row.top, widths, &[row.height]));

    let first_baseline = row.top
        - CELL_PADDING_Y
        - (SOLUTION_LINE_HEIGHT + SOLUTION_FONT_SIZE * CAP_HEIGHT_RATIO) / 2.0;

    let mut x = left;
    for (column, (lines, width)) in row.cells.iter().zip(widths).enumerate() {
        let font = if column == 2 { &fonts.regular } else { &fonts.bold };
        for (i, value) in lines.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let y = first_baseline - i as f32 * SOLUTION_LINE_HEIGHT;
            let text_x = if column == 0 {
                x + (width - font.face.text_width(value, SOLUTION_FONT_SIZE)) / 2.0
            } else {
                x + CELL_PADDING_X
            };
            ops.push_str(&text(
                font.resource,
                &font.face,
                SOLUTION_FONT_SIZE,
                text_x,
                y,
                Color::BLACK,
                value,
            ));
        }
        x += width;
    }

    ops
}
