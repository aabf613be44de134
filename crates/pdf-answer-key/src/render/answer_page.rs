//! Answer-key page: template, centred title and the answer grid

use crate::constants::{TABLE_FONT_SIZE, TITLE_FONT_SIZE};
use crate::layout::GridLayout;
use crate::options::PageGeometry;
use crate::render::content::{Color, fill_rect, text};
use crate::render::page::{GeneratedPages, PageFonts, RegisteredFont};
use crate::render::table::{
    HEADER_BACKGROUND, NUMBER_COLUMN_BACKGROUND, body_row_background, centered_cell_text,
    grid_lines,
};
use crate::render::template::PageTemplate;
use crate::types::Result;
use lopdf::ObjectId;

/// Build the single answer-key page and append it to `pages`.
///
/// An empty grid (no questions) produces a page with the title only.
pub fn build_answer_key_page(
    pages: &mut GeneratedPages,
    template: &PageTemplate,
    fonts: &PageFonts,
    geometry: &PageGeometry,
    title: &str,
    grid: &GridLayout,
) -> Result<ObjectId> {
    let (page_width, _) = geometry.page_size_pt();

    let mut page = template.begin_page();
    page.use_font(&fonts.regular);
    page.use_font(&fonts.bold);

    page.push(&centered_title(&fonts.bold, page_width, geometry.title_y_pt(), title));

    if grid.is_empty() {
        log::warn!("Answer table has no questions; answer-key page has a title only");
    } else {
        let left = (page_width - grid.width_pt()) / 2.0;
        page.push(&draw_grid(grid, fonts, left, geometry.table_top_pt()));
    }

    pages.add_page(page)
}

/// White bold title centred on the page at baseline `y`
pub(crate) fn centered_title(font: &RegisteredFont, page_width: f32, y: f32, title: &str) -> String {
    let width = font.face.text_width(title, TITLE_FONT_SIZE);
    let x = (page_width - width) / 2.0;
    text(font.resource, &font.face, TITLE_FONT_SIZE, x, y, Color::WHITE, title)
}

/// Content for the grid table with its top-left corner at (left, top)
fn draw_grid(grid: &GridLayout, fonts: &PageFonts, left: f32, top: f32) -> String {
    let cell_w = grid.sub_column_width_pt;
    let row_h = grid.row_height_pt;
    let table_w = grid.width_pt();
    let mut ops = String::new();

    // Backgrounds: header band, alternating body rows, then NO columns on top
    ops.push_str(&fill_rect(left, top - row_h, table_w, row_h, HEADER_BACKGROUND));
    for row in 0..grid.rows {
        let bottom = top - (row + 2) as f32 * row_h;
        ops.push_str(&fill_rect(left, bottom, table_w, row_h, body_row_background(row)));
    }
    let body_h = grid.rows as f32 * row_h;
    for col in 0..grid.columns {
        let x = left + (col * 2) as f32 * cell_w;
        ops.push_str(&fill_rect(x, top - row_h - body_h, cell_w, body_h, NUMBER_COLUMN_BACKGROUND));
    }

    let column_widths = vec![cell_w; grid.table_columns()];
    let row_heights = vec![row_h; grid.rows + 1];
    ops.push_str(&grid_lines(left, top, &column_widths, &row_heights));

    for (idx, label) in grid.header().iter().enumerate() {
        let x = left + idx as f32 * cell_w;
        ops.push_str(&centered_cell_text(
            &fonts.bold,
            TABLE_FONT_SIZE,
            x,
            top - row_h,
            cell_w,
            row_h,
            Color::WHITE,
            label,
        ));
    }

    for row in 0..grid.rows {
        let bottom = top - (row + 2) as f32 * row_h;
        for (idx, value) in grid.body_row(row).iter().enumerate() {
            let font = if idx % 2 == 0 { &fonts.bold } else { &fonts.regular };
            let x = left + idx as f32 * cell_w;
            ops.push_str(&centered_cell_text(
                font,
                TABLE_FONT_SIZE,
                x,
                bottom,
                cell_w,
                row_h,
                Color::BLACK,
                value,
            ));
        }
    }

    ops
}
