//! Table drawing helpers shared by the answer grid and the solutions table

use crate::constants::{CAP_HEIGHT_RATIO, CELL_PADDING_X, TABLE_GRID_LINE_WIDTH, TABLE_MIN_FONT_SIZE};
use crate::render::content::{Color, line, stroke_style, text};
use crate::render::page::RegisteredFont;

pub const HEADER_BACKGROUND: Color = Color::from_hex(0x003366);
pub const NUMBER_COLUMN_BACKGROUND: Color = Color::from_hex(0xE0E0E0);
pub const ALTERNATE_ROW_BACKGROUND: Color = Color::from_hex(0xF9F9F9);
pub const GRID_LINE_COLOR: Color = Color::from_hex(0xCCCCCC);

/// Background of body row `index` (zero-based): white, then light grey
pub fn body_row_background(index: usize) -> Color {
    if index % 2 == 0 {
        Color::WHITE
    } else {
        ALTERNATE_ROW_BACKGROUND
    }
}

/// Text centred horizontally and vertically in a cell.
///
/// Text wider than the cell (less padding) is drawn at a smaller size, down
/// to a fixed minimum.
#[allow(clippy::too_many_arguments)]
pub fn centered_cell_text(
    font: &RegisteredFont,
    size: f32,
    cell_x: f32,
    cell_bottom: f32,
    cell_width: f32,
    cell_height: f32,
    color: Color,
    value: &str,
) -> String {
    if value.is_empty() {
        return String::new();
    }

    let inner = (cell_width - 2.0 * CELL_PADDING_X).max(1.0);
    let mut size = size;
    let mut width = font.face.text_width(value, size);
    if width > inner {
        size = (size * inner / width).max(TABLE_MIN_FONT_SIZE);
        width = font.face.text_width(value, size);
    }

    let x = cell_x + (cell_width - width) / 2.0;
    let y = cell_bottom + (cell_height - size * CAP_HEIGHT_RATIO) / 2.0;
    text(font.resource, &font.face, size, x, y, color, value)
}

/// Horizontal rule at every row boundary and vertical rule at every column
/// boundary of a table whose top-left corner is (left, top).
pub fn grid_lines(left: f32, top: f32, column_widths: &[f32], row_heights: &[f32]) -> String {
    let width: f32 = column_widths.iter().sum();
    let height: f32 = row_heights.iter().sum();
    let right = left + width;
    let bottom = top - height;

    let mut ops = String::from("q\n");
    ops.push_str(&stroke_style(GRID_LINE_COLOR, TABLE_GRID_LINE_WIDTH));

    let mut y = top;
    ops.push_str(&line(left, y, right, y));
    for h in row_heights {
        y -= h;
        ops.push_str(&line(left, y, right, y));
    }

    let mut x = left;
    ops.push_str(&line(x, top, x, bottom));
    for w in column_widths {
        x += w;
        ops.push_str(&line(x, top, x, bottom));
    }

    ops.push_str("Q\n");
    ops
}
