//! Shared constants for answer-key generation
//!
//! Fixed typography, colours and unit conversions used by the page
//! builders. Page geometry that a caller may want to tune lives in
//! [`PageGeometry`](crate::PageGeometry) instead.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Page Sizes
// =============================================================================

/// A4 width in millimeters; generated pages always use A4
pub const A4_WIDTH_MM: f32 = 210.0;

/// A4 height in millimeters
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Fallback page dimensions in points when a page has no usable MediaBox (US Letter)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (612.0, 792.0);

// =============================================================================
// Titles and Labels
// =============================================================================

pub const ANSWER_KEY_LABEL: &str = "ANSWER KEY";
pub const SOLUTIONS_TITLE: &str = "DETAILED SOLUTIONS";
pub const OUTPUT_SUFFIX: &str = "_WITH_KEY";

pub const GRID_NUMBER_HEADER: &str = "NO";
pub const GRID_ANSWER_HEADER: &str = "ANS";

/// Highest `Key<n>` column accepted in an answer table
pub const MAX_QUESTION_NUMBER: u32 = 1000;

/// Narrowest NO/ANS sub-column the answer grid may use
pub const MIN_GRID_SUB_COLUMN_WIDTH: f32 = 18.0;

pub const SOLUTION_HEADERS: [&str; 3] = ["NO", "ANSWER", "EXPLANATION"];

// =============================================================================
// Typography (points)
// =============================================================================

pub const TITLE_FONT_SIZE: f32 = 16.0;

pub const TABLE_FONT_SIZE: f32 = 10.0;

/// Smallest size a grid answer is shrunk to when it overflows its cell
pub const TABLE_MIN_FONT_SIZE: f32 = 5.0;

/// Grid row height: 12pt leading plus 3pt top and bottom padding
pub const TABLE_ROW_HEIGHT: f32 = 18.0;

/// Horizontal padding inside table cells
pub const CELL_PADDING_X: f32 = 6.0;

/// Vertical padding inside solution rows
pub const CELL_PADDING_Y: f32 = 4.0;

pub const TABLE_GRID_LINE_WIDTH: f32 = 0.5;

pub const SOLUTION_FONT_SIZE: f32 = 10.0;

pub const SOLUTION_LINE_HEIGHT: f32 = 13.0;

/// Approximate cap height as a fraction of font size, used to centre text vertically
pub const CAP_HEIGHT_RATIO: f32 = 0.7;

// =============================================================================
// Watermark
// =============================================================================

pub const DEFAULT_WATERMARK_TEXT: &str = "MURLIDHAR ACADEMY";

pub const WATERMARK_FONT_SIZE: f32 = 60.0;

pub const WATERMARK_OPACITY: f32 = 0.15;

pub const WATERMARK_ROTATION_DEGREES: f32 = 45.0;

/// Grey level of the watermark fill (0 = black, 1 = white)
pub const WATERMARK_GRAY: f32 = 0.5;

// =============================================================================
// Links and Remote Assets
// =============================================================================

pub const DEFAULT_TELEGRAM_LINK: &str = "https://t.me/MurlidharAcademy";

pub const DEFAULT_INSTAGRAM_LINK: &str = "https://www.instagram.com/murlidhar_academy_official/";

pub const DEFAULT_BACKGROUND_URL: &str =
    "https://drive.google.com/file/d/1NUwoSCN2OIWgjPQMPX1VileweKzta_HW/view?usp=sharing";

pub const DEFAULT_FONT_URL: &str = "https://github.com/notofonts/notofonts.github.io/raw/main/fonts/NotoSansGujarati/hinted/ttf/NotoSansGujarati-Regular.ttf";

pub const DEFAULT_FONT_CACHE_FILE: &str = "NotoSansGujarati-Regular.ttf";

/// Upper bound on a downloaded asset, in bytes
pub const MAX_ASSET_BYTES: u64 = 64 * 1024 * 1024;
