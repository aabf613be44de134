use crate::constants::*;
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular hit region on a generated page, in millimeters from the
/// bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkRegion {
    pub left_mm: f32,
    pub bottom_mm: f32,
    pub right_mm: f32,
    pub top_mm: f32,
}

impl LinkRegion {
    pub const fn new(left_mm: f32, bottom_mm: f32, right_mm: f32, top_mm: f32) -> Self {
        Self {
            left_mm,
            bottom_mm,
            right_mm,
            top_mm,
        }
    }

    /// `[llx, lly, urx, ury]` in points
    pub fn to_pt(&self) -> [f32; 4] {
        [
            mm_to_pt(self.left_mm),
            mm_to_pt(self.bottom_mm),
            mm_to_pt(self.right_mm),
            mm_to_pt(self.top_mm),
        ]
    }
}

/// Fixed column widths of the detailed-solutions table
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolutionColumns {
    pub number_mm: f32,
    pub answer_mm: f32,
    pub explanation_mm: f32,
}

impl Default for SolutionColumns {
    fn default() -> Self {
        Self {
            number_mm: 15.0,
            answer_mm: 40.0,
            explanation_mm: 125.0,
        }
    }
}

impl SolutionColumns {
    pub fn total_mm(&self) -> f32 {
        self.number_mm + self.answer_mm + self.explanation_mm
    }

    /// Column widths in points, in drawing order
    pub fn widths_pt(&self) -> [f32; 3] {
        [
            mm_to_pt(self.number_mm),
            mm_to_pt(self.answer_mm),
            mm_to_pt(self.explanation_mm),
        ]
    }
}

/// Layout of every generated page. All lengths are millimeters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Title baseline, measured down from the top edge
    pub title_from_top_mm: f32,
    /// Gap between the title baseline and the top of the table
    pub table_gap_mm: f32,
    /// Left margin of the answer grid
    pub grid_left_margin_mm: f32,
    /// Right margin of the answer grid
    pub grid_right_margin_mm: f32,
    pub questions_per_column: usize,
    /// Left edge of the solutions table
    pub solution_left_margin_mm: f32,
    /// No solution row may extend below this line
    pub solution_bottom_margin_mm: f32,
    pub solution_columns: SolutionColumns,
    pub telegram_region: LinkRegion,
    pub instagram_region: LinkRegion,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            title_from_top_mm: 63.5,
            table_gap_mm: 10.0,
            grid_left_margin_mm: 25.0,
            grid_right_margin_mm: 25.0,
            questions_per_column: 25,
            solution_left_margin_mm: 15.0,
            solution_bottom_margin_mm: 55.0,
            solution_columns: SolutionColumns::default(),
            telegram_region: LinkRegion::new(10.0, 5.0, 110.0, 50.0),
            instagram_region: LinkRegion::new(110.0, 5.0, 210.0, 50.0),
        }
    }
}

impl PageGeometry {
    pub fn page_size_pt(&self) -> (f32, f32) {
        (mm_to_pt(self.page_width_mm), mm_to_pt(self.page_height_mm))
    }

    /// Title baseline in points from the bottom edge
    pub fn title_y_pt(&self) -> f32 {
        mm_to_pt(self.page_height_mm - self.title_from_top_mm)
    }

    /// Top edge of the table under the title, in points
    pub fn table_top_pt(&self) -> f32 {
        self.title_y_pt() - mm_to_pt(self.table_gap_mm)
    }

    /// Width available to the answer grid, in points
    pub fn grid_available_width_pt(&self) -> f32 {
        mm_to_pt(self.page_width_mm - self.grid_left_margin_mm - self.grid_right_margin_mm)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_width_mm <= 0.0 || self.page_height_mm <= 0.0 {
            return Err(AnswerKeyError::Config(
                "Page dimensions must be positive".to_string(),
            ));
        }

        if self.questions_per_column == 0 {
            return Err(AnswerKeyError::Config(
                "Questions per column must be at least 1".to_string(),
            ));
        }

        if self.grid_available_width_pt() <= 0.0 {
            return Err(AnswerKeyError::Config(
                "Grid margins leave no room for the table".to_string(),
            ));
        }

        let columns = &self.solution_columns;
        if columns.number_mm <= 0.0 || columns.answer_mm <= 0.0 || columns.explanation_mm <= 0.0
        {
            return Err(AnswerKeyError::Config(
                "Solution column widths must be positive".to_string(),
            ));
        }

        if self.solution_left_margin_mm + columns.total_mm() > self.page_width_mm {
            return Err(AnswerKeyError::Config(format!(
                "Solution table ({:.1}mm from a {:.1}mm margin) is wider than the page",
                columns.total_mm(),
                self.solution_left_margin_mm
            )));
        }

        // Header row plus at least one line of text must fit between the title and the margin
        let content_top = self.table_top_pt() - TABLE_ROW_HEIGHT;
        let min_row = SOLUTION_LINE_HEIGHT + 2.0 * CELL_PADDING_Y;
        if content_top - mm_to_pt(self.solution_bottom_margin_mm) < min_row {
            return Err(AnswerKeyError::Config(
                "Solution bottom margin leaves no room for a single row".to_string(),
            ));
        }

        Ok(())
    }
}

/// Everything a generation run can be configured with
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GenerationOptions {
    pub watermark_text: String,
    pub telegram_link: String,
    pub instagram_link: String,
    /// Append the detailed-solutions section when solution text is supplied
    pub include_solutions: bool,
    /// Background used when none is uploaded; share links are converted to direct downloads
    pub background_url: String,
    /// TrueType font used for generated text when solutions are included
    pub font_url: String,
    /// Where the downloaded font is kept between runs
    pub font_cache_path: PathBuf,
    pub geometry: PageGeometry,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            watermark_text: DEFAULT_WATERMARK_TEXT.to_string(),
            telegram_link: DEFAULT_TELEGRAM_LINK.to_string(),
            instagram_link: DEFAULT_INSTAGRAM_LINK.to_string(),
            include_solutions: true,
            background_url: DEFAULT_BACKGROUND_URL.to_string(),
            font_url: DEFAULT_FONT_URL.to_string(),
            font_cache_path: PathBuf::from(DEFAULT_FONT_CACHE_FILE),
            geometry: PageGeometry::default(),
        }
    }
}

impl GenerationOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| AnswerKeyError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnswerKeyError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.watermark_text.trim().is_empty() {
            return Err(AnswerKeyError::Config(
                "Watermark text must not be empty".to_string(),
            ));
        }

        self.geometry.validate()
    }
}
