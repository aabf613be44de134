//! Answer grid layout
//!
//! Questions run down each column first: with 25 questions per column,
//! question 26 starts the second column.

use crate::constants::{
    GRID_ANSWER_HEADER, GRID_NUMBER_HEADER, MIN_GRID_SUB_COLUMN_WIDTH, TABLE_ROW_HEIGHT,
};
use crate::options::PageGeometry;
use crate::types::{AnswerKeyError, AnswerMap, Result};

/// One filled slot of the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub question: u32,
    pub answer: String,
}

/// Column-major arrangement of question/answer pairs.
///
/// Each grid column is rendered as two table columns (`NO`, `ANS`) of
/// equal width.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Grid columns (each is a NO/ANS pair)
    pub columns: usize,
    /// Body rows, always `questions_per_column`
    pub rows: usize,
    /// Width of every NO and ANS sub-column in points
    pub sub_column_width_pt: f32,
    /// Height of the header and each body row in points
    pub row_height_pt: f32,
    cells: Vec<Option<GridCell>>,
}

impl GridLayout {
    /// Lay out `answers` in columns of `questions_per_column` within
    /// `available_width_pt`.
    pub fn build(
        answers: &AnswerMap,
        questions_per_column: usize,
        available_width_pt: f32,
        row_height_pt: f32,
    ) -> Self {
        let total = answers.total_questions() as usize;
        let columns = if questions_per_column == 0 {
            0
        } else {
            total.div_ceil(questions_per_column)
        };

        let mut cells = Vec::with_capacity(columns * questions_per_column);
        for col in 0..columns {
            for row in 0..questions_per_column {
                let question = col * questions_per_column + row + 1;
                cells.push((question <= total).then(|| GridCell {
                    question: question as u32,
                    answer: answers.display_answer(question as u32).to_string(),
                }));
            }
        }

        let sub_column_width_pt = if columns == 0 {
            0.0
        } else {
            available_width_pt / (columns * 2) as f32
        };

        Self {
            columns,
            rows: questions_per_column,
            sub_column_width_pt,
            row_height_pt,
            cells,
        }
    }

    /// Layout for the answer-key page described by `geometry`. Fails when
    /// the grid would be too wide to read.
    pub fn for_page(answers: &AnswerMap, geometry: &PageGeometry) -> Result<Self> {
        Self::check_fits(answers, geometry)?;
        Ok(Self::build(
            answers,
            geometry.questions_per_column,
            geometry.grid_available_width_pt(),
            TABLE_ROW_HEIGHT,
        ))
    }

    /// Most grid columns that fit across the page at the minimum width
    pub fn max_columns(geometry: &PageGeometry) -> usize {
        (geometry.grid_available_width_pt() / (2.0 * MIN_GRID_SUB_COLUMN_WIDTH)).floor() as usize
    }

    /// Check that `answers` fit on one answer-key page. Returns the number
    /// of grid columns needed.
    pub fn check_fits(answers: &AnswerMap, geometry: &PageGeometry) -> Result<usize> {
        let total = answers.total_questions() as usize;
        let needed = match geometry.questions_per_column {
            0 => 0,
            per_column => total.div_ceil(per_column),
        };

        let fit = Self::max_columns(geometry);
        if needed > fit {
            return Err(AnswerKeyError::AnswerTable(format!(
                "question {} needs {} grid columns but only {} fit on the page",
                total, needed, fit
            )));
        }
        Ok(needed)
    }

    /// Cell at grid `column`, body `row` (both zero-based)
    pub fn cell(&self, column: usize, row: usize) -> Option<&GridCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells[column * self.rows + row].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0
    }

    /// Number of table columns (two per grid column)
    pub fn table_columns(&self) -> usize {
        self.columns * 2
    }

    /// Header row: `NO`, `ANS` repeated once per grid column
    pub fn header(&self) -> Vec<&'static str> {
        (0..self.columns)
            .flat_map(|_| [GRID_NUMBER_HEADER, GRID_ANSWER_HEADER])
            .collect()
    }

    /// Body row `row` as table text; empty slots are two blank cells
    pub fn body_row(&self, row: usize) -> Vec<String> {
        (0..self.columns)
            .flat_map(|col| match self.cell(col, row) {
                Some(cell) => [cell.question.to_string(), cell.answer.clone()],
                None => [String::new(), String::new()],
            })
            .collect()
    }

    /// Rendered table width in points
    pub fn width_pt(&self) -> f32 {
        self.sub_column_width_pt * self.table_columns() as f32
    }

    /// Rendered table height in points (header plus body rows)
    pub fn height_pt(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.rows + 1) as f32 * self.row_height_pt
    }
}
