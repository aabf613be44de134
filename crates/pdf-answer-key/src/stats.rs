use crate::font::FontSet;
use crate::layout::GridLayout;
use crate::options::PageGeometry;
use crate::render::layout_solutions;
use crate::types::*;
use lopdf::Document;

/// Work out what a run would produce without rendering or writing anything
pub fn calculate_statistics(
    source: &Document,
    answers: &AnswerMap,
    entries: &[SolutionEntry],
    fonts: &FontSet,
    geometry: &PageGeometry,
) -> Result<GenerationStatistics> {
    let source_pages = source.get_pages().len();
    if source_pages == 0 {
        return Err(AnswerKeyError::NoPages);
    }

    let grid = GridLayout::for_page(answers, geometry)?;
    let solution_pages = layout_solutions(entries, fonts, geometry).len();

    // One answer-key page plus the solutions
    let generated_pages = 1 + solution_pages;

    Ok(GenerationStatistics {
        source_pages,
        total_questions: answers.total_questions(),
        grid_columns: grid.columns,
        solution_entries: entries.len(),
        solution_pages,
        generated_pages,
        output_pages: source_pages + generated_pages,
    })
}
