use pdf_answer_key::layout::{PaginationConfig, paginate, wrap_entries};
use pdf_answer_key::*;

fn answers(total: u32) -> AnswerMap {
    (1..=total).map(|q| (q, format!("A{}", q))).collect()
}

fn entry(number: usize, explanation: &str) -> SolutionEntry {
    SolutionEntry {
        number: number.to_string(),
        answer: "B".to_string(),
        explanation: explanation.to_string(),
    }
}

#[test]
fn test_grid_thirty_questions() {
    let grid = GridLayout::build(&answers(30), 25, 400.0, 18.0);

    assert_eq!(grid.columns, 2);
    assert_eq!(grid.rows, 25);
    assert_eq!(grid.cell(1, 0).unwrap().question, 26);
    assert_eq!(grid.cell(1, 4).unwrap().question, 30);
    assert!(grid.cell(1, 5).is_none());
    assert_eq!(grid.header(), vec!["NO", "ANS", "NO", "ANS"]);
    assert_eq!(grid.body_row(5), vec!["6", "A6", "", ""]);
}

#[test]
fn test_grid_dimensions() {
    let grid = GridLayout::build(&answers(60), 25, 420.0, 18.0);

    assert_eq!(grid.columns, 3);
    assert!((grid.sub_column_width_pt - 70.0).abs() < 1e-4);
    assert!((grid.width_pt() - 420.0).abs() < 1e-3);
    assert!((grid.height_pt() - 26.0 * 18.0).abs() < 1e-3);
}

#[test]
fn test_grid_empty_answers() {
    let grid = GridLayout::build(&AnswerMap::new(), 25, 400.0, 18.0);

    assert!(grid.is_empty());
    assert_eq!(grid.columns, 0);
    assert!(grid.header().is_empty());
    assert_eq!(grid.height_pt(), 0.0);
}

#[test]
fn test_grid_missing_answer_placeholder() {
    let mut map = AnswerMap::new();
    map.insert(1, "A");
    map.insert(3, "C");
    let grid = GridLayout::build(&map, 25, 400.0, 18.0);

    assert_eq!(grid.cell(0, 1).unwrap().answer, MISSING_ANSWER);
}

#[test]
fn test_grid_for_default_page() {
    let geometry = PageGeometry::default();
    let grid = GridLayout::for_page(&answers(100), &geometry).unwrap();

    assert_eq!(grid.columns, 4);
    assert!((grid.width_pt() - geometry.grid_available_width_pt()).abs() < 1e-3);
}

#[test]
fn test_grid_wider_than_page_rejected() {
    let geometry = PageGeometry::default();
    // 160mm of grid holds 12 columns of two 18pt sub-columns
    assert_eq!(GridLayout::max_columns(&geometry), 12);
    assert_eq!(GridLayout::check_fits(&answers(300), &geometry).unwrap(), 12);

    // One stray high key decides the grid width
    let mut map = answers(2);
    map.insert(1000, "D");
    let err = GridLayout::for_page(&map, &geometry).unwrap_err();

    assert!(matches!(err, AnswerKeyError::AnswerTable(_)));
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
    assert!(GridLayout::check_fits(&answers(301), &geometry).is_err());
}

#[test]
fn test_rows_never_cross_bottom_margin() {
    let geometry = PageGeometry::default();
    let config = PaginationConfig::from_geometry(&geometry);
    let entries: Vec<SolutionEntry> = (1..=80)
        .map(|n| entry(n, &"word ".repeat(n % 40)))
        .collect();

    let wrapped = wrap_entries(&entries, geometry.solution_columns.widths_pt(), &FontSet::builtin());
    let pages = paginate(&wrapped, &config);

    assert!(pages.len() > 1);
    let mut last_index = 0;
    for page in &pages {
        assert!(!page.rows.is_empty());
        for row in &page.rows {
            assert!(row.bottom() >= config.bottom_margin - 1e-3);
            assert!(row.entry_index >= last_index);
            last_index = row.entry_index;
        }
    }
    assert_eq!(last_index, entries.len() - 1);
}

#[test]
fn test_long_explanation_spans_pages() {
    let geometry = PageGeometry::default();
    let config = PaginationConfig::from_geometry(&geometry);
    let long = "This explanation keeps going for a very long time. ".repeat(200);
    let entries = vec![entry(1, "short"), entry(2, &long)];

    let wrapped = wrap_entries(&entries, geometry.solution_columns.widths_pt(), &FontSet::builtin());
    let pages = paginate(&wrapped, &config);

    assert!(pages.len() >= 2);
    let segments: Vec<_> = pages
        .iter()
        .flat_map(|p| p.rows.iter())
        .filter(|r| r.entry_index == 1)
        .collect();
    assert!(segments.len() >= 2);
    assert!(!segments[0].continuation);
    assert!(segments[1..].iter().all(|s| s.continuation));

    // Continuations carry only explanation text
    assert!(segments[1].cells[0].iter().all(String::is_empty));

    let lines: usize = segments.iter().map(|s| s.cells[2].len()).sum();
    assert_eq!(lines, wrapped[1][2].len());

    for row in pages.iter().flat_map(|p| p.rows.iter()) {
        assert!(row.bottom() >= config.bottom_margin - 1e-3);
    }
}

#[test]
fn test_no_entries_no_pages() {
    let config = PaginationConfig::from_geometry(&PageGeometry::default());
    assert!(paginate(&[], &config).is_empty());
}

#[test]
fn test_wrapped_lines_fit_column() {
    let fonts = FontSet::builtin();
    let widths = [40.0, 60.0, 150.0];
    let entries = vec![entry(1, "a reasonably long explanation that must wrap over several lines")];

    let wrapped = wrap_entries(&entries, widths, &fonts);
    assert!(wrapped[0][2].len() > 1);
    for line in &wrapped[0][2] {
        assert!(fonts.regular.text_width(line, 10.0) <= 150.0 - 12.0 + 1e-3);
    }
}
