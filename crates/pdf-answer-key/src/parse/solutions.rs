use crate::types::SolutionEntry;

const FIELD_DELIMITER: char = '|';

/// Parse one `number | answer | explanation` line.
///
/// Returns `None` for blank lines. Missing fields are empty; any `|` after
/// the second one belongs to the explanation.
pub fn parse_solution_line(line: &str) -> Option<SolutionEntry> {
    if line.trim().is_empty() {
        return None;
    }

    let mut fields = line.splitn(3, FIELD_DELIMITER).map(str::trim);

    Some(SolutionEntry {
        number: fields.next().unwrap_or_default().to_string(),
        answer: fields.next().unwrap_or_default().to_string(),
        explanation: fields.next().unwrap_or_default().to_string(),
    })
}

/// Parse a multi-line solutions block, keeping line order.
pub fn parse_solution_list(text: &str) -> Vec<SolutionEntry> {
    text.lines().filter_map(parse_solution_line).collect()
}
