use crate::constants::MAX_QUESTION_NUMBER;
use crate::types::{AnswerKeyError, AnswerMap, Result};
use std::path::Path;

const KEY_PREFIX: &str = "key";

/// Question number encoded in an answer-key column name.
///
/// Matches `key<digits>` case-insensitively (`Key07` → 7). Anything else,
/// including `key`, `Key7x` and `key0`, is not an answer column.
pub fn question_number_for_column(name: &str) -> Option<u32> {
    let name = name.trim();
    let prefix = name.get(..KEY_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(KEY_PREFIX) {
        return None;
    }

    let suffix = &name[KEY_PREFIX.len()..];
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    suffix.parse::<u32>().ok().filter(|&n| n > 0)
}

/// Parse the answer table from CSV bytes.
///
/// Only the first data row is read. When two columns resolve to the same
/// question number the one further right in the file wins.
pub fn parse_answer_table(data: &[u8]) -> Result<AnswerMap> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();

    let mut key_columns: Vec<(u32, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| question_number_for_column(name).map(|q| (q, idx)))
        .collect();
    // Stable: equal question numbers stay in file order
    key_columns.sort_by_key(|&(question, _)| question);

    if let Some(&(question, idx)) = key_columns.last() {
        if question > MAX_QUESTION_NUMBER {
            return Err(AnswerKeyError::AnswerTable(format!(
                "column '{}' is beyond the last supported question ({})",
                headers.get(idx).unwrap_or_default().trim(),
                MAX_QUESTION_NUMBER
            )));
        }
    }

    let first_row = match reader.records().next() {
        Some(record) => record?,
        None => {
            log::debug!("Answer table has a header but no data rows");
            return Ok(AnswerMap::new());
        }
    };

    let mut answers = AnswerMap::new();
    for (question, idx) in key_columns {
        let value = first_row.get(idx).unwrap_or("").trim();
        answers.insert(question, value);
    }

    log::debug!(
        "Parsed {} answer columns (highest question {})",
        answers.len(),
        answers.total_questions()
    );

    Ok(answers)
}

/// Load and parse an answer table from disk
pub async fn load_answer_table(path: impl AsRef<Path>) -> Result<AnswerMap> {
    let path = path.as_ref().to_owned();

    let contents = tokio::fs::read(&path).await?;

    let answers = tokio::task::spawn_blocking(move || parse_answer_table(&contents)).await??;

    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(question_number_for_column("key1"), Some(1));
        assert_eq!(question_number_for_column("KEY12"), Some(12));
        assert_eq!(question_number_for_column("Key07"), Some(7));
        assert_eq!(question_number_for_column(" key3 "), Some(3));
        assert_eq!(question_number_for_column("key"), None);
        assert_eq!(question_number_for_column("Key7x"), None);
        assert_eq!(question_number_for_column("key-1"), None);
        assert_eq!(question_number_for_column("key0"), None);
        assert_eq!(question_number_for_column("monkey1"), None);
        assert_eq!(question_number_for_column("ke"), None);
        assert_eq!(question_number_for_column("key99999999999"), None);
    }

    #[test]
    fn test_multibyte_column_name_does_not_panic() {
        assert_eq!(question_number_for_column("કી1"), None);
        assert_eq!(question_number_for_column("k€y1"), None);
    }
}
