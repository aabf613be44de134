//! Document I/O and file naming

use crate::constants::{ANSWER_KEY_LABEL, OUTPUT_SUFFIX};
use crate::types::{AnswerKeyError, Result};
use lopdf::Document;
use std::path::{Path, PathBuf};

/// Read a required input file. A missing file is reported as
/// [`AnswerKeyError::InputMissing`] naming `what`.
pub async fn read_input(path: impl AsRef<Path>, what: &str) -> Result<Vec<u8>> {
    let path = path.as_ref();
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AnswerKeyError::InputMissing(
            format!("{} not found at {}", what, path.display()),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Read a required UTF-8 text file such as the solutions list
pub async fn read_text_input(path: impl AsRef<Path>, what: &str) -> Result<String> {
    let path = path.as_ref();
    let bytes = read_input(path, what).await?;
    String::from_utf8(bytes)
        .map_err(|_| AnswerKeyError::NotUtf8(format!("{} at {}", what, path.display())))
}

/// Load the question paper
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = read_input(path, "question paper").await?;
    load_pdf_bytes(bytes).await
}

/// Parse an in-memory question paper
pub async fn load_pdf_bytes(bytes: Vec<u8>) -> Result<Document> {
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes))
        .await?
        .map_err(AnswerKeyError::SourcePdf)?;
    Ok(doc)
}

/// Serialize a document to bytes
pub async fn pdf_to_bytes(mut doc: Document) -> Result<Vec<u8>> {
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, AnswerKeyError>(writer)
    })
    .await??;
    Ok(bytes)
}

/// Save the finished document
pub async fn save_pdf(doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let bytes = pdf_to_bytes(doc).await?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// File stem of the question paper, or `"document"` when it has none
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Answer-key page title for a question paper with the given stem
pub fn answer_key_title(stem: &str) -> String {
    format!("{} | {}", stem.replace('_', " "), ANSWER_KEY_LABEL)
}

/// `<stem>_WITH_KEY.pdf`
pub fn output_file_name(stem: &str) -> String {
    format!("{}{}.pdf", stem, OUTPUT_SUFFIX)
}

/// Output path next to `dir` for a question paper at `source`
pub fn output_path_in(dir: &Path, source: &Path) -> PathBuf {
    dir.join(output_file_name(&source_stem(source)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_replaces_underscores() {
        assert_eq!(
            answer_key_title("Maths_Test_01"),
            "Maths Test 01 | ANSWER KEY"
        );
    }

    #[test]
    fn test_output_naming() {
        let source = Path::new("/papers/Maths_Test_01.pdf");
        assert_eq!(source_stem(source), "Maths_Test_01");
        assert_eq!(
            output_path_in(Path::new("/out"), source),
            PathBuf::from("/out/Maths_Test_01_WITH_KEY.pdf")
        );
    }

    #[test]
    fn test_stem_fallback() {
        assert_eq!(source_stem(Path::new("")), "document");
    }

    #[tokio::test]
    async fn test_text_input_must_be_utf8() {
        use crate::types::ErrorKind;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        std::fs::write(&good, "1 | A | પ્રખ્યાત").unwrap();
        std::fs::write(&bad, b"1 | A | \xff\xfe").unwrap();

        let text = read_text_input(&good, "solutions text").await.unwrap();
        assert!(text.ends_with("પ્રખ્યાત"));

        let err = read_text_input(&bad, "solutions text").await.unwrap_err();
        assert!(matches!(err, AnswerKeyError::NotUtf8(_)));
        assert_eq!(err.kind(), ErrorKind::ParseFailure);

        let err = read_text_input(dir.path().join("none.txt"), "solutions text")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputMissing);
    }
}
