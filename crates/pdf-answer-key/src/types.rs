use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnswerKeyError {
    #[error("Missing input: {0}")]
    InputMissing(String),
    #[error("Could not download {url}: {reason}")]
    RemoteFetch { url: String, reason: String },
    #[error("Could not download font from {url}: {reason}")]
    FontFetch { url: String, reason: String },
    #[error("Invalid answer table: {0}")]
    AnswerTable(String),
    #[error("{0} is not valid UTF-8 text")]
    NotUtf8(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not read question paper: {0}")]
    SourcePdf(lopdf::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Font error: {0}")]
    Font(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Question paper has no pages")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, AnswerKeyError>;

/// Coarse failure classes reported to whoever drives a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required upload or setting is absent
    InputMissing,
    /// A default asset could not be downloaded
    RemoteFetchFailure,
    /// An input could not be read in its expected structure
    ParseFailure,
    /// Layout, drawing, merging or writing failed
    RenderFailure,
}

impl AnswerKeyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnswerKeyError::InputMissing(_) | AnswerKeyError::NoPages => ErrorKind::InputMissing,
            AnswerKeyError::RemoteFetch { .. } | AnswerKeyError::FontFetch { .. } => {
                ErrorKind::RemoteFetchFailure
            }
            AnswerKeyError::Csv(_)
            | AnswerKeyError::AnswerTable(_)
            | AnswerKeyError::NotUtf8(_)
            | AnswerKeyError::SourcePdf(_)
            | AnswerKeyError::Image(_)
            | AnswerKeyError::Font(_) => ErrorKind::ParseFailure,
            AnswerKeyError::Pdf(_)
            | AnswerKeyError::Io(_)
            | AnswerKeyError::Config(_)
            | AnswerKeyError::TaskJoin(_) => ErrorKind::RenderFailure,
        }
    }
}

/// Placeholder drawn for a question whose answer cell was blank
pub const MISSING_ANSWER: &str = "-";

/// Question number → answer text, ordered by question number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    answers: BTreeMap<u32, String>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: u32, answer: impl Into<String>) {
        self.answers.insert(question, answer.into());
    }

    /// Answer text for `question`, if the table had a column for it.
    pub fn get(&self, question: u32) -> Option<&str> {
        self.answers.get(&question).map(String::as_str)
    }

    /// Answer as it should be printed: blank or absent answers become `-`.
    pub fn display_answer(&self, question: u32) -> &str {
        match self.get(question) {
            Some(answer) if !answer.is_empty() => answer,
            _ => MISSING_ANSWER,
        }
    }

    /// Highest question number present, or 0 for an empty map. Gaps below
    /// it are drawn as `-`.
    pub fn total_questions(&self) -> u32 {
        self.answers.keys().next_back().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.answers.iter().map(|(q, a)| (*q, a.as_str()))
    }
}

impl FromIterator<(u32, String)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

/// One line of the detailed-solutions block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionEntry {
    pub number: String,
    pub answer: String,
    pub explanation: String,
}

/// Summary of what a generation run would produce
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStatistics {
    /// Pages in the question paper
    pub source_pages: usize,
    /// Highest question number found in the answer table
    pub total_questions: u32,
    /// Columns in the answer grid
    pub grid_columns: usize,
    /// Parsed solution lines (0 when solutions are disabled)
    pub solution_entries: usize,
    /// Pages needed for the detailed solutions
    pub solution_pages: usize,
    /// Total pages appended after the question paper
    pub generated_pages: usize,
    /// Page count of the final document
    pub output_pages: usize,
}
