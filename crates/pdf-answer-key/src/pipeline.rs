//! One generation run, from raw inputs to the finished document
//!
//! Parsing, loading and asset fetching happen on the async side; layout,
//! drawing and merging run together on the blocking pool. Any failure aborts
//! the run without producing partial output.

use crate::assets::{AssetFetcher, FontCache, HttpFetcher, fetch_background, load_font_file};
use crate::font::FontSet;
use crate::io::{
    answer_key_title, load_pdf_bytes, output_file_name, pdf_to_bytes, read_input, save_pdf,
    source_stem,
};
use crate::layout::GridLayout;
use crate::merge::merge_documents;
use crate::options::GenerationOptions;
use crate::parse::{parse_answer_table, parse_solution_list};
use crate::render::{
    GeneratedPages, PageFonts, PageTemplate, WatermarkStyle, build_answer_key_page,
    build_solution_pages, embed_background,
};
use crate::stats::calculate_statistics;
use crate::types::*;
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inputs of a single run
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// File name of the question paper; its stem names the title and output
    pub paper_name: String,
    pub paper: Vec<u8>,
    pub answers_csv: Vec<u8>,
    /// Uploaded background; the configured default is downloaded when absent
    pub background: Option<Vec<u8>>,
    pub solutions_text: Option<String>,
}

impl GenerationRequest {
    pub fn new(paper_name: impl Into<String>, paper: Vec<u8>, answers_csv: Vec<u8>) -> Self {
        Self {
            paper_name: paper_name.into(),
            paper,
            answers_csv,
            background: None,
            solutions_text: None,
        }
    }

    /// Read the question paper and answer table from disk
    pub async fn from_paths(paper: impl AsRef<Path>, answers: impl AsRef<Path>) -> Result<Self> {
        let paper = paper.as_ref();
        let paper_bytes = read_input(paper, "question paper").await?;
        let answer_bytes = read_input(answers, "answer key CSV").await?;
        let name = paper
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, paper_bytes, answer_bytes))
    }

    pub fn with_background(mut self, image: Vec<u8>) -> Self {
        self.background = Some(image);
        self
    }

    pub fn with_solutions(mut self, text: impl Into<String>) -> Self {
        self.solutions_text = Some(text.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.paper.is_empty() {
            return Err(AnswerKeyError::InputMissing(
                "question paper PDF is required".to_string(),
            ));
        }
        if self.answers_csv.is_empty() {
            return Err(AnswerKeyError::InputMissing(
                "answer key CSV is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Stem used for the title and the output file name
    pub fn stem(&self) -> String {
        source_stem(Path::new(&self.paper_name))
    }
}

/// Result of a successful run
#[derive(Debug)]
pub struct GenerationOutput {
    pub document: Document,
    /// `<stem>_WITH_KEY.pdf`
    pub file_name: String,
    pub statistics: GenerationStatistics,
}

impl GenerationOutput {
    pub async fn save(self, path: impl AsRef<Path>) -> Result<()> {
        save_pdf(self.document, path).await
    }

    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        pdf_to_bytes(self.document).await
    }
}

/// Inputs parsed and loaded, ready for rendering
struct Prepared {
    stem: String,
    source: Document,
    answers: AnswerMap,
    entries: Vec<SolutionEntry>,
    fonts: FontSet,
}

/// Drives generation runs with a fixed configuration
#[derive(Clone)]
pub struct AnswerKeyGenerator {
    options: GenerationOptions,
    fetcher: Arc<dyn AssetFetcher>,
    font_file: Option<PathBuf>,
}

impl std::fmt::Debug for AnswerKeyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerKeyGenerator")
            .field("options", &self.options)
            .field("font_file", &self.font_file)
            .finish_non_exhaustive()
    }
}

impl AnswerKeyGenerator {
    /// Generator downloading assets over HTTP
    pub fn new(options: GenerationOptions) -> Self {
        Self::with_fetcher(options, Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(options: GenerationOptions, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            options,
            fetcher,
            font_file: None,
        }
    }

    /// Use a local TrueType font for all generated text instead of the
    /// downloaded one
    pub fn with_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_file = Some(path.into());
        self
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Run the whole pipeline and return the merged document
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let prepared = self.prepare(request).await?;

        let background = match &request.background {
            Some(bytes) => bytes.clone(),
            None => {
                fetch_background(Arc::clone(&self.fetcher), &self.options.background_url).await?
            }
        };

        let options = self.options.clone();
        let file_name = output_file_name(&prepared.stem);

        let (document, statistics) = tokio::task::spawn_blocking(move || {
            let Prepared {
                stem,
                source,
                answers,
                entries,
                fonts,
            } = prepared;

            let statistics =
                calculate_statistics(&source, &answers, &entries, &fonts, &options.geometry)?;

            let title = answer_key_title(&stem);
            let pages = render_generated_pages(
                &title,
                &answers,
                &entries,
                &background,
                &fonts,
                &options,
            )?;

            let style = WatermarkStyle::new(options.watermark_text.clone());
            let document = merge_documents(source, &pages, &style)?;
            Ok::<_, AnswerKeyError>((document, statistics))
        })
        .await??;

        log::info!(
            "Generated {} ({} pages: {} source + {} generated)",
            file_name,
            statistics.output_pages,
            statistics.source_pages,
            statistics.generated_pages
        );

        Ok(GenerationOutput {
            document,
            file_name,
            statistics,
        })
    }

    /// Parse the inputs and report what [`generate`](Self::generate) would
    /// produce. Nothing is drawn, and the background is not downloaded.
    pub async fn statistics(&self, request: &GenerationRequest) -> Result<GenerationStatistics> {
        let prepared = self.prepare(request).await?;
        let geometry = self.options.geometry.clone();
        tokio::task::spawn_blocking(move || {
            calculate_statistics(
                &prepared.source,
                &prepared.answers,
                &prepared.entries,
                &prepared.fonts,
                &geometry,
            )
        })
        .await?
    }

    async fn prepare(&self, request: &GenerationRequest) -> Result<Prepared> {
        self.options.validate()?;
        request.validate()?;

        let source = load_pdf_bytes(request.paper.clone()).await?;
        if source.get_pages().is_empty() {
            return Err(AnswerKeyError::NoPages);
        }

        let csv = request.answers_csv.clone();
        let answers = tokio::task::spawn_blocking(move || parse_answer_table(&csv)).await??;
        GridLayout::check_fits(&answers, &self.options.geometry)?;

        let entries = match &request.solutions_text {
            Some(text) if self.options.include_solutions => parse_solution_list(text),
            _ => Vec::new(),
        };

        let fonts = self.font_set(!entries.is_empty()).await?;

        log::debug!(
            "Loaded {} source pages, {} answers, {} solution entries",
            source.get_pages().len(),
            answers.len(),
            entries.len()
        );

        Ok(Prepared {
            stem: request.stem(),
            source,
            answers,
            entries,
            fonts,
        })
    }

    /// Built-in Helvetica unless solutions are drawn or a font file was given
    async fn font_set(&self, with_solutions: bool) -> Result<FontSet> {
        if let Some(path) = &self.font_file {
            let font = load_font_file(path, &font_family(path)).await?;
            return Ok(FontSet::embedded(font));
        }
        if !with_solutions {
            return Ok(FontSet::builtin());
        }

        let cache = FontCache::new(
            self.options.font_cache_path.clone(),
            self.options.font_url.clone(),
            Arc::clone(&self.fetcher),
        );
        let font = cache.load(&font_family(cache.path())).await?;
        Ok(FontSet::embedded(font))
    }
}

fn font_family(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Draw the answer-key page and the solution pages into a fresh document
pub fn render_generated_pages(
    title: &str,
    answers: &AnswerMap,
    entries: &[SolutionEntry],
    background: &[u8],
    fonts: &FontSet,
    options: &GenerationOptions,
) -> Result<GeneratedPages> {
    let geometry = &options.geometry;
    let (width, height) = geometry.page_size_pt();
    let mut pages = GeneratedPages::new(width, height);

    let background_id = embed_background(&mut pages, background)?;
    let template = PageTemplate::new(background_id, geometry, options);
    let page_fonts = PageFonts::register(&mut pages, fonts)?;

    let grid = GridLayout::for_page(answers, geometry)?;
    build_answer_key_page(&mut pages, &template, &page_fonts, geometry, title, &grid)?;

    let solution_pages = build_solution_pages(&mut pages, &template, &page_fonts, geometry, entries)?;
    log::debug!(
        "Rendered answer key ({} grid columns) and {} solution pages",
        grid.columns,
        solution_pages
    );

    Ok(pages)
}
