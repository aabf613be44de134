use lopdf::{Dictionary, Document, Object, Stream};
use pdf_answer_key::pipeline::render_generated_pages;
use pdf_answer_key::*;
use std::result::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

fn create_test_png() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(8, 12, image::Rgb([0, 51, 102]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Serves fixed bytes (or a fixed failure) and counts calls
struct TestFetcher {
    response: Result<Vec<u8>, String>,
    calls: AtomicUsize,
}

impl TestFetcher {
    fn new(response: Result<Vec<u8>, String>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssetFetcher for TestFetcher {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

fn request(pages: usize, csv: &str) -> GenerationRequest {
    GenerationRequest::new("Maths_Test_01.pdf", create_test_pdf(pages), csv.as_bytes().to_vec())
}

#[tokio::test]
async fn test_generate_appends_answer_key() {
    let fetcher = TestFetcher::new(Err("offline".to_string()));
    let generator = AnswerKeyGenerator::with_fetcher(GenerationOptions::default(), fetcher.clone());

    let request = request(3, "Key1,Key2,Key3\nA,B,C\n").with_background(create_test_png());
    let output = generator.generate(&request).await.unwrap();

    assert_eq!(fetcher.calls(), 0);
    assert_eq!(output.file_name, "Maths_Test_01_WITH_KEY.pdf");
    assert_eq!(output.statistics.source_pages, 3);
    assert_eq!(output.statistics.generated_pages, 1);
    assert_eq!(output.document.get_pages().len(), 4);
}

#[tokio::test]
async fn test_generated_pages_survive_round_trip() {
    use tempfile::TempDir;

    let fetcher = TestFetcher::new(Ok(create_test_png()));
    let generator = AnswerKeyGenerator::with_fetcher(GenerationOptions::default(), fetcher.clone());

    let output = generator
        .generate(&request(2, "Key1,Key2\nA,B\n"))
        .await
        .unwrap();
    assert_eq!(fetcher.calls(), 1);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join(&output.file_name);
    output.save(&path).await.unwrap();

    let reloaded = load_pdf(&path).await.unwrap();
    let pages: Vec<_> = reloaded.get_pages().values().copied().collect();
    assert_eq!(pages.len(), 3);

    // The answer-key page carries both link annotations
    let key_page = reloaded.get_dictionary(pages[2]).unwrap();
    let annots = key_page.get(b"Annots").unwrap().as_array().unwrap();
    assert_eq!(annots.len(), 2);
}

#[tokio::test]
async fn test_background_fetch_failure_blocks_generation() {
    let fetcher = TestFetcher::new(Err("connection refused".to_string()));
    let generator = AnswerKeyGenerator::with_fetcher(GenerationOptions::default(), fetcher);

    let err = generator
        .generate(&request(1, "Key1\nA\n"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteFetchFailure);
}

#[tokio::test]
async fn test_font_fetch_failure_with_solutions() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let options = GenerationOptions {
        font_cache_path: dir.path().join("font.ttf"),
        ..Default::default()
    };
    let fetcher = TestFetcher::new(Ok(b"not a font".to_vec()));
    let generator = AnswerKeyGenerator::with_fetcher(options, fetcher);

    let request = request(1, "Key1\nA\n")
        .with_background(create_test_png())
        .with_solutions("1 | A | because");
    let err = generator.generate(&request).await.unwrap_err();

    assert!(matches!(err, AnswerKeyError::FontFetch { .. }));
    assert!(!dir.path().join("font.ttf").exists());
}

const TEST_FONT: &[u8] = include_bytes!("fonts/DejaVuSansMono-Oblique.ttf");

#[tokio::test]
async fn test_font_cache_downloads_once() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fonts").join("cached.ttf");
    let fetcher = TestFetcher::new(Ok(TEST_FONT.to_vec()));
    let cache = FontCache::new(&path, "https://example.com/font.ttf", fetcher.clone());

    assert_eq!(cache.ensure_present().await.unwrap(), path);
    assert_eq!(cache.ensure_present().await.unwrap(), path);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(std::fs::read(&path).unwrap(), TEST_FONT);

    // Only the font itself is left behind, no partial download
    let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(entries, 1);

    let font = cache.load("Cached Mono").await.unwrap();
    assert_eq!(font.name(), "CachedMono");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_generate_with_solutions_embeds_font() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let options = GenerationOptions {
        font_cache_path: dir.path().join("font.ttf"),
        ..Default::default()
    };
    let fetcher = TestFetcher::new(Ok(TEST_FONT.to_vec()));
    let generator = AnswerKeyGenerator::with_fetcher(options, fetcher.clone());

    let request = request(2, "Key1,Key2\nA,B\n")
        .with_background(create_test_png())
        .with_solutions("1 | A | Caf\u{e9} au lait\n2 | B | Second line");
    let output = generator.generate(&request).await.unwrap();

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(output.statistics.solution_entries, 2);
    assert_eq!(output.statistics.solution_pages, 1);

    let doc = &output.document;
    let pages: Vec<_> = doc.get_pages().values().copied().collect();
    assert_eq!(pages.len(), 4);

    for &page_id in &pages[2..] {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        let font_id = fonts.get(b"F1").unwrap().as_reference().unwrap();
        let font = doc.get_dictionary(font_id).unwrap();

        assert_eq!(font.get(b"Subtype").unwrap().as_name().unwrap(), b"Type0");
        assert_eq!(font.get(b"Encoding").unwrap().as_name().unwrap(), b"Identity-H");
    }
}

#[tokio::test]
async fn test_solutions_ignored_when_disabled() {
    let options = GenerationOptions {
        include_solutions: false,
        ..Default::default()
    };
    let fetcher = TestFetcher::new(Err("offline".to_string()));
    let generator = AnswerKeyGenerator::with_fetcher(options, fetcher.clone());

    let request = request(2, "Key1\nA\n")
        .with_background(create_test_png())
        .with_solutions("1 | A | because");
    let output = generator.generate(&request).await.unwrap();

    assert_eq!(fetcher.calls(), 0);
    assert_eq!(output.statistics.solution_entries, 0);
    assert_eq!(output.document.get_pages().len(), 3);
}

#[tokio::test]
async fn test_empty_source_pdf_fails_fast() {
    let fetcher = TestFetcher::new(Ok(create_test_png()));
    let generator = AnswerKeyGenerator::with_fetcher(GenerationOptions::default(), fetcher.clone());

    let err = generator
        .generate(&request(0, "Key1\nA\n"))
        .await
        .unwrap_err();

    assert!(matches!(err, AnswerKeyError::NoPages));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_missing_inputs() {
    let generator = AnswerKeyGenerator::with_fetcher(
        GenerationOptions::default(),
        TestFetcher::new(Err("offline".to_string())),
    );

    let no_csv = GenerationRequest::new("paper.pdf", create_test_pdf(1), Vec::new());
    let err = generator.generate(&no_csv).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputMissing);

    let missing = GenerationRequest::from_paths("/nonexistent/paper.pdf", "/nonexistent/key.csv").await;
    assert!(matches!(missing, Err(AnswerKeyError::InputMissing(_))));
}

#[tokio::test]
async fn test_unreadable_paper_is_parse_failure() {
    let generator = AnswerKeyGenerator::with_fetcher(
        GenerationOptions::default(),
        TestFetcher::new(Err("offline".to_string())),
    );

    let request = GenerationRequest::new("paper.pdf", b"not a pdf".to_vec(), b"Key1\nA\n".to_vec());
    let err = generator.generate(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
}

#[tokio::test]
async fn test_statistics_without_background() {
    let fetcher = TestFetcher::new(Err("offline".to_string()));
    let generator = AnswerKeyGenerator::with_fetcher(GenerationOptions::default(), fetcher.clone());

    let csv = format!(
        "{}\n{}\n",
        (1..=30).map(|q| format!("Key{}", q)).collect::<Vec<_>>().join(","),
        vec!["A"; 30].join(",")
    );
    let stats = generator.statistics(&request(4, &csv)).await.unwrap();

    assert_eq!(fetcher.calls(), 0);
    assert_eq!(stats.total_questions, 30);
    assert_eq!(stats.grid_columns, 2);
    assert_eq!(stats.output_pages, 5);
}

#[tokio::test]
async fn test_oversized_grid_rejected_before_fetch() {
    let fetcher = TestFetcher::new(Ok(create_test_png()));
    let generator = AnswerKeyGenerator::with_fetcher(GenerationOptions::default(), fetcher.clone());
    let request = request(1, "Key1,Key2,Key1000\nA,B,C\n");

    let err = generator.statistics(&request).await.unwrap_err();
    assert!(matches!(err, AnswerKeyError::AnswerTable(_)));

    let err = generator.generate(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn test_render_solution_pages() {
    let options = GenerationOptions::default();
    let answers: AnswerMap = (1..=10).map(|q| (q, "A".to_string())).collect();
    let long = "An explanation that needs a good deal of room to finish. ".repeat(120);
    let entries: Vec<SolutionEntry> = (1..=5)
        .map(|n| SolutionEntry {
            number: n.to_string(),
            answer: "A".to_string(),
            explanation: long.clone(),
        })
        .collect();

    let pages = render_generated_pages(
        "Test | ANSWER KEY",
        &answers,
        &entries,
        &create_test_png(),
        &FontSet::builtin(),
        &options,
    )
    .unwrap();

    let fonts = FontSet::builtin();
    let expected = pdf_answer_key::render::layout_solutions(&entries, &fonts, &options.geometry);
    assert!(expected.len() >= 2);
    assert_eq!(pages.len(), 1 + expected.len());
}

#[test]
fn test_watermark_merge_preserves_order() {
    let source = Document::load_mem(&create_test_pdf(2)).unwrap();
    let source_pages: Vec<_> = source.get_pages().values().copied().collect();

    let options = GenerationOptions::default();
    let pages = render_generated_pages(
        "Test | ANSWER KEY",
        &AnswerMap::new(),
        &[],
        &create_test_png(),
        &FontSet::builtin(),
        &options,
    )
    .unwrap();

    let merged = merge_documents(source, &pages, &WatermarkStyle::new("SAMPLE")).unwrap();
    let merged_pages: Vec<_> = merged.get_pages().values().copied().collect();

    assert_eq!(merged_pages.len(), 3);
    assert_eq!(&merged_pages[..2], &source_pages[..]);
}
