use pdf_answer_key::*;

#[test]
fn test_default_options_are_valid() {
    let options = GenerationOptions::default();
    assert!(options.validate().is_ok());
    assert!(options.include_solutions);
    assert_eq!(options.watermark_text, "MURLIDHAR ACADEMY");
}

#[test]
fn test_empty_watermark_rejected() {
    let options = GenerationOptions {
        watermark_text: "   ".to_string(),
        ..Default::default()
    };

    match options.validate() {
        Err(AnswerKeyError::Config(msg)) => assert!(msg.contains("Watermark")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_geometry_validation() {
    let mut geometry = PageGeometry::default();
    assert!(geometry.validate().is_ok());

    geometry.questions_per_column = 0;
    assert!(geometry.validate().is_err());

    let mut geometry = PageGeometry::default();
    geometry.page_width_mm = 0.0;
    assert!(geometry.validate().is_err());

    let mut geometry = PageGeometry::default();
    geometry.grid_left_margin_mm = 120.0;
    geometry.grid_right_margin_mm = 120.0;
    assert!(geometry.validate().is_err());

    let mut geometry = PageGeometry::default();
    geometry.solution_columns.explanation_mm = 300.0;
    assert!(geometry.validate().is_err());

    let mut geometry = PageGeometry::default();
    geometry.solution_bottom_margin_mm = 250.0;
    assert!(geometry.validate().is_err());
}

#[test]
fn test_geometry_in_points() {
    let geometry = PageGeometry::default();
    let (width, height) = geometry.page_size_pt();

    assert!((width - 595.28).abs() < 0.01);
    assert!((height - 841.89).abs() < 0.01);
    // Title sits 63.5mm (180pt) below the top edge
    assert!((geometry.title_y_pt() - (height - 180.0)).abs() < 0.01);
    assert!(geometry.table_top_pt() < geometry.title_y_pt());
}

#[test]
fn test_link_regions_in_points() {
    let geometry = PageGeometry::default();
    let rect = geometry.telegram_region.to_pt();

    assert!((rect[0] - 28.35).abs() < 0.01);
    assert!((rect[2] - 311.81).abs() < 0.01);
    assert!((rect[3] - 141.73).abs() < 0.01);
}

#[test]
fn test_error_kinds() {
    assert_eq!(
        AnswerKeyError::InputMissing("paper".to_string()).kind(),
        ErrorKind::InputMissing
    );
    assert_eq!(AnswerKeyError::NoPages.kind(), ErrorKind::InputMissing);
    assert_eq!(
        AnswerKeyError::RemoteFetch {
            url: "u".to_string(),
            reason: "r".to_string()
        }
        .kind(),
        ErrorKind::RemoteFetchFailure
    );
    assert_eq!(
        AnswerKeyError::Font("bad".to_string()).kind(),
        ErrorKind::ParseFailure
    );
    assert_eq!(
        AnswerKeyError::Config("bad".to_string()).kind(),
        ErrorKind::RenderFailure
    );
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_options_save_and_load() {
    use tempfile::NamedTempFile;

    let mut options = GenerationOptions::default();
    options.watermark_text = "SAMPLE".to_string();
    options.geometry.questions_per_column = 20;

    let temp = NamedTempFile::new().unwrap();
    options.save(temp.path()).await.unwrap();

    let loaded = GenerationOptions::load(temp.path()).await.unwrap();
    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_partial_config_uses_defaults() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), r#"{ "watermark_text": "ONLY THIS" }"#).unwrap();

    let loaded = GenerationOptions::load(temp.path()).await.unwrap();
    assert_eq!(loaded.watermark_text, "ONLY THIS");
    assert_eq!(loaded.geometry, PageGeometry::default());
}
