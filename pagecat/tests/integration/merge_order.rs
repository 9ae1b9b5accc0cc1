//! End-to-end merges through the lopdf builder.

use lopdf::Document;
use pagecat::config::{CompressionLevel, Config, Metadata, SourceReuse};
use pagecat::io::PdfWriter;
use pagecat::merge::metadata::MetadataManager;
use pagecat::merge::{LopdfBuilder, MergeProgress, Merger};
use rstest::rstest;

use crate::common::{loaded_controller, page_labels, temp_output_path};

#[tokio::test]
async fn test_output_order_matches_selection() {
    let (mut controller, ids) = loaded_controller(&[("A", 3), ("B", 2)]).await;
    let (a, b) = (ids[0], ids[1]);
    controller.toggle_page(a, 2);
    controller.toggle_page(b, 1);
    controller.toggle_page(a, 1);

    let output = Merger::new()
        .merge(controller.session(), |_| {})
        .await
        .unwrap();

    assert_eq!(page_labels(&output.bytes), vec!["A-2", "B-1", "A-1"]);
    assert_eq!(output.statistics.pages_merged, 3);
    assert_eq!(output.statistics.source_documents, 2);
    assert_eq!(output.statistics.source_loads, 2);
}

#[rstest]
#[case(SourceReuse::PerMerge, 2)]
#[case(SourceReuse::PerPage, 4)]
#[tokio::test]
async fn test_source_reuse_gives_same_output(#[case] reuse: SourceReuse, #[case] loads: usize) {
    let (mut controller, ids) = loaded_controller(&[("A", 3), ("B", 2)]).await;
    controller.toggle_page(ids[1], 2);
    controller.toggle_page(ids[0], 3);
    controller.toggle_page(ids[1], 1);
    controller.toggle_page(ids[0], 1);

    let output = Merger::new()
        .with_source_reuse(reuse)
        .merge(controller.session(), |_| {})
        .await
        .unwrap();

    assert_eq!(page_labels(&output.bytes), vec!["B-2", "A-3", "B-1", "A-1"]);
    assert_eq!(output.statistics.source_loads, loads);
}

#[tokio::test]
async fn test_progress_is_reported_per_page() {
    let (mut controller, ids) = loaded_controller(&[("A", 5)]).await;
    controller.select_all_pages(ids[0]);

    let mut reports: Vec<MergeProgress> = Vec::new();
    Merger::new()
        .merge(controller.session(), |progress| reports.push(progress))
        .await
        .unwrap();

    let processed: Vec<usize> = reports.iter().map(|p| p.processed).collect();
    assert_eq!(processed, vec![1, 2, 3, 4, 5]);
    assert!(reports.iter().all(|p| p.total == 5));
    assert!(reports.last().unwrap().is_complete());
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_every_compression_level_loads_back(#[case] compression: CompressionLevel) {
    let (mut controller, ids) = loaded_controller(&[("A", 2), ("B", 2)]).await;
    controller.toggle_page(ids[1], 2);
    controller.toggle_page(ids[0], 1);

    let builder = LopdfBuilder::new().with_compression(compression);
    let output = Merger::with_builder(builder)
        .merge(controller.session(), |_| {})
        .await
        .unwrap();

    assert_eq!(page_labels(&output.bytes), vec!["B-2", "A-1"]);
}

#[tokio::test]
async fn test_merge_from_config_writes_metadata() {
    let (mut controller, ids) = loaded_controller(&[("A", 1)]).await;
    controller.toggle_page(ids[0], 1);

    let config = Config {
        metadata: Metadata::new(
            Some("Picked pages".to_string()),
            Some("QA".to_string()),
            None,
            None,
        ),
        ..Config::default()
    };
    let output = Merger::from_config(&config)
        .merge(controller.session(), |_| {})
        .await
        .unwrap();

    let doc = Document::load_mem(&output.bytes).unwrap();
    let metadata = MetadataManager::new().get_metadata(&doc);
    assert_eq!(metadata.title.as_deref(), Some("Picked pages"));
    assert_eq!(metadata.author.as_deref(), Some("QA"));
}

#[tokio::test]
async fn test_merged_bytes_are_written_to_disk() {
    let (mut controller, ids) = loaded_controller(&[("A", 2), ("B", 1)]).await;
    controller.toggle_page(ids[1], 1);
    controller.toggle_page(ids[0], 2);

    let output = Merger::new()
        .merge(controller.session(), |_| {})
        .await
        .unwrap();

    let path = temp_output_path();
    let stats = PdfWriter::new()
        .save_with_stats(&output.bytes, &path)
        .await
        .unwrap();
    assert_eq!(stats.file_size, output.bytes.len() as u64);

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(page_labels(&on_disk), vec!["B-1", "A-2"]);
}

#[tokio::test]
async fn test_merge_does_not_change_the_session() {
    let (mut controller, ids) = loaded_controller(&[("A", 2)]).await;
    controller.toggle_page(ids[0], 2);
    let before = controller.view();

    Merger::new()
        .merge(controller.session(), |_| {})
        .await
        .unwrap();

    assert_eq!(controller.view(), before);
}
