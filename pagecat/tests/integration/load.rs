//! Loading files into a session.

use pagecat::controller::SelectionController;
use pagecat::error::PageCatError;
use pagecat::io::InputFile;
use pagecat::merge::Merger;
use tempfile::TempDir;

use crate::common::{labeled_input, page_labels, write_labeled_pdf};

#[tokio::test]
async fn test_only_non_pdf_files_is_a_user_error() {
    let mut controller = SelectionController::new();
    let files = vec![
        InputFile::new("notes.txt", "text/plain", b"hello".to_vec()),
        InputFile::new("photo.png", "image/png", vec![0x89, b'P', b'N', b'G']),
    ];

    let err = controller.load_files(files).await.unwrap_err();
    assert!(matches!(err, PageCatError::NoValidPdfFiles { skipped: 2 }));
    assert!(err.is_user_error());
    assert!(controller.session().documents().is_empty());
}

#[tokio::test]
async fn test_non_pdf_files_are_skipped_silently() {
    let mut controller = SelectionController::new();
    let files = vec![
        InputFile::new("notes.txt", "text/plain", b"hello".to_vec()),
        labeled_input("a", 2),
    ];

    let ids = controller.load_files(files).await.unwrap();
    assert_eq!(ids.len(), 1);
    let doc = controller.session().document(ids[0]).unwrap();
    assert_eq!(doc.name(), "a.pdf");
    assert_eq!(doc.page_count(), 2);
    assert!(doc.pages().iter().all(|page| !page.is_selected()));
}

#[tokio::test]
async fn test_bad_file_leaves_no_partial_document() {
    let mut controller = SelectionController::new();
    let files = vec![
        labeled_input("first", 2),
        InputFile::pdf("broken.pdf", b"definitely not a pdf".to_vec()),
        labeled_input("third", 3),
    ];

    let err = controller.load_files(files).await.unwrap_err();
    assert!(matches!(err, PageCatError::FailedToDecode { .. }));

    let names: Vec<&str> = controller
        .session()
        .documents()
        .iter()
        .map(|doc| doc.name())
        .collect();
    assert_eq!(names, vec!["first.pdf"]);
    assert!(controller.session().is_consistent());
}

#[tokio::test]
async fn test_same_file_twice_gives_independent_documents() {
    let mut controller = SelectionController::new();
    let ids = controller
        .load_files(vec![labeled_input("same", 2), labeled_input("same", 2)])
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    controller.toggle_page(ids[1], 2);
    controller.toggle_page(ids[0], 1);
    assert!(!controller.is_selected(ids[0], 2));
    assert!(!controller.is_selected(ids[1], 1));

    let output = Merger::new()
        .merge(controller.session(), |_| {})
        .await
        .unwrap();
    assert_eq!(page_labels(&output.bytes), vec!["same-2", "same-1"]);
    assert_eq!(output.statistics.source_documents, 2);
}

#[tokio::test]
async fn test_load_from_glob_pattern() {
    let dir = TempDir::new().unwrap();
    write_labeled_pdf(dir.path(), "b", 1);
    write_labeled_pdf(dir.path(), "a", 2);
    std::fs::write(dir.path().join("readme.txt"), "not a pdf").unwrap();

    let pattern = format!("{}/*.pdf", dir.path().display());
    let files = InputFile::from_patterns([pattern]).await.unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf"]);

    let mut controller = SelectionController::new();
    let ids = controller.load_files(files).await.unwrap();
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn test_missing_path_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.pdf");
    let err = InputFile::from_patterns([missing.display().to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, PageCatError::FileNotFound { .. }));
}

#[tokio::test]
async fn test_export_thumbnails() {
    let mut controller = SelectionController::new();
    let ids = controller
        .load_files(vec![labeled_input("a", 2)])
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let written = controller
        .export_thumbnails(ids[0], &dir.path().join("previews"))
        .await
        .unwrap();

    assert_eq!(written.len(), 2);
    let first = &written[0];
    assert!(first.ends_with(format!("{}-p1.png", ids[0].get())));
    let image = image::open(first).unwrap();
    assert_eq!((image.width(), image.height()), (298, 421));
}
