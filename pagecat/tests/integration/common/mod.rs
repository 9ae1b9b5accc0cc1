//! Shared helpers for integration tests and benchmarks.
//!
//! PDFs are generated in memory so the tests need no fixture files.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pagecat::controller::SelectionController;
use pagecat::io::InputFile;
use pagecat::session::DocumentId;
use std::path::{Path, PathBuf};

/// A PDF with `pages` pages; page N shows the text `<label>-N`.
pub fn labeled_pdf(label: &str, pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|number| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("{label}-{number}"))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Labels shown on each page of `bytes`, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let mut doc = Document::load_mem(bytes).unwrap();
    doc.decompress();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').unwrap() + 1;
            let end = text[start..].find(')').unwrap() + start;
            text[start..end].to_string()
        })
        .collect()
}

/// An input file named `<label>.pdf` with `pages` labeled pages.
pub fn labeled_input(label: &str, pages: u32) -> InputFile {
    InputFile::pdf(format!("{label}.pdf"), labeled_pdf(label, pages))
}

/// Write a labeled PDF to `dir/<label>.pdf`.
pub fn write_labeled_pdf(dir: &Path, label: &str, pages: u32) -> PathBuf {
    let path = dir.join(format!("{label}.pdf"));
    std::fs::write(&path, labeled_pdf(label, pages)).unwrap();
    path
}

/// A controller with the given documents loaded, and their ids.
pub async fn loaded_controller(docs: &[(&str, u32)]) -> (SelectionController, Vec<DocumentId>) {
    let mut controller = SelectionController::new();
    let files = docs
        .iter()
        .map(|(label, pages)| labeled_input(label, *pages))
        .collect();
    let ids = controller.load_files(files).await.unwrap();
    (controller, ids)
}

/// The selection as `(document, page)` pairs.
pub fn selection_of(controller: &SelectionController) -> Vec<(DocumentId, u32)> {
    controller
        .session()
        .selection()
        .iter()
        .map(|entry| (entry.document_id, entry.page_number))
        .collect()
}

/// A temporary output path that is cleaned up on drop.
pub fn temp_output_path() -> tempfile::TempPath {
    tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .unwrap()
        .into_temp_path()
}
