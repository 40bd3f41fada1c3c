//! Table passes over generated PDFs.

mod common;

use common::*;
use docingest::model::{DiagnosticSource, ExtractionMethod};
use docingest::parser::{LopdfBackend, TableDetector, TableDetectorConfig};
use docingest::{PagedTables, TableBackend, TableExtractor};

fn grid_page() -> PageSpec {
    PageSpec::with_text(vec![
        text(72.0, 700.0, 12.0, "Name"),
        text(200.0, 700.0, 12.0, "Qty"),
        text(72.0, 685.0, 12.0, "Bolt"),
        text(200.0, 685.0, 12.0, "4"),
        text(72.0, 670.0, 12.0, "Nut"),
        text(200.0, 670.0, 12.0, "12"),
    ])
}

fn prose_page() -> PageSpec {
    PageSpec::with_text(vec![text(72.0, 700.0, 12.0, "Just a sentence on its own.")])
}

#[test]
fn test_paged_pass_finds_aligned_grid() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "grid.pdf", &[prose_page(), grid_page()]);

    let mut tables = Vec::new();
    PagedTables::new().extract(&path, &mut tables).unwrap();

    assert_eq!(tables.len(), 1);
    let table = &tables[0];
    assert_eq!(table.metadata.extraction_method, ExtractionMethod::PerPage);
    assert_eq!(table.metadata.page, Some(2));
    assert_eq!(table.data.columns, vec!["0", "1"]);
    assert_eq!(
        table.data.data,
        vec![vec!["Name", "Qty"], vec!["Bolt", "4"], vec!["Nut", "12"]]
    );
    assert_eq!(table.data.index, vec![0, 1, 2]);
}

#[test]
fn test_paged_pass_honors_detector_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "grid.pdf", &[grid_page()]);

    let strict = TableDetector::with_config(TableDetectorConfig {
        min_rows: 4,
        ..Default::default()
    });
    let mut tables = Vec::new();
    PagedTables::with_detector(strict)
        .extract(&path, &mut tables)
        .unwrap();
    assert!(tables.is_empty());
}

#[test]
fn test_paged_pass_over_opened_backend() {
    let backend = LopdfBackend::load_bytes(&build_pdf(&[grid_page(), grid_page()])).unwrap();

    let mut tables = Vec::new();
    PagedTables::new().extract_from(&backend, &mut tables).unwrap();

    let pages: Vec<_> = tables.iter().map(|t| t.metadata.page).collect();
    assert_eq!(pages, vec![Some(1), Some(2)]);
}

#[test]
fn test_paged_pass_as_followup_after_primary() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "grid.pdf", &[grid_page()]);

    let outcome = TableExtractor::new(StaticTables::primary(Vec::new()))
        .then(PagedTables::new())
        .extract_tables(&path);

    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.tables.len(), 1);
    assert_eq!(
        outcome.tables[0].metadata.extraction_method.tag(),
        "pdfplumber"
    );
}

#[test]
fn test_builtin_passes_degrade_without_tools() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "grid.pdf", &[grid_page()]);

    // A primary pass that cannot run skips the rest
    let outcome = TableExtractor::new(docingest::TabulaCli::default())
        .then(PagedTables::new())
        .extract_tables(&path);

    assert!(outcome.tables.is_empty());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].source, DiagnosticSource::TablesPrimary);
}

#[test]
fn test_serialized_table_record() {
    let backend = LopdfBackend::load_bytes(&build_pdf(&[grid_page()])).unwrap();
    let mut tables = Vec::new();
    PagedTables::new().extract_from(&backend, &mut tables).unwrap();

    let json = serde_json::to_value(&tables[0]).unwrap();
    assert_eq!(json["metadata"]["extraction_method"], "pdfplumber");
    assert_eq!(json["metadata"]["page"], 1);
    assert_eq!(json["data"]["columns"], serde_json::json!(["0", "1"]));
    assert_eq!(json["data"]["data"][2][1], "12");
}
