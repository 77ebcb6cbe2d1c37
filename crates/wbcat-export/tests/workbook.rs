//! Workbook output on disk

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::path::Path;
use wbcat_export::{ExportOptions, WorkbookExporter};
use wbcat_model::FlatRecord;

fn records() -> Vec<FlatRecord> {
    vec![
        FlatRecord::facet(0, 1, "Женщинам", "-"),
        FlatRecord::facet(1, 2, "Платья", "Женщинам"),
        FlatRecord::facet(2, 9, "Мини", "Платья"),
        FlatRecord::facet(0, 3, "Дом/Сад", "-"),
    ]
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.sheet_names()
}

fn sheet(path: &Path, name: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.worksheet_range(name).unwrap()
}

fn cell(range: &Range<Data>, row: u32, col: u32) -> Data {
    range.get_value((row, col)).cloned().unwrap_or(Data::Empty)
}

fn row(range: &Range<Data>, row: u32, col: u32) -> (Data, Data, Data) {
    (cell(range, row, col), cell(range, row, col + 1), cell(range, row, col + 2))
}

fn expected(level: u32, id: i64, name: &str) -> (Data, Data, Data) {
    #[allow(clippy::cast_precision_loss)]
    let id = id as f64;
    (
        Data::Float(f64::from(level)),
        Data::Float(id),
        Data::String(name.to_string()),
    )
}

#[test]
fn writes_one_worksheet_per_branch() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = WorkbookExporter::new(ExportOptions::new().with_output_dir(dir.path()));

    let summary = exporter.export_on(&records(), date()).unwrap();

    assert_eq!(summary.path, dir.path().join("Result_2024-05-01.xlsx"));
    assert_eq!(summary.rows, 4);
    assert_eq!(summary.sheets, vec!["Женщинам", "Дом_Сад"]);
    assert_eq!(sheet_names(&summary.path), summary.sheets);

    let first = sheet(&summary.path, "Женщинам");
    assert_eq!(row(&first, 0, 0), expected(0, 1, "Женщинам"));
    assert_eq!(row(&first, 1, 0), expected(1, 2, "Платья"));
    assert_eq!(row(&first, 2, 0), expected(2, 9, "Мини"));
    assert_eq!(cell(&first, 3, 0), Data::Empty);
}

#[test]
fn indented_rows_shift_by_level() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = WorkbookExporter::new(
        ExportOptions::new()
            .with_output_dir(dir.path())
            .with_stem("Catalogue")
            .with_indent(true),
    );

    let summary = exporter.export_on(&records(), date()).unwrap();
    let first = sheet(&summary.path, "Женщинам");

    assert_eq!(row(&first, 0, 0), expected(0, 1, "Женщинам"));
    assert_eq!(row(&first, 1, 3), expected(1, 2, "Платья"));
    assert_eq!(row(&first, 2, 6), expected(2, 9, "Мини"));
    assert_eq!(cell(&first, 2, 0), Data::Empty);
    assert!(summary.path.ends_with("Catalogue_2024-05-01.xlsx"));
}

#[test]
fn same_day_rerun_leaves_only_new_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = WorkbookExporter::new(ExportOptions::new().with_output_dir(dir.path()));

    exporter
        .export_on(
            &[FlatRecord::facet(0, 1, "A", "-"), FlatRecord::facet(0, 2, "B", "-")],
            date(),
        )
        .unwrap();
    let summary = exporter
        .export_on(&[FlatRecord::facet(0, 3, "C", "-")], date())
        .unwrap();

    assert_eq!(summary.sheets, vec!["C"]);
    assert_eq!(sheet_names(&summary.path), vec!["C"]);
    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["Result_2024-05-01.xlsx"]);
}

#[test]
fn duplicate_branch_names_get_distinct_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = WorkbookExporter::new(ExportOptions::new().with_output_dir(dir.path()));

    let summary = exporter
        .export_on(
            &[FlatRecord::facet(0, 1, "Акции", "-"), FlatRecord::facet(0, 2, "Акции", "-")],
            date(),
        )
        .unwrap();

    assert_eq!(sheet_names(&summary.path), vec!["Акции", "Акции (2)"]);
}
