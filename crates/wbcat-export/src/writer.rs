//! xlsx workbook writer
//!
//! A workbook is one file `{output_dir}/{stem}_{YYYY-MM-DD}.xlsx` with one
//! autofitted worksheet per sheet. Sheets carry no header row. Saving
//! replaces any workbook of the same name.

use crate::error::ExportError;
use crate::sheet::{first_column, split_sheets, unique_sheet_names, Sheet};
use chrono::{Local, NaiveDate};
use rust_xlsxwriter::{ColNum, RowNum, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wbcat_model::FlatRecord;

/// Default workbook stem
pub const DEFAULT_STEM: &str = "Result";

/// Export options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Directory the workbook is created in
    pub output_dir: PathBuf,
    /// Workbook name before the date suffix
    pub stem: String,
    /// Shift rows right by level
    pub indent: bool,
}

impl ExportOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// With workbook stem
    #[inline]
    #[must_use]
    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = stem.into();
        self
    }

    /// With indentation
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Workbook file for a run on `date`
    #[must_use]
    pub fn workbook_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.xlsx", self.stem, date.format("%Y-%m-%d")))
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            stem: DEFAULT_STEM.to_string(),
            indent: false,
        }
    }
}

/// What was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Workbook file
    pub path: PathBuf,
    /// Worksheet names in order
    pub sheets: Vec<String>,
    /// Rows written across all sheets
    pub rows: usize,
}

/// Writes flat records as an xlsx workbook
#[derive(Debug, Clone, Default)]
pub struct WorkbookExporter {
    options: ExportOptions,
}

impl WorkbookExporter {
    /// Create exporter
    #[inline]
    #[must_use]
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Get options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export with today's local date
    ///
    /// # Errors
    /// See [`export_on`](Self::export_on).
    pub fn export(&self, records: &[FlatRecord]) -> Result<ExportSummary, ExportError> {
        self.export_on(records, Local::now().date_naive())
    }

    /// Export dated `date`
    ///
    /// # Errors
    /// - `ExportError::Empty` if there are no records
    /// - `ExportError::OutOfRange` if a row falls outside the sheet grid
    /// - `ExportError::Io` / `ExportError::Xlsx` on write failure
    pub fn export_on(
        &self,
        records: &[FlatRecord],
        date: NaiveDate,
    ) -> Result<ExportSummary, ExportError> {
        if records.is_empty() {
            return Err(ExportError::Empty);
        }

        let dir = &self.options.output_dir;
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;
        }
        let path = self.options.workbook_path(date);

        let sheets = split_sheets(records);
        let names = unique_sheet_names(&sheets);
        let mut workbook = Workbook::new();
        let mut rows = 0;
        for (sheet, name) in sheets.iter().zip(&names) {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(name.as_str())
                .map_err(|e| ExportError::xlsx(&path, e))?;
            rows += self.write_sheet(worksheet, name, sheet, &path)?;
        }
        workbook.save(&path).map_err(|e| ExportError::xlsx(&path, e))?;

        tracing::info!(
            path = %path.display(),
            sheets = names.len(),
            rows,
            "export written"
        );

        Ok(ExportSummary {
            path,
            sheets: names,
            rows,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn write_sheet(
        &self,
        worksheet: &mut Worksheet,
        name: &str,
        sheet: &Sheet<'_>,
        path: &Path,
    ) -> Result<usize, ExportError> {
        for (idx, record) in sheet.records.iter().enumerate() {
            let out_of_range = || ExportError::OutOfRange {
                sheet: name.to_string(),
                row: idx,
            };
            let row = RowNum::try_from(idx).map_err(|_| out_of_range())?;
            let last = ColNum::try_from(first_column(record, self.options.indent) + 2)
                .map_err(|_| out_of_range())?;
            let col = last - 2;

            worksheet
                .write_number(row, col, f64::from(record.level))
                .and_then(|ws| ws.write_number(row, col + 1, record.id as f64))
                .and_then(|ws| ws.write_string(row, last, record.name.as_str()))
                .map_err(|e| ExportError::xlsx(path, e))?;
        }
        worksheet.autofit();

        tracing::debug!(sheet = name, rows = sheet.records.len(), "sheet written");
        Ok(sheet.records.len())
    }
}
