//! wbcat Export
//!
//! Renders flattened records as a dated xlsx workbook with one worksheet per
//! top-level branch. Rows hold `level`, `id` and `name`, optionally indented
//! by level.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod sheet;
pub mod writer;

pub use error::ExportError;
pub use sheet::{
    first_column, sanitize_sheet_name, split_sheets, unique_sheet_names, Sheet, FALLBACK_SHEET,
    INDENT_WIDTH, MAX_SHEET_NAME,
};
pub use writer::{ExportOptions, ExportSummary, WorkbookExporter, DEFAULT_STEM};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
