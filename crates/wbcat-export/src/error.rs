//! Export errors

use std::path::PathBuf;

/// Errors raised while writing an export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Filesystem failure
    #[error("cannot write {}: {source}", path.display())]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Workbook encoding failure
    #[error("cannot write workbook {}: {source}", path.display())]
    Xlsx {
        /// Workbook being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Row or column past the worksheet grid
    #[error("sheet {sheet:?} row {row} does not fit the worksheet grid")]
    OutOfRange {
        /// Sheet name
        sheet: String,
        /// Zero-based row within the sheet
        row: usize,
    },

    /// Nothing to export
    #[error("no records to export")]
    Empty,
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn xlsx(path: impl Into<PathBuf>, source: rust_xlsxwriter::XlsxError) -> Self {
        Self::Xlsx {
            path: path.into(),
            source,
        }
    }
}
