//! Error taxonomy for the export pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building, planning or writing a workbook.
#[derive(Error, Debug)]
pub enum XlsxExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xlsx write error: {0}")]
    Xlsx(rust_xlsxwriter::XlsxError),

    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sheet {sheet:?}: row {row} has {found} values, header has {expected} columns")]
    RaggedRow {
        sheet: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Sheet {sheet:?}: record {row} does not match header columns ({detail})")]
    RecordColumnMismatch {
        sheet: String,
        row: usize,
        detail: String,
    },

    #[error("Sheet {sheet:?}: duplicate column names detected: {detail}")]
    DuplicateColumnName { sheet: String, detail: String },

    #[error("Invalid sheet name {name:?}: {reason}")]
    InvalidSheetName { name: String, reason: String },

    #[error("Sheet name used more than once: {name:?}")]
    DuplicateSheetName { name: String },

    #[error("Sheet {sheet:?} exceeds Excel limits: {rows} rows x {cols} columns")]
    SheetTooLarge {
        sheet: String,
        rows: usize,
        cols: usize,
    },

    #[error("Unsupported input file {path:?}: expected .csv, .ipc, .arrow, .feather or .json")]
    UnsupportedInput { path: PathBuf },

    #[error("Invalid color {value:?}: expected 6 hex digits, optionally prefixed by '#'")]
    InvalidColor { value: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<rust_xlsxwriter::XlsxError> for XlsxExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        match err {
            rust_xlsxwriter::XlsxError::IoError(err_io) => XlsxExportError::Io(err_io),
            other => XlsxExportError::Xlsx(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, XlsxExportError>;
