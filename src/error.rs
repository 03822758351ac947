use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Fatal conversion failures.
///
/// Row-level problems (a row with the wrong column count, a cell that does
/// not parse) are never errors: the orchestrator skips or nulls them and
/// counts the outcome in the [`crate::convert::ConversionReport`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source path does not exist; raised before any row is read.
    #[error("input file {0:?} not found")]
    EndpointNotFound(PathBuf),

    /// Supplied field names/types disagree with the source header or with
    /// each other, or a field name the table format cannot accept.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// DBF open/append/read failure, surfaced from the table-format crate.
    #[error("table format error: {0}")]
    Table(#[from] dbase::Error),

    /// Spreadsheet build/save failure.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// CSV endpoint failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for conditions outside the taxonomy, e.g. input bytes that
    /// cannot be decoded with the requested encoding.
    #[error("{0}")]
    Unexpected(String),
}
