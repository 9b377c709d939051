//! Report generation errors.

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// Failure raised while building or serializing a report workbook.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Spreadsheet library failure (invalid sheet name, save failure, ...).
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Row index does not fit the worksheet row type.
    #[error("row index overflow: {0}")]
    RowIndexOverflow(usize),
    /// Column index does not fit the worksheet column type.
    #[error("column index overflow: {0}")]
    ColumnIndexOverflow(usize),
    /// Text did not match the requested date pattern.
    #[error("cannot parse {value:?} with date pattern {pattern:?}")]
    InvalidDate {
        /// Input text.
        value: String,
        /// Pattern format string.
        pattern: &'static str,
    },
    /// DataFrame could not be read or converted.
    #[error("dataframe error: {0}")]
    DataFrame(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
