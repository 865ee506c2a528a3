//! # Report Error Types

use thiserror::Error;

/// Errors raised while writing a PDF report or a CSV export.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Output directory or file could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// printpdf failed to build or save the document.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
