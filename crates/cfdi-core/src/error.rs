//! Error types for the cfdi-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the cfdi library.
#[derive(Error, Debug)]
pub enum CfdiError {
    /// XML extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Source could not be read.
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    /// PDF rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Archive building error.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while pulling a record out of CFDI XML.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document is not well-formed XML.
    #[error("invalid XML: {0}")]
    InvalidXml(String),

    /// Neither `Fecha` nor `FechaExp` held a parseable date.
    #[error("missing or invalid Fecha attribute")]
    MissingDate,
}

/// A document source could not deliver its contents.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Underlying I/O failure.
    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Any other failure reported by the collaborator.
    #[error("failed to read {name}: {reason}")]
    Other { name: String, reason: String },
}

/// Errors related to PDF generation.
#[derive(Error, Debug)]
pub enum RenderError {
    /// lopdf failed to encode or serialize the document.
    #[error("failed to write PDF: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

/// Errors related to ZIP archive creation.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The zip writer rejected an entry.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry bytes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-document failure kinds recorded by the batch orchestrator.
///
/// None of these abort a batch: the failing item is reported against its
/// filename and the remaining documents are processed normally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Document failed to parse as XML.
    #[error("Invalid XML")]
    InvalidXml,

    /// No issuance date could be extracted.
    #[error("Missing or invalid Fecha attribute")]
    MissingOrInvalidDate,

    /// File contents could not be retrieved.
    #[error("Failed to read file")]
    ReadFailure,
}

impl From<&ExtractionError> for ErrorKind {
    fn from(err: &ExtractionError) -> Self {
        match err {
            ExtractionError::InvalidXml(_) => ErrorKind::InvalidXml,
            ExtractionError::MissingDate => ErrorKind::MissingOrInvalidDate,
        }
    }
}

/// Result type for the cfdi library.
pub type Result<T> = std::result::Result<T, CfdiError>;
