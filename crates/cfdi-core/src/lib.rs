//! Core library for rendering Mexican CFDI invoices to PDF.
//!
//! This crate provides:
//! - Namespace-aware extraction of CFDI 4.0 XML, including the payroll
//!   (nomina 1.2) and digital stamp complements
//! - Field normalization: dates, money, Spanish amount-in-words, file names
//! - Paginated PDF layouts for general invoices and payroll receipts
//! - Batch orchestration with deterministic output naming and ZIP packaging

pub mod archive;
pub mod batch;
pub mod cfdi;
pub mod error;
pub mod models;
pub mod normalize;
pub mod render;

pub use archive::{DEFAULT_ARCHIVE_NAME, build_archive, bundle_item};
pub use batch::{
    BatchObserver, BatchOrchestrator, BatchOutput, BatchPhase, BatchProgress, DocumentSource,
    NoopObserver, assign_base_names,
};
pub use cfdi::{NamespaceExtractor, decode_xml, parse_document};
pub use error::{ArchiveError, CfdiError, ErrorKind, ExtractionError, ReadError, RenderError, Result};
pub use models::{
    BatchSummary, CfdiConfig, DocumentKind, ExtractedRecord, Invoice, OutputItem, RawDocument,
};
pub use normalize::{amount_to_words, format_money, is_xml_filename, sanitize_name};
pub use render::{DocumentRenderer, Layout};
