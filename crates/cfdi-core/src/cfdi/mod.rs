//! CFDI XML extraction.

mod encoding;
mod extractor;

pub use encoding::decode_xml;
pub use extractor::NamespaceExtractor;

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::record::{ExtractedRecord, RawDocument};
use crate::normalize::NormalizedDate;

/// Base CFDI 4.0 namespace, used when the root element declares none.
pub const CFDI_NAMESPACE: &str = "http://www.sat.gob.mx/cfd/4";

/// Payroll complement 1.2 namespace.
pub const PAYROLL_NAMESPACE: &str = "http://www.sat.gob.mx/nomina12";

/// Digital stamp complement namespace.
pub const STAMP_NAMESPACE: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Extract a record and require a usable issuance date.
pub fn parse_document(raw: &RawDocument) -> Result<(ExtractedRecord, NormalizedDate)> {
    let record = NamespaceExtractor::new().extract(&raw.xml_text)?;
    let date = NormalizedDate::parse(&record.issued_at).ok_or(ExtractionError::MissingDate)?;

    debug!(
        "Parsed {} (issued {}, payroll={})",
        raw.filename,
        record.issued_at,
        record.has_payroll
    );
    Ok((record, date))
}
