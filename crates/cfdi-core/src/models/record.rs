//! Raw inputs and untyped attribute records pulled out of CFDI XML.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat attribute dictionary of one XML element (attribute name -> literal value).
pub type AttributeMap = BTreeMap<String, String>;

/// A file handed to the pipeline by a file-gathering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Original file name, used for error reporting and tie-breaking.
    pub filename: String,
    /// Complete XML text.
    pub xml_text: String,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, xml_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            xml_text: xml_text.into(),
        }
    }

    /// Build from file bytes in whatever encoding the file was saved with.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(filename, crate::cfdi::decode_xml(bytes))
    }
}

/// Attribute maps for every logical section of a CFDI document.
///
/// Absent elements are represented by empty maps or empty collections so
/// accessors never branch on presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// `cfdi:Comprobante` root attributes.
    pub root: AttributeMap,
    /// `cfdi:Emisor`.
    pub issuer: AttributeMap,
    /// `cfdi:Receptor`.
    pub recipient: AttributeMap,

    /// `nomina12:Nomina`.
    pub payroll: AttributeMap,
    /// `nomina12:Emisor`.
    pub payroll_issuer: AttributeMap,
    /// `nomina12:Receptor`.
    pub payroll_receiver: AttributeMap,
    /// `nomina12:Percepciones` header.
    pub perceptions: AttributeMap,
    pub perception_items: Vec<AttributeMap>,
    /// `nomina12:Deducciones` header.
    pub deductions: AttributeMap,
    pub deduction_items: Vec<AttributeMap>,
    /// `nomina12:OtrosPagos` header.
    pub other_payments: AttributeMap,
    pub other_payment_items: Vec<AttributeMap>,

    /// `tfd:TimbreFiscalDigital`.
    pub stamp: AttributeMap,

    /// Every `cfdi:Concepto` in document order.
    pub concepts: Vec<AttributeMap>,
    /// Document-level `cfdi:Impuestos`: the root's own child, never a concept's.
    pub taxes: AttributeMap,
    /// `Traslado` lines under the document-level `Impuestos`.
    pub transfers: Vec<AttributeMap>,
    pub withholdings: Vec<AttributeMap>,
    /// Per-concept taxes, flattened in concept order.
    pub concept_transfers: Vec<AttributeMap>,
    pub concept_withholdings: Vec<AttributeMap>,

    /// Issuance date/time string (`Fecha`, falling back to `FechaExp`).
    pub issued_at: String,
    /// Whether the payroll complement was present.
    pub has_payroll: bool,
}

/// Which of the two layouts a document renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Plain invoice, receipt or credit note.
    General,
    /// Invoice carrying the `nomina12` complement.
    Payroll,
}

impl DocumentKind {
    /// Classify a record. Payroll iff the payroll complement is present.
    pub fn classify(record: &ExtractedRecord) -> Self {
        if record.has_payroll {
            DocumentKind::Payroll
        } else {
            DocumentKind::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::General => "general",
            DocumentKind::Payroll => "payroll",
        }
    }
}
