//! Per-document batch results.

use serde::{Deserialize, Serialize};

use super::invoice::Invoice;
use super::record::{DocumentKind, ExtractedRecord};
use crate::error::ErrorKind;
use crate::normalize::NormalizedDate;

/// Outcome for one input document.
///
/// Valid items carry the record, date and original XML from parsing, a base
/// name after grouping and PDF bytes after rendering. Failed items carry only
/// the filename and the error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    /// Name the document was supplied under.
    pub filename: String,

    #[serde(skip)]
    pub record: Option<ExtractedRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NormalizedDate>,

    /// Original XML text, written unchanged next to the PDF.
    #[serde(skip)]
    pub xml_text: Option<String>,

    /// `<company>-<YY>-<MM>-<NN>`, assigned by grouping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_base_name: Option<String>,

    #[serde(skip)]
    pub pdf_bytes: Option<Vec<u8>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl OutputItem {
    /// A successfully parsed document awaiting grouping and rendering.
    pub fn parsed(
        filename: impl Into<String>,
        record: ExtractedRecord,
        date: NormalizedDate,
        xml_text: String,
    ) -> Self {
        Self {
            filename: filename.into(),
            record: Some(record),
            date: Some(date),
            xml_text: Some(xml_text),
            ..Default::default()
        }
    }

    /// A document that failed before grouping.
    pub fn failed(filename: impl Into<String>, error: ErrorKind) -> Self {
        Self {
            filename: filename.into(),
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.record.is_some() && self.date.is_some()
    }

    /// `<base>.pdf`, once a base name is assigned.
    pub fn pdf_name(&self) -> Option<String> {
        self.output_base_name.as_ref().map(|base| format!("{}.pdf", base))
    }

    /// `<base>.xml`, once a base name is assigned.
    pub fn xml_name(&self) -> Option<String> {
        self.output_base_name.as_ref().map(|base| format!("{}.xml", base))
    }

    /// `<base>.zip` for the per-document bundle.
    pub fn bundle_name(&self) -> Option<String> {
        self.output_base_name.as_ref().map(|base| format!("{}.zip", base))
    }

    /// Human-readable failure message.
    pub fn error_message(&self) -> Option<String> {
        self.error.map(|e| e.to_string())
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        self.record.as_ref().map(DocumentKind::classify)
    }

    /// Typed view of the record, if parsed.
    pub fn invoice(&self) -> Option<Invoice> {
        self.record.as_ref().map(Invoice::from_record)
    }
}

/// Counters shown after a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[OutputItem]) -> Self {
        let errors = items.iter().filter(|item| item.error.is_some()).count();
        Self {
            total: items.len(),
            valid: items.len() - errors,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_names() {
        let mut item = OutputItem::parsed(
            "a.xml",
            ExtractedRecord::default(),
            NormalizedDate::parse("2024-03-05").unwrap(),
            "<x/>".to_string(),
        );
        assert_eq!(item.pdf_name(), None);

        item.output_base_name = Some("acme-sa-24-03-01".to_string());
        assert_eq!(item.pdf_name().as_deref(), Some("acme-sa-24-03-01.pdf"));
        assert_eq!(item.xml_name().as_deref(), Some("acme-sa-24-03-01.xml"));
        assert_eq!(item.bundle_name().as_deref(), Some("acme-sa-24-03-01.zip"));
        assert!(item.is_valid());
    }

    #[test]
    fn test_failed_item() {
        let item = OutputItem::failed("broken.xml", ErrorKind::InvalidXml);
        assert!(!item.is_valid());
        assert_eq!(item.error_message().as_deref(), Some("Invalid XML"));
        assert_eq!(item.kind(), None);
    }

    #[test]
    fn test_summary() {
        let items = vec![
            OutputItem::failed("a.xml", ErrorKind::ReadFailure),
            OutputItem::parsed(
                "b.xml",
                ExtractedRecord::default(),
                NormalizedDate::parse("2024-01-01").unwrap(),
                String::new(),
            ),
        ];
        assert_eq!(
            BatchSummary::from_items(&items),
            BatchSummary { total: 2, valid: 1, errors: 1 }
        );
    }

    #[test]
    fn test_serialization_skips_bytes() {
        let mut item = OutputItem::failed("a.xml", ErrorKind::MissingOrInvalidDate);
        item.pdf_bytes = Some(vec![1, 2, 3]);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"filename": "a.xml", "error": "missing_or_invalid_date"})
        );
    }
}
