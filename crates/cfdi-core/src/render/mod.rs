//! PDF rendering of typed CFDI documents.
//!
//! Both layouts share a [`PageCursor`] for flowing text and a
//! [`TableBuilder`] for tabular blocks; they differ only in the body drawn
//! between the common title block and the footer.

mod fonts;
mod general;
mod page;
mod payroll;
mod sections;
mod table;

pub use fonts::{Font, decode_text, encode_text};
pub use page::{PageCursor, Rgb, TextStyle, wrap_text};
pub use table::{HEADER_FILL, TableBuilder};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderError;
use crate::models::invoice::Payroll;
use crate::models::{DocumentKind, ExtractedRecord, Invoice, RenderConfig};

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Page layout strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Parties, voucher summary, concepts and taxes.
    General,
    /// Employee data, perceptions, deductions, other payments and totals.
    Payroll,
}

impl Layout {
    /// Payroll documents get the payroll layout, everything else the general one.
    pub fn for_invoice(invoice: &Invoice) -> Self {
        match invoice.kind {
            DocumentKind::Payroll => Layout::Payroll,
            DocumentKind::General => Layout::General,
        }
    }

    fn draw_body(&self, cursor: &mut PageCursor, invoice: &Invoice) {
        match self {
            Layout::General => general::draw_body(cursor, invoice),
            Layout::Payroll => {
                let empty = Payroll::default();
                let payroll = invoice.payroll.as_ref().unwrap_or(&empty);
                payroll::draw_body(cursor, invoice, payroll);
            }
        }
    }

    fn employer_registration<'a>(&self, invoice: &'a Invoice) -> Option<&'a str> {
        match self {
            Layout::General => None,
            Layout::Payroll => invoice
                .payroll
                .as_ref()
                .and_then(|p| p.issuer.employer_registration.as_deref()),
        }
    }
}

/// Renders one document into a complete PDF byte buffer.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    config: RenderConfig,
}

impl DocumentRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render with the layout matching the document kind.
    pub fn render(&self, invoice: &Invoice) -> Result<Vec<u8>> {
        self.render_with(invoice, Layout::for_invoice(invoice))
    }

    /// Render with an explicit layout.
    pub fn render_with(&self, invoice: &Invoice, layout: Layout) -> Result<Vec<u8>> {
        let mut cursor = PageCursor::new(&self.config);

        sections::title_block(&mut cursor, invoice, layout.employer_registration(invoice));
        layout.draw_body(&mut cursor, invoice);
        sections::footer(&mut cursor, &invoice.voucher);
        sections::stamp_block(&mut cursor, invoice);

        let pages = cursor.page_count();
        let bytes = cursor.finish()?;
        debug!("Rendered {:?} layout: {} page(s), {} bytes", layout, pages, bytes.len());
        Ok(bytes)
    }

    /// Convenience for callers holding the untyped record.
    pub fn render_record(&self, record: &ExtractedRecord) -> Result<Vec<u8>> {
        self.render(&Invoice::from_record(record))
    }
}

/// Text runs drawn on each page, in drawing order.
///
/// Reads back documents produced by [`DocumentRenderer`]; used for previews
/// and assertions on rendered output.
pub fn page_text(pdf: &[u8]) -> Result<Vec<Vec<String>>> {
    use lopdf::content::Content;
    use lopdf::{Document, Object};

    let doc = Document::load_mem(pdf)?;
    let mut pages = Vec::new();

    for page_id in doc.get_pages().into_values() {
        let data = doc.get_page_content(page_id)?;
        let content = Content::decode(&data)?;
        let runs = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(decode_text(bytes)),
                _ => None,
            })
            .collect();
        pages.push(runs);
    }

    Ok(pages)
}
