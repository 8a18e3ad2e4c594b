//! Namespace-aware attribute extraction using roxmltree.

use roxmltree::{Document, Node, ParsingOptions};
use tracing::trace;

use super::{Result, CFDI_NAMESPACE, PAYROLL_NAMESPACE, STAMP_NAMESPACE};
use crate::error::ExtractionError;
use crate::models::record::{AttributeMap, ExtractedRecord};

/// Pulls flat attribute maps out of a CFDI document.
///
/// The primary namespace follows the root element, so CFDI 3.3 and 4.0
/// documents are handled alike. Complement namespaces are fixed.
#[derive(Debug, Clone)]
pub struct NamespaceExtractor {
    default_namespace: String,
    payroll_namespace: String,
    stamp_namespace: String,
}

impl NamespaceExtractor {
    /// Create an extractor with the standard SAT namespaces.
    pub fn new() -> Self {
        Self {
            default_namespace: CFDI_NAMESPACE.to_string(),
            payroll_namespace: PAYROLL_NAMESPACE.to_string(),
            stamp_namespace: STAMP_NAMESPACE.to_string(),
        }
    }

    /// Override the namespace assumed for roots without one.
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Parse `xml_text` and collect every logical section.
    pub fn extract(&self, xml_text: &str) -> Result<ExtractedRecord> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml_text, options)
            .map_err(|e| ExtractionError::InvalidXml(e.to_string()))?;

        let root = doc.root_element();
        let cfdi_ns = root
            .tag_name()
            .namespace()
            .unwrap_or(self.default_namespace.as_str());
        let payroll_ns = self.payroll_namespace.as_str();
        let stamp_ns = self.stamp_namespace.as_str();
        let top = doc.root();

        let issuer = first_by_ns(top, cfdi_ns, "Emisor");
        let recipient = first_by_ns(top, cfdi_ns, "Receptor");
        // Document-level taxes are the root's own child; concept taxes are nested deeper.
        let taxes = root.children().find(|n| is_element(n, cfdi_ns, "Impuestos"));
        let stamp = first_by_ns(top, stamp_ns, "TimbreFiscalDigital");

        let payroll = first_by_ns(top, payroll_ns, "Nomina");
        let within_payroll = |tag: &str| payroll.and_then(|n| first_by_ns(n, payroll_ns, tag));
        let perceptions = within_payroll("Percepciones");
        let deductions = within_payroll("Deducciones");
        let other_payments = within_payroll("OtrosPagos");

        let concepts = all_by_ns(top, cfdi_ns, "Concepto");

        let mut concept_transfers = Vec::new();
        let mut concept_withholdings = Vec::new();
        for concept in &concepts {
            if let Some(concept_taxes) = first_by_ns(*concept, cfdi_ns, "Impuestos") {
                concept_transfers.extend(collect(Some(concept_taxes), cfdi_ns, "Traslado"));
                concept_withholdings.extend(collect(Some(concept_taxes), cfdi_ns, "Retencion"));
            }
        }

        let issued_at = attribute(root, "Fecha")
            .or_else(|| attribute(root, "FechaExp"))
            .unwrap_or_default();

        let record = ExtractedRecord {
            root: attrs(Some(root)),
            issuer: attrs(issuer),
            recipient: attrs(recipient),
            payroll: attrs(payroll),
            payroll_issuer: attrs(within_payroll("Emisor")),
            payroll_receiver: attrs(within_payroll("Receptor")),
            perceptions: attrs(perceptions),
            perception_items: collect(perceptions, payroll_ns, "Percepcion"),
            deductions: attrs(deductions),
            deduction_items: collect(deductions, payroll_ns, "Deduccion"),
            other_payments: attrs(other_payments),
            other_payment_items: collect(other_payments, payroll_ns, "OtroPago"),
            stamp: attrs(stamp),
            concepts: concepts.iter().map(|c| attrs(Some(*c))).collect(),
            taxes: attrs(taxes),
            transfers: collect(taxes, cfdi_ns, "Traslado"),
            withholdings: collect(taxes, cfdi_ns, "Retencion"),
            concept_transfers,
            concept_withholdings,
            issued_at,
            has_payroll: payroll.is_some(),
        };

        trace!(
            "Extracted {} concepts, {} perceptions, {} deductions under {}",
            record.concepts.len(),
            record.perception_items.len(),
            record.deduction_items.len(),
            cfdi_ns
        );

        Ok(record)
    }
}

impl Default for NamespaceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_element(node: &Node, namespace: &str, tag: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == tag
        && node.tag_name().namespace() == Some(namespace)
}

/// Matching descendants of `node` in document order, excluding `node` itself.
fn all_by_ns<'a, 'input>(node: Node<'a, 'input>, namespace: &str, tag: &str) -> Vec<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .filter(|n| is_element(n, namespace, tag))
        .collect()
}

fn first_by_ns<'a, 'input>(node: Node<'a, 'input>, namespace: &str, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| is_element(n, namespace, tag))
}

fn collect(parent: Option<Node>, namespace: &str, tag: &str) -> Vec<AttributeMap> {
    parent
        .map(|p| {
            all_by_ns(p, namespace, tag)
                .into_iter()
                .map(|n| attrs(Some(n)))
                .collect()
        })
        .unwrap_or_default()
}

/// Attribute map of an element; an absent element yields an empty map.
fn attrs(node: Option<Node>) -> AttributeMap {
    let Some(node) = node else {
        return AttributeMap::new();
    };
    node.attributes()
        .map(|a| {
            let name = match a.namespace().and_then(|ns| node.lookup_prefix(ns)) {
                Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, a.name()),
                _ => a.name().to_string(),
            };
            (name, a.value().to_string())
        })
        .collect()
}

fn attribute(node: Node, name: &str) -> Option<String> {
    node.attribute(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
