//! WASM bindings for rendering CFDI invoices to PDF.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! File picking happens on the JS side; documents cross the boundary as
//! `{ filename, xmlText }` objects.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use cfdi_core::models::{BatchSummary, CfdiConfig, OutputItem, RawDocument};
use cfdi_core::normalize::to_amount;
use cfdi_core::{
    BatchObserver, BatchOrchestrator, BatchOutput, BatchProgress, DocumentRenderer, ErrorKind,
    bundle_item, parse_document,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn read_documents(documents: JsValue) -> Result<Vec<RawDocument>, JsValue> {
    serde_wasm_bindgen::from_value(documents).map_err(to_js_error)
}

/// Render every document and package the results.
///
/// `documents` is an array of `{ filename, xmlText }`. Per-document problems
/// are reported on the returned items, never as a rejection.
#[wasm_bindgen]
pub async fn process_batch(documents: JsValue, include_xml: bool) -> Result<BatchResult, JsValue> {
    let documents = read_documents(documents)?;
    let orchestrator = BatchOrchestrator::default().with_include_xml(include_xml);
    run_batch(orchestrator, documents, ProgressCallback(None)).await
}

/// Render a single document to PDF bytes.
#[wasm_bindgen]
pub fn render_document(filename: &str, xml: &str) -> Result<Vec<u8>, JsValue> {
    let raw = RawDocument::new(filename, xml);
    let (record, _) = parse_document(&raw).map_err(to_js_error)?;

    DocumentRenderer::default()
        .render_record(&record)
        .map_err(to_js_error)
}

/// Format an amount with two decimals and thousands separators.
///
/// Missing or empty input yields the `-` placeholder.
#[wasm_bindgen]
pub fn format_money(value: Option<String>) -> String {
    cfdi_core::format_money(value.as_deref())
}

/// Spanish amount-in-words line, e.g. `ciento dieciseis pesos 00/100 M.N.`.
#[wasm_bindgen]
pub fn amount_to_words(value: &str) -> String {
    cfdi_core::amount_to_words(to_amount(Some(value)))
}

/// File-name token for an issuer name.
#[wasm_bindgen]
pub fn sanitize_name(value: &str) -> String {
    cfdi_core::sanitize_name(value)
}

/// Whether a picked file should be handed to the batch.
#[wasm_bindgen]
pub fn is_xml_filename(name: &str) -> bool {
    cfdi_core::is_xml_filename(name)
}

async fn run_batch(
    orchestrator: BatchOrchestrator,
    documents: Vec<RawDocument>,
    observer: ProgressCallback,
) -> Result<BatchResult, JsValue> {
    let started = js_sys::Date::now();
    let count = documents.len();

    let output = orchestrator
        .run_with(documents, &observer)
        .await
        .map_err(to_js_error)?;

    web_sys::console::log_1(
        &format!(
            "cfdi: {} document(s), {} rendered, {} failed in {:.0} ms",
            count,
            output.summary.valid,
            output.summary.errors,
            js_sys::Date::now() - started
        )
        .into(),
    );

    Ok(BatchResult { output })
}

/// Forwards batch progress to an optional JS callback.
struct ProgressCallback(Option<js_sys::Function>);

impl ProgressCallback {
    fn emit<T: Serialize>(&self, event: &T) {
        let Some(callback) = &self.0 else {
            return;
        };
        let value = match serde_wasm_bindgen::to_value(event) {
            Ok(value) => value,
            Err(err) => {
                web_sys::console::warn_1(&format!("cfdi: progress event not sent: {}", err).into());
                return;
            }
        };
        if let Err(thrown) = callback.call1(&JsValue::NULL, &value) {
            web_sys::console::warn_2(&"cfdi: progress callback threw".into(), &thrown);
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ProgressEvent<'a> {
    Progress(BatchProgress),
    #[serde(rename_all = "camelCase")]
    Failed { filename: &'a str, message: String },
}

impl BatchObserver for ProgressCallback {
    fn on_progress(&self, progress: BatchProgress) {
        self.emit(&ProgressEvent::Progress(progress));
    }

    fn on_item_failed(&self, filename: &str, error: ErrorKind) {
        self.emit(&ProgressEvent::Failed {
            filename,
            message: error.to_string(),
        });
    }
}

/// Batch processor class for browser use.
#[wasm_bindgen]
pub struct CfdiProcessor {
    orchestrator: BatchOrchestrator,
    on_progress: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl CfdiProcessor {
    /// Create a processor with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            orchestrator: BatchOrchestrator::default(),
            on_progress: None,
        }
    }

    /// Create a processor from a configuration object (same shape as the
    /// CLI's `config.json`).
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<CfdiProcessor, JsValue> {
        let config: CfdiConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        config.validate().map_err(to_js_error)?;

        Ok(Self {
            orchestrator: BatchOrchestrator::new(&config),
            on_progress: None,
        })
    }

    /// Whether the archive carries the renamed XML files.
    #[wasm_bindgen]
    pub fn set_include_xml(&mut self, include_xml: bool) {
        self.orchestrator = self.orchestrator.clone().with_include_xml(include_xml);
    }

    /// Register a callback receiving `{ type: "progress", phase, processed, total }`
    /// and `{ type: "failed", filename, message }` events.
    #[wasm_bindgen]
    pub fn set_on_progress(&mut self, callback: Option<js_sys::Function>) {
        self.on_progress = callback;
    }

    /// Process documents; resolves to a `BatchResult`.
    #[wasm_bindgen]
    pub fn process(&self, documents: JsValue) -> Result<js_sys::Promise, JsValue> {
        let documents = read_documents(documents)?;
        let orchestrator = self.orchestrator.clone();
        let observer = ProgressCallback(self.on_progress.clone());

        Ok(future_to_promise(async move {
            run_batch(orchestrator, documents, observer)
                .await
                .map(JsValue::from)
        }))
    }
}

impl Default for CfdiProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-item view handed to JS.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemView<'a> {
    filename: &'a str,
    output_base_name: Option<&'a str>,
    pdf_name: Option<String>,
    xml_name: Option<String>,
    kind: Option<&'static str>,
    error: Option<String>,
}

impl<'a> From<&'a OutputItem> for ItemView<'a> {
    fn from(item: &'a OutputItem) -> Self {
        Self {
            filename: &item.filename,
            output_base_name: item.output_base_name.as_deref(),
            pdf_name: item.pdf_name(),
            xml_name: item.xml_name(),
            kind: item.kind().map(|kind| kind.as_str()),
            error: item.error_message(),
        }
    }
}

/// Result of a batch run.
#[wasm_bindgen]
pub struct BatchResult {
    output: BatchOutput,
}

#[wasm_bindgen]
impl BatchResult {
    /// ZIP archive bytes.
    #[wasm_bindgen]
    pub fn archive(&self) -> Vec<u8> {
        self.output.archive.clone()
    }

    /// One entry per input, in input order.
    #[wasm_bindgen]
    pub fn items(&self) -> Result<JsValue, JsValue> {
        let views: Vec<ItemView<'_>> = self.output.items.iter().map(ItemView::from).collect();
        serde_wasm_bindgen::to_value(&views).map_err(to_js_error)
    }

    /// `{ total, valid, errors }`.
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.summary_counts()).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn total(&self) -> usize {
        self.output.summary.total
    }

    #[wasm_bindgen(getter)]
    pub fn valid(&self) -> usize {
        self.output.summary.valid
    }

    #[wasm_bindgen(getter)]
    pub fn errors(&self) -> usize {
        self.output.summary.errors
    }

    /// PDF bytes of the item at `index`, if it was rendered.
    #[wasm_bindgen]
    pub fn pdf(&self, index: usize) -> Option<Vec<u8>> {
        self.item(index).and_then(|item| item.pdf_bytes.clone())
    }

    /// Original XML text of the item at `index`, if it was rendered.
    #[wasm_bindgen]
    pub fn xml(&self, index: usize) -> Option<String> {
        self.item(index)
            .filter(|item| item.is_valid())
            .and_then(|item| item.xml_text.clone())
    }

    /// ZIP holding just the PDF and XML of the item at `index`.
    #[wasm_bindgen]
    pub fn bundle(&self, index: usize) -> Result<Option<Vec<u8>>, JsValue> {
        match self.item(index) {
            Some(item) => bundle_item(item).map_err(to_js_error),
            None => Ok(None),
        }
    }
}

impl BatchResult {
    fn item(&self, index: usize) -> Option<&OutputItem> {
        self.output.items.get(index)
    }

    fn summary_counts(&self) -> BatchSummary {
        self.output.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FACTURA: &str = include_str!("../../cfdi-core/tests/fixtures/factura.xml");
    const MALFORMADO: &str = include_str!("../../cfdi-core/tests/fixtures/malformado.xml");

    fn documents(docs: &[(&str, &str)]) -> JsValue {
        let raw: Vec<RawDocument> = docs
            .iter()
            .map(|(name, xml)| RawDocument::new(*name, *xml))
            .collect();
        serde_wasm_bindgen::to_value(&raw).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_format_money() {
        assert_eq!(format_money(Some("1234.5".to_string())), "1,234.50");
        assert_eq!(format_money(None), "-");
        assert_eq!(format_money(Some(String::new())), "-");
    }

    #[wasm_bindgen_test]
    fn test_amount_to_words() {
        assert_eq!(amount_to_words("116.00"), "ciento dieciseis pesos 00/100 M.N.");
        assert_eq!(amount_to_words(""), "cero pesos 00/100 M.N.");
    }

    #[wasm_bindgen_test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Acme S.A."), "acme-sa");
        assert!(is_xml_filename("FACTURA.XML"));
    }

    #[wasm_bindgen_test]
    fn test_render_document() {
        let pdf = render_document("factura.xml", FACTURA).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        assert!(render_document("malformado.xml", MALFORMADO).is_err());
    }

    #[wasm_bindgen_test]
    async fn test_process_batch() {
        let result = process_batch(
            documents(&[("factura.xml", FACTURA), ("malformado.xml", MALFORMADO)]),
            true,
        )
        .await
        .unwrap();

        assert_eq!((result.total(), result.valid(), result.errors()), (2, 1, 1));
        assert!(result.archive().starts_with(b"PK"));
        assert!(result.pdf(0).is_some());
        assert!(result.pdf(1).is_none());
        assert!(result.xml(0).unwrap().contains("cfdi:Comprobante"));
        assert!(result.bundle(0).unwrap().is_some());
        assert!(result.bundle(1).unwrap().is_none());
        assert!(result.bundle(9).unwrap().is_none());
    }

    #[wasm_bindgen_test]
    async fn test_throwing_progress_callback_does_not_stop_batch() {
        let callback = js_sys::Function::new_no_args("throw new Error('listener failed')");
        let docs = read_documents(documents(&[("factura.xml", FACTURA)])).unwrap();

        let result = run_batch(
            BatchOrchestrator::default(),
            docs,
            ProgressCallback(Some(callback)),
        )
        .await
        .unwrap();

        assert_eq!(result.valid(), 1);
    }

    #[wasm_bindgen_test]
    async fn test_processor_without_xml() {
        let mut processor = CfdiProcessor::new();
        processor.set_include_xml(false);

        let docs = read_documents(documents(&[("factura.xml", FACTURA)])).unwrap();
        let result = run_batch(processor.orchestrator.clone(), docs, ProgressCallback(None))
            .await
            .unwrap();

        assert_eq!(result.valid(), 1);
        assert!(result.archive().starts_with(b"PK"));
    }
}
