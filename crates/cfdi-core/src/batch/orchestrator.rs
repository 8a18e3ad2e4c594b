//! Batch pipeline: parse, group, render, archive.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::grouping::assign_base_names;
use super::source::DocumentSource;
use crate::archive::build_archive;
use crate::cfdi::parse_document;
use crate::error::{CfdiError, ErrorKind, Result};
use crate::models::{BatchSummary, CfdiConfig, Invoice, OutputItem};
use crate::render::DocumentRenderer;

/// Pipeline phase, reported in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Parsing,
    Grouping,
    Rendering,
    Archiving,
    Ready,
}

/// Progress update passed to a [`BatchObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub phase: BatchPhase,
    /// Items finished within the phase.
    pub processed: usize,
    /// Items the phase will handle.
    pub total: usize,
}

impl BatchProgress {
    pub fn new(phase: BatchPhase, processed: usize, total: usize) -> Self {
        Self { phase, processed, total }
    }
}

/// Receives phase transitions and per-item failures. Every method defaults
/// to doing nothing.
pub trait BatchObserver {
    fn on_progress(&self, _progress: BatchProgress) {}

    fn on_item_failed(&self, _filename: &str, _error: ErrorKind) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Everything a batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// One entry per input, in input order.
    pub items: Vec<OutputItem>,

    /// Deflate ZIP with every rendered document.
    #[serde(skip)]
    pub archive: Vec<u8>,

    pub summary: BatchSummary,
}

impl BatchOutput {
    /// Items that were rendered.
    pub fn valid_items(&self) -> impl Iterator<Item = &OutputItem> {
        self.items.iter().filter(|item| item.is_valid())
    }

    /// Items that failed, with their error.
    pub fn failed_items(&self) -> impl Iterator<Item = (&OutputItem, ErrorKind)> {
        self.items
            .iter()
            .filter_map(|item| item.error.map(|error| (item, error)))
    }
}

/// Drives a set of sources through the pipeline.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    renderer: DocumentRenderer,
    include_xml: bool,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new(&CfdiConfig::default())
    }
}

impl BatchOrchestrator {
    pub fn new(config: &CfdiConfig) -> Self {
        Self {
            renderer: DocumentRenderer::new(config.render.clone()),
            include_xml: config.output.include_xml,
        }
    }

    /// Whether the archive also carries the renamed XML files.
    pub fn with_include_xml(mut self, include_xml: bool) -> Self {
        self.include_xml = include_xml;
        self
    }

    pub fn include_xml(&self) -> bool {
        self.include_xml
    }

    /// Run without progress reporting.
    pub async fn run<S: DocumentSource>(&self, sources: Vec<S>) -> Result<BatchOutput> {
        self.run_with(sources, &NoopObserver).await
    }

    /// Run the whole batch.
    ///
    /// Per-document problems never abort the batch; they end up as the
    /// item's `error`. An `Err` means rendering or archiving itself broke.
    pub async fn run_with<S, O>(&self, sources: Vec<S>, observer: &O) -> Result<BatchOutput>
    where
        S: DocumentSource,
        O: BatchObserver + ?Sized,
    {
        let total = sources.len();

        info!("Parsing {} document(s)", total);
        observer.on_progress(BatchProgress::new(BatchPhase::Parsing, 0, total));
        let mut items = join_all(sources.into_iter().map(parse_source)).await;
        observer.on_progress(BatchProgress::new(BatchPhase::Parsing, total, total));

        for item in &items {
            if let Some(error) = item.error {
                observer.on_item_failed(&item.filename, error);
            }
        }

        let valid = items.iter().filter(|item| item.is_valid()).count();
        info!("Grouping {} valid document(s)", valid);
        observer.on_progress(BatchProgress::new(BatchPhase::Grouping, 0, valid));
        assign_base_names(&mut items);
        observer.on_progress(BatchProgress::new(BatchPhase::Grouping, valid, valid));

        info!("Rendering {} document(s)", valid);
        let mut rendered = 0;
        observer.on_progress(BatchProgress::new(BatchPhase::Rendering, 0, valid));
        for item in items.iter_mut().filter(|item| item.is_valid()) {
            self.render_item(item)?;
            rendered += 1;
            observer.on_progress(BatchProgress::new(BatchPhase::Rendering, rendered, valid));
        }

        info!("Building archive");
        observer.on_progress(BatchProgress::new(BatchPhase::Archiving, 0, valid));
        let archive = build_archive(&items, self.include_xml).map_err(|err| {
            error!("Failed to build archive: {}", err);
            CfdiError::Archive(err)
        })?;

        let summary = BatchSummary::from_items(&items);
        observer.on_progress(BatchProgress::new(BatchPhase::Ready, summary.valid, summary.total));
        info!(
            "Batch ready: {} document(s), {} rendered, {} error(s)",
            summary.total, summary.valid, summary.errors
        );

        Ok(BatchOutput {
            items,
            archive,
            summary,
        })
    }

    fn render_item(&self, item: &mut OutputItem) -> Result<()> {
        let Some(record) = item.record.as_ref() else {
            return Ok(());
        };
        let invoice = Invoice::from_record(record);
        let bytes = self.renderer.render(&invoice).map_err(|err| {
            error!("Failed to render {}: {}", item.filename, err);
            CfdiError::Render(err)
        })?;

        debug!(
            "Rendered {} as {}",
            item.filename,
            item.output_base_name.as_deref().unwrap_or("-")
        );
        item.pdf_bytes = Some(bytes);
        Ok(())
    }
}

/// Load and parse one source into an item. Never fails; failures are
/// recorded on the item.
async fn parse_source<S: DocumentSource>(source: S) -> OutputItem {
    let filename = source.name().to_string();

    let raw = match source.load().await {
        Ok(raw) => raw,
        Err(err) => {
            warn!("{}: {}", filename, err);
            return OutputItem::failed(filename, ErrorKind::ReadFailure);
        }
    };

    match parse_document(&raw) {
        Ok((record, date)) => OutputItem::parsed(filename, record, date, raw.xml_text),
        Err(err) => {
            warn!("{}: {}", filename, err);
            OutputItem::failed(filename, ErrorKind::from(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawDocument;
    use std::cell::RefCell;

    const VALID: &str = r#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4" Fecha="2024-03-05T10:00:00" Total="116.00">
  <cfdi:Emisor Nombre="Acme S.A." Rfc="AAA010101AAA"/>
</cfdi:Comprobante>"#;

    #[derive(Default)]
    struct Recorder {
        phases: RefCell<Vec<BatchPhase>>,
        failures: RefCell<Vec<(String, ErrorKind)>>,
    }

    impl BatchObserver for Recorder {
        fn on_progress(&self, progress: BatchProgress) {
            let mut phases = self.phases.borrow_mut();
            if phases.last() != Some(&progress.phase) {
                phases.push(progress.phase);
            }
        }

        fn on_item_failed(&self, filename: &str, error: ErrorKind) {
            self.failures.borrow_mut().push((filename.to_string(), error));
        }
    }

    #[tokio::test]
    async fn test_phases_reported_in_order() {
        let recorder = Recorder::default();
        let output = BatchOrchestrator::default()
            .run_with(
                vec![
                    RawDocument::new("a.xml", VALID),
                    RawDocument::new("b.xml", "<not xml"),
                ],
                &recorder,
            )
            .await
            .unwrap();

        assert_eq!(
            *recorder.phases.borrow(),
            vec![
                BatchPhase::Parsing,
                BatchPhase::Grouping,
                BatchPhase::Rendering,
                BatchPhase::Archiving,
                BatchPhase::Ready,
            ]
        );
        assert_eq!(
            *recorder.failures.borrow(),
            vec![("b.xml".to_string(), ErrorKind::InvalidXml)]
        );
        assert_eq!(output.summary, BatchSummary { total: 2, valid: 1, errors: 1 });
    }

    #[tokio::test]
    async fn test_items_keep_input_order() {
        let output = BatchOrchestrator::default()
            .run(vec![
                RawDocument::new("z.xml", VALID),
                RawDocument::new("a.xml", "<broken"),
            ])
            .await
            .unwrap();

        let names: Vec<&str> = output.items.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["z.xml", "a.xml"]);
        assert_eq!(output.valid_items().count(), 1);
        assert_eq!(output.failed_items().count(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let output = BatchOrchestrator::default()
            .run(Vec::<RawDocument>::new())
            .await
            .unwrap();
        assert!(output.items.is_empty());
        assert!(!output.archive.is_empty());
        assert_eq!(output.summary, BatchSummary::default());
    }
}
