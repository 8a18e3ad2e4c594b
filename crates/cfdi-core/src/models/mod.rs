//! Data models: raw records, the typed invoice view, batch results and configuration.

pub mod config;
pub mod invoice;
pub mod output;
pub mod record;

pub use config::{CfdiConfig, OutputConfig, RenderConfig};
pub use invoice::Invoice;
pub use output::{BatchSummary, OutputItem};
pub use record::{AttributeMap, DocumentKind, ExtractedRecord, RawDocument};
