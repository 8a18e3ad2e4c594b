//! Batch orchestration over many CFDI documents.

pub mod grouping;
pub mod orchestrator;
pub mod source;

pub use grouping::{GroupKey, assign_base_names, company_token};
pub use orchestrator::{
    BatchObserver, BatchOrchestrator, BatchOutput, BatchPhase, BatchProgress, NoopObserver,
};
pub use source::DocumentSource;
