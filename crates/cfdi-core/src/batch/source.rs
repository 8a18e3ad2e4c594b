//! Input collaborators that hand raw documents to the pipeline.

use crate::error::ReadError;
use crate::models::RawDocument;

/// Something that can deliver one named XML document.
///
/// Loading consumes the source; the name must be available beforehand so a
/// failed load can still be reported against it.
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    /// Name used for error reporting and tie-breaking.
    fn name(&self) -> &str;

    /// Read the document contents.
    async fn load(self) -> Result<RawDocument, ReadError>;
}

impl DocumentSource for RawDocument {
    fn name(&self) -> &str {
        &self.filename
    }

    async fn load(self) -> Result<RawDocument, ReadError> {
        Ok(self)
    }
}
