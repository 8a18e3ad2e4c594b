//! ZIP packaging of rendered documents.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::models::OutputItem;

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// File name used for the batch archive unless configured otherwise.
pub const DEFAULT_ARCHIVE_NAME: &str = "cfdi-pdfs.zip";

/// In-memory deflate ZIP writer.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            entries: 0,
        }
    }

    /// Add one file at the archive root.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(bytes)?;
        self.entries += 1;
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate archive with every rendered PDF and, when `include_xml`, each
/// original XML under the same base name.
///
/// Items without a base name or PDF (failed documents) are skipped; a batch
/// with no valid items yields an empty archive.
pub fn build_archive(items: &[OutputItem], include_xml: bool) -> Result<Vec<u8>> {
    let mut writer = ArchiveWriter::new();

    for item in items {
        let (Some(pdf_name), Some(pdf)) = (item.pdf_name(), item.pdf_bytes.as_deref()) else {
            continue;
        };
        writer.add(&pdf_name, pdf)?;

        if include_xml {
            if let (Some(xml_name), Some(xml)) = (item.xml_name(), item.xml_text.as_deref()) {
                writer.add(&xml_name, xml.as_bytes())?;
            }
        }
    }

    debug!("Archived {} entries (include_xml={})", writer.entries(), include_xml);
    writer.finish()
}

/// Per-document `<base>.zip` holding `<base>.pdf` and `<base>.xml`.
///
/// Returns `None` for items that were not rendered.
pub fn bundle_item(item: &OutputItem) -> Result<Option<Vec<u8>>> {
    let (Some(pdf_name), Some(xml_name)) = (item.pdf_name(), item.xml_name()) else {
        return Ok(None);
    };
    let (Some(pdf), Some(xml)) = (item.pdf_bytes.as_deref(), item.xml_text.as_deref()) else {
        return Ok(None);
    };

    let mut writer = ArchiveWriter::new();
    writer.add(&pdf_name, pdf)?;
    writer.add(&xml_name, xml.as_bytes())?;
    writer.finish().map(Some)
}
