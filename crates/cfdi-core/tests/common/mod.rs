#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use cfdi_core::error::ReadError;
use cfdi_core::render::page_text;
use cfdi_core::{DocumentSource, RawDocument};
use zip::ZipArchive;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture exists")
}

/// Fixture contents supplied under a different file name.
pub fn document(filename: &str, fixture_name: &str) -> RawDocument {
    RawDocument::new(filename, fixture(fixture_name))
}

/// All text runs of a rendered PDF, across pages.
pub fn pdf_text(pdf: &[u8]) -> Vec<String> {
    page_text(pdf).expect("rendered PDF is readable").concat()
}

pub fn archive_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes.to_vec())).expect("valid zip");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Either an in-memory document or a source that fails to load.
pub enum TestSource {
    Ready(RawDocument),
    Unreadable(String),
}

impl DocumentSource for TestSource {
    fn name(&self) -> &str {
        match self {
            TestSource::Ready(doc) => &doc.filename,
            TestSource::Unreadable(name) => name,
        }
    }

    async fn load(self) -> Result<RawDocument, ReadError> {
        match self {
            TestSource::Ready(doc) => Ok(doc),
            TestSource::Unreadable(name) => Err(ReadError::Other {
                name,
                reason: "permission denied".to_string(),
            }),
        }
    }
}
