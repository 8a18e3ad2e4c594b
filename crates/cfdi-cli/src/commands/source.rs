//! Filesystem document sources.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use tracing::{debug, warn};

use cfdi_core::error::ReadError;
use cfdi_core::{DocumentSource, RawDocument, is_xml_filename};

/// An XML file on disk, read with tokio when the batch asks for it.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

impl DocumentSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(self) -> Result<RawDocument, ReadError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(RawDocument::from_bytes(self.name, &bytes)),
            Err(source) => Err(ReadError::Io {
                name: self.path.display().to_string(),
                source,
            }),
        }
    }
}

fn has_xml_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_xml_filename)
}

/// Expand files, directories (recursively) and glob patterns into the sorted,
/// de-duplicated set of `*.xml` files they name.
pub fn gather_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let path = Path::new(input);

        if path.is_dir() {
            let root = Pattern::escape(&path.to_string_lossy());
            let pattern = Path::new(&root).join("**").join("*");
            for entry in glob(&pattern.to_string_lossy())?.filter_map(|r| r.ok()) {
                if entry.is_file() && has_xml_name(&entry) {
                    files.insert(entry);
                }
            }
        } else if path.is_file() {
            if has_xml_name(path) {
                files.insert(path.to_path_buf());
            } else {
                warn!("Skipping non-XML file {}", path.display());
            }
        } else {
            let before = files.len();
            for entry in glob(input)?.filter_map(|r| r.ok()) {
                if entry.is_file() && has_xml_name(&entry) {
                    files.insert(entry);
                }
            }
            if files.len() == before {
                warn!("No XML files matched {}", input);
            }
        }
    }

    debug!("Gathered {} XML file(s)", files.len());
    Ok(files.into_iter().collect())
}
