//! Configuration structures for the rendering pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the cfdi pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CfdiConfig {
    /// Batch output configuration.
    pub output: OutputConfig,

    /// PDF layout configuration.
    pub render: RenderConfig,
}

/// What the batch produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Put a renamed copy of each XML next to its PDF in the archive.
    pub include_xml: bool,

    /// File name of the aggregate archive.
    pub archive_name: String,

    /// Also write each `<name>.pdf` / `<name>.xml` pair individually.
    pub write_individual: bool,

    /// Also write a `<name>.zip` bundle per document.
    pub write_bundles: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_xml: true,
            archive_name: "cfdi-pdfs.zip".to_string(),
            write_individual: false,
            write_bundles: false,
        }
    }
}

/// Page geometry and type sizes, in PDF points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Page width (US Letter by default).
    pub page_width: f32,

    /// Page height.
    pub page_height: f32,

    /// Margin applied on all four sides.
    pub margin: f32,

    /// Default size for free-flowing text lines.
    pub body_font_size: f32,

    /// Default size for table cells.
    pub table_font_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 36.0,
            body_font_size: 11.0,
            table_font_size: 8.0,
        }
    }
}

impl CfdiConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Check values that would make layout impossible.
    pub fn validate(&self) -> Result<(), crate::error::CfdiError> {
        let render = &self.render;
        if render.margin < 0.0 || render.margin * 2.0 >= render.page_width.min(render.page_height) {
            return Err(crate::error::CfdiError::Config(format!(
                "margin {} does not fit a {}x{} page",
                render.margin, render.page_width, render.page_height
            )));
        }
        if render.body_font_size <= 0.0 || render.table_font_size <= 0.0 {
            return Err(crate::error::CfdiError::Config(
                "font sizes must be positive".to_string(),
            ));
        }
        if self.output.archive_name.trim().is_empty() {
            return Err(crate::error::CfdiError::Config(
                "archive name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
