//! File-name tokens derived from issuer names.

use super::patterns::{NON_NAME_CHAR, WHITESPACE_RUN};

/// Used when sanitization leaves nothing.
pub const NAME_PLACEHOLDER: &str = "empresa";

/// Lowercase, hyphenate whitespace runs and keep only `[a-z0-9-]`.
pub fn sanitize_name(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let hyphenated = WHITESPACE_RUN.replace_all(&lowered, "-");
    let cleaned = NON_NAME_CHAR.replace_all(&hyphenated, "");

    if cleaned.is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Whether a gathered file should enter the pipeline.
pub fn is_xml_filename(name: &str) -> bool {
    name.to_lowercase().ends_with(".xml")
}
