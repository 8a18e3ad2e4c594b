//! Regex patterns shared by the normalizers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // YYYY-MM-DD with an optional THH:MM:SS suffix; anything after is ignored.
    pub static ref ISO_DATE_PREFIX: Regex = Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})(?:T(\d{2}):(\d{2}):(\d{2}))?"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // encoding="..." in a leading XML declaration.
    pub static ref XML_ENCODING_DECL: Regex = Regex::new(
        r#"^\s*<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#
    ).unwrap();

    pub static ref NON_NAME_CHAR: Regex = Regex::new(r"[^a-z0-9-]").unwrap();
}
