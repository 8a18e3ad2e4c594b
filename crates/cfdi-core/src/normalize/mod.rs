//! Field normalization: dates, amounts, currency words and file-name tokens.
//!
//! Money and word rendering are fixed to the accounting convention (en-US
//! digits, Spanish words) and never depend on a display language.

pub mod amounts;
pub mod dates;
pub mod names;
pub mod patterns;
pub mod words;

pub use amounts::{format_amount, format_money, to_amount, MONEY_PLACEHOLDER};
pub use dates::{format_date, format_time, NormalizedDate};
pub use names::{is_xml_filename, sanitize_name, NAME_PLACEHOLDER};
pub use words::{amount_to_words, number_to_words};
