//! Issuance date parsing and formatting.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::patterns::ISO_DATE_PREFIX;

/// Spanish month abbreviations used on printed documents.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Placeholder printed when a date is absent.
pub const DATE_PLACEHOLDER: &str = "-";

/// Calendar date and wall-clock time taken from a CFDI `Fecha` attribute.
///
/// No timezone is attached: CFDI dates are local to the place of issue and
/// are used verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl NormalizedDate {
    /// Parse a `YYYY-MM-DD[THH:MM:SS]` prefix.
    ///
    /// Missing time components default to zero. Strings without the prefix,
    /// or with components outside the calendar, yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let caps = ISO_DATE_PREFIX.captures(value)?;
        let number = |idx: usize| -> u32 {
            caps.get(idx)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };

        let date = Self {
            year: caps[1].parse().ok()?,
            month: number(2),
            day: number(3),
            hour: number(4),
            minute: number(5),
            second: number(6),
        };

        date.to_naive().map(|_| date)
    }

    /// Convert to a chrono value, `None` if the components are out of range.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, self.second)?;
        Some(NaiveDateTime::new(date, time))
    }

    /// `DD/Mon/YYYY` with the fixed Spanish month table.
    pub fn format_date(&self) -> String {
        let month = MONTH_ABBREVIATIONS
            .get(self.month.wrapping_sub(1) as usize)
            .copied()
            .unwrap_or(DATE_PLACEHOLDER);
        format!("{:02}/{}/{}", self.day, month, self.year)
    }

    /// `HH:MM:SS`.
    pub fn format_time(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    /// Zero-padded `YYYYMMDDhhmmss` key; lexicographic order is chronological.
    pub fn sort_key(&self) -> String {
        format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// Last two digits of the year, zero padded.
    pub fn short_year(&self) -> String {
        format!("{:02}", self.year.rem_euclid(100))
    }
}

/// Format an optional date, printing the placeholder when absent.
pub fn format_date(date: Option<&NormalizedDate>) -> String {
    date.map(NormalizedDate::format_date)
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
}

/// Format an optional time, printing the placeholder when absent.
pub fn format_time(date: Option<&NormalizedDate>) -> String {
    date.map(NormalizedDate::format_time)
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
}
