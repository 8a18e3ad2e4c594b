//! Deterministic output names.
//!
//! Valid documents are bucketed by issuer and issuance month, ordered within
//! the bucket by timestamp then filename, and numbered from 01.

use std::collections::BTreeMap;

use tracing::trace;

use crate::models::{ExtractedRecord, OutputItem};
use crate::normalize::{NAME_PLACEHOLDER, NormalizedDate, sanitize_name};

/// Bucket a document is numbered within.
///
/// The key holds exactly what the printed name shows, so two dates a century
/// apart share one numbering sequence instead of both becoming `-01`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    /// Sanitized issuer display name.
    pub company: String,
    /// Last two digits of the year.
    pub short_year: i32,
    pub month: u32,
}

impl GroupKey {
    pub fn new(record: &ExtractedRecord, date: &NormalizedDate) -> Self {
        Self {
            company: company_token(record),
            short_year: date.year.rem_euclid(100),
            month: date.month,
        }
    }

    /// `<company>-<YY>-<MM>-<NN>` for the 1-based `index` in this bucket.
    pub fn base_name(&self, index: usize) -> String {
        format!(
            "{}-{:02}-{:02}-{:02}",
            self.company,
            self.short_year,
            self.month,
            index
        )
    }
}

/// Issuer `Nombre`, then `Rfc`, sanitized; `empresa` when neither is usable.
pub fn company_token(record: &ExtractedRecord) -> String {
    let name = ["Nombre", "Rfc"]
        .iter()
        .filter_map(|key| record.issuer.get(*key))
        .find(|value| !value.is_empty())
        .map(String::as_str)
        .unwrap_or(NAME_PLACEHOLDER);
    sanitize_name(name)
}

/// Assign `output_base_name` to every valid item.
///
/// The result depends only on the set of items, not their order: the sort
/// within a bucket is total (timestamp, then filename bytes). Failed items
/// are left untouched.
pub fn assign_base_names(items: &mut [OutputItem]) {
    let mut buckets: BTreeMap<GroupKey, Vec<(String, &str, usize)>> = BTreeMap::new();

    for (idx, item) in items.iter().enumerate() {
        if item.error.is_some() {
            continue;
        }
        let (Some(record), Some(date)) = (item.record.as_ref(), item.date.as_ref()) else {
            continue;
        };
        buckets
            .entry(GroupKey::new(record, date))
            .or_default()
            .push((date.sort_key(), item.filename.as_str(), idx));
    }

    let mut assigned: Vec<(usize, String)> = Vec::new();
    for (key, mut members) in buckets {
        members.sort();
        trace!("Group {:?}: {} document(s)", key, members.len());
        for (position, (_, _, idx)) in members.into_iter().enumerate() {
            assigned.push((idx, key.base_name(position + 1)));
        }
    }

    for (idx, name) in assigned {
        items[idx].output_base_name = Some(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::AttributeMap;
    use pretty_assertions::assert_eq;

    fn item(filename: &str, issuer: &[(&str, &str)], fecha: &str) -> OutputItem {
        let record = ExtractedRecord {
            issuer: issuer
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<AttributeMap>(),
            issued_at: fecha.to_string(),
            ..Default::default()
        };
        let date = NormalizedDate::parse(fecha).unwrap();
        OutputItem::parsed(filename, record, date, String::new())
    }

    fn names(items: &[OutputItem]) -> Vec<Option<&str>> {
        items.iter().map(|i| i.output_base_name.as_deref()).collect()
    }

    #[test]
    fn test_earlier_document_is_first() {
        let mut items = vec![
            item("b.xml", &[("Nombre", "Acme S.A.")], "2024-03-05T10:00:00"),
            item("a.xml", &[("Nombre", "Acme S.A.")], "2024-03-02T09:00:00"),
        ];
        assign_base_names(&mut items);
        assert_eq!(names(&items), vec![Some("acme-sa-24-03-02"), Some("acme-sa-24-03-01")]);
    }

    #[test]
    fn test_filename_breaks_timestamp_ties() {
        let mut items = vec![
            item("z.xml", &[("Nombre", "Acme")], "2024-03-05T10:00:00"),
            item("m.xml", &[("Nombre", "Acme")], "2024-03-05T10:00:00"),
        ];
        assign_base_names(&mut items);
        assert_eq!(names(&items), vec![Some("acme-24-03-02"), Some("acme-24-03-01")]);
    }

    #[test]
    fn test_buckets_by_month_and_issuer() {
        let mut items = vec![
            item("a.xml", &[("Nombre", "Acme")], "2024-03-05"),
            item("b.xml", &[("Nombre", "Acme")], "2024-04-01"),
            item("c.xml", &[("Rfc", "BBB010101BBB")], "2024-03-01"),
            item("d.xml", &[], "2023-12-31"),
        ];
        assign_base_names(&mut items);
        assert_eq!(
            names(&items),
            vec![
                Some("acme-24-03-01"),
                Some("acme-24-04-01"),
                Some("bbb010101bbb-24-03-01"),
                Some("empresa-23-12-01"),
            ]
        );
    }

    #[test]
    fn test_failed_items_are_skipped() {
        let mut items = vec![
            OutputItem::failed("bad.xml", ErrorKind::InvalidXml),
            item("a.xml", &[("Nombre", "Acme")], "2024-03-05"),
        ];
        assign_base_names(&mut items);
        assert_eq!(names(&items), vec![None, Some("acme-24-03-01")]);
    }

    #[test]
    fn test_stable_under_permutation() {
        let build = || {
            vec![
                item("1.xml", &[("Nombre", "Acme")], "2024-03-05T10:00:00"),
                item("2.xml", &[("Nombre", "Acme")], "2024-03-01T10:00:00"),
                item("3.xml", &[("Nombre", "Acme")], "2024-03-05T10:00:00"),
                item("4.xml", &[("Nombre", "Otra")], "2024-03-05T10:00:00"),
            ]
        };
        let mut forward = build();
        let mut reversed: Vec<OutputItem> = build().into_iter().rev().collect();
        assign_base_names(&mut forward);
        assign_base_names(&mut reversed);

        let by_file = |items: &[OutputItem]| {
            let mut pairs: Vec<(String, String)> = items
                .iter()
                .map(|i| (i.filename.clone(), i.output_base_name.clone().unwrap()))
                .collect();
            pairs.sort();
            pairs
        };
        assert_eq!(by_file(&forward), by_file(&reversed));
    }

    #[test]
    fn test_century_apart_dates_share_a_sequence() {
        let mut items = vec![
            item("actual.xml", &[("Nombre", "Acme S.A.")], "2024-03-05T10:00:00"),
            item("typo.xml", &[("Nombre", "Acme S.A.")], "1924-03-05T10:00:00"),
        ];
        assign_base_names(&mut items);
        assert_eq!(names(&items), vec![Some("acme-sa-24-03-02"), Some("acme-sa-24-03-01")]);
    }

    #[test]
    fn test_empty_name_falls_back_to_rfc() {
        let record = ExtractedRecord {
            issuer: [("Nombre", ""), ("Rfc", "AAA010101AAA")]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        assert_eq!(company_token(&record), "aaa010101aaa");
    }
}
