//! Blocks printed by every layout: title, footer and stamp data.

use super::page::{PageCursor, TextStyle};
use super::table::TableBuilder;
use crate::models::Invoice;
use crate::models::invoice::Voucher;
use crate::normalize::{amount_to_words, format_date, format_time, to_amount};

pub const TITLE: &str = "Comprobante Fiscal Digital por Internet";
pub const DISCLAIMER: &str = "Este documento es una representacion impresa de un CFDI";
pub const AMOUNT_IN_WORDS_LABEL: &str = "Importe con letra";
pub const STAMP_HEADING: &str = "Datos de timbrado";
pub const CHAIN_LABEL: &str = "Cadena original del complemento del certificacion digital del SAT";

/// Cell text for an optional value.
pub fn dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// `label: value` when the value is present.
pub fn labelled(label: &str, value: Option<&str>) -> Option<String> {
    value.map(|v| format!("{}: {}", label, v))
}

/// Space-joined present parts, `None` when all are absent.
fn join_present(parts: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    let joined = parts.into_iter().flatten().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Heading, issuer name and the two header lines.
///
/// `employer_registration` is only passed by the payroll layout.
pub fn title_block(cursor: &mut PageCursor, invoice: &Invoice, employer_registration: Option<&str>) {
    let body = cursor.config().body_font_size;
    let date = invoice.issued_at.as_ref();

    cursor.line(TITLE, TextStyle::bold(14.0));
    cursor.line(dash(invoice.issuer.name.as_deref()), TextStyle::regular(body));

    let first = join_present([
        date.map(|d| format!("Fecha: {}", format_date(Some(d)))),
        date.map(|d| format!("Hora: {}", format_time(Some(d)))),
        labelled("RFC", invoice.issuer.rfc.as_deref()),
        labelled("Reg Pat", employer_registration),
    ]);
    if let Some(line) = first {
        cursor.line(&line, TextStyle::regular(body));
    }

    let second = join_present([
        labelled("Reg Fiscal", invoice.issuer.tax_regime.as_deref()),
        labelled("Lugar de expedicion", invoice.voucher.place_of_issue.as_deref()),
    ]);
    if let Some(line) = second {
        cursor.line(&line, TextStyle::regular(body));
    }

    cursor.space(6.0);
}

/// Amount in words, disclaimer and payment method line.
pub fn footer(cursor: &mut PageCursor, voucher: &Voucher) {
    if let Some(total) = voucher.total.as_deref() {
        cursor.line(AMOUNT_IN_WORDS_LABEL, TextStyle::bold(9.0));
        cursor.line(&amount_to_words(to_amount(Some(total))), TextStyle::regular(9.0));
    }

    cursor.line(DISCLAIMER, TextStyle::regular(8.0));
    if let Some(payment) = voucher.payment_line() {
        cursor.line(&payment, TextStyle::regular(8.0));
    }

    cursor.space(6.0);
}

/// Stamp table, seals and certification chain. Nothing without a stamp.
pub fn stamp_block(cursor: &mut PageCursor, invoice: &Invoice) {
    let Some(stamp) = invoice.stamp.as_ref() else {
        return;
    };

    cursor.line(STAMP_HEADING, TextStyle::bold(9.0));

    let rows = [
        ("Serie del Certificado del emisor", invoice.voucher.certificate_number.as_deref()),
        ("Folio Fiscal UUID", stamp.uuid.as_deref()),
        ("No. serie Certificado SAT", stamp.sat_certificate.as_deref()),
        ("Fecha y hora de certificacion", stamp.stamped_at.as_deref()),
        ("RfcProvCertif", stamp.provider_rfc.as_deref()),
    ];
    let table = rows
        .iter()
        .filter_map(|(label, value)| value.map(|v| (*label, v)))
        .fold(
            TableBuilder::new(&["Campo", "Valor"])
                .column_width(0, 200.0)
                .column_width(1, 320.0),
            |table, (label, value)| table.row([label, value]),
        );
    if !table.is_empty() {
        table.draw(cursor);
    }

    let small = TextStyle::regular(7.0);
    let small_bold = TextStyle::bold(7.0);

    if let Some(seal) = invoice.voucher.seal.as_deref() {
        cursor.line("Sello digital del CFDI", small_bold);
        cursor.line(seal, small);
    }
    if let Some(seal) = stamp.seal_sat.as_deref() {
        cursor.line("Sello del SAT", small_bold);
        cursor.line(seal, small);
    }
    if let Some(chain) = stamp.certification_chain() {
        cursor.line(CHAIN_LABEL, small_bold);
        cursor.line(&chain, small);
    }
}
