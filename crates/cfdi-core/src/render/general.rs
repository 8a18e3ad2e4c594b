//! Layout for ordinary invoices (ingreso, egreso, traslado, pago).

use super::page::PageCursor;
use super::sections::{dash, labelled};
use super::table::TableBuilder;
use crate::models::Invoice;
use crate::normalize::format_money;

pub(super) fn draw_body(cursor: &mut PageCursor, invoice: &Invoice) {
    parties(cursor, invoice);
    voucher_summary(cursor, invoice);
    concepts(cursor, invoice);
    taxes(cursor, invoice);
}

fn parties(cursor: &mut PageCursor, invoice: &Invoice) {
    let issuer = &invoice.issuer;
    let recipient = &invoice.recipient;

    let issuer_lines: Vec<String> = [
        Some(dash(issuer.name.as_deref()).to_string()),
        labelled("RFC", issuer.rfc.as_deref()),
        labelled("Reg Fiscal", issuer.tax_regime.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let recipient_lines: Vec<String> = [
        Some(dash(recipient.name.as_deref()).to_string()),
        labelled("RFC", recipient.rfc.as_deref()),
        labelled("Uso CFDI", recipient.cfdi_use.as_deref()),
        labelled("Reg Fiscal Receptor", recipient.tax_regime.as_deref()),
        labelled("Domicilio Fiscal", recipient.fiscal_address.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    TableBuilder::new(&["Emisor", "Receptor"])
        .font_size(9.0)
        .cell_padding(6.0)
        .column_width(0, 260.0)
        .column_width(1, 260.0)
        .row([issuer_lines.join("\n"), recipient_lines.join("\n")])
        .draw(cursor);
}

fn voucher_summary(cursor: &mut PageCursor, invoice: &Invoice) {
    let v = &invoice.voucher;
    let rows = [
        ("Serie", dash(v.series.as_deref()).to_string()),
        ("Folio", dash(v.folio.as_deref()).to_string()),
        ("Moneda", dash(v.currency.as_deref()).to_string()),
        ("Tipo", dash(v.voucher_type.as_deref()).to_string()),
        ("MetodoPago", dash(v.payment_method.as_deref()).to_string()),
        ("FormaPago", dash(v.payment_form.as_deref()).to_string()),
        ("Exportacion", dash(v.export.as_deref()).to_string()),
        ("SubTotal", format_money(v.subtotal.as_deref())),
        ("Descuento", format_money(v.discount.as_deref())),
        ("Total", format_money(v.total.as_deref())),
    ];

    rows.into_iter()
        .fold(
            TableBuilder::new(&["Comprobante", ""])
                .column_width(0, 140.0)
                .column_width(1, 180.0),
            |table, (label, value)| table.row([label.to_string(), value]),
        )
        .draw(cursor);
}

fn concepts(cursor: &mut PageCursor, invoice: &Invoice) {
    if invoice.concepts.is_empty() {
        return;
    }

    invoice
        .concepts
        .iter()
        .fold(
            TableBuilder::new(&["Clave", "Cant", "Unidad", "Descripcion", "Valor Unit", "Importe", "Desc"])
                .column_width(3, 180.0),
            |table, c| {
                table.row([
                    dash(c.product_code.as_deref()).to_string(),
                    dash(c.quantity.as_deref()).to_string(),
                    dash(c.unit_label()).to_string(),
                    dash(c.description.as_deref()).to_string(),
                    format_money(c.unit_value.as_deref()),
                    format_money(c.amount.as_deref()),
                    format_money(c.discount.as_deref()),
                ])
            },
        )
        .draw(cursor);
}

fn taxes(cursor: &mut PageCursor, invoice: &Invoice) {
    let rows = invoice.taxes.table_rows();
    if rows.is_empty() {
        return;
    }

    rows.into_iter()
        .fold(
            TableBuilder::new(&["Tipo", "Impuesto", "Factor", "Tasa", "Base", "Importe"])
                .column_width(0, 70.0)
                .column_width(1, 60.0)
                .column_width(2, 60.0)
                .column_width(3, 60.0),
            |table, line| {
                table.row([
                    line.kind.label().to_string(),
                    dash(line.tax.as_deref()).to_string(),
                    dash(line.factor_type.as_deref()).to_string(),
                    dash(line.rate.as_deref()).to_string(),
                    format_money(line.base.as_deref()),
                    format_money(line.amount.as_deref()),
                ])
            },
        )
        .draw(cursor);
}
