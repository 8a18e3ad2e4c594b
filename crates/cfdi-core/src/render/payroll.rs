//! Layout for payroll receipts (CFDI with the nomina 1.2 complement).

use super::page::{PageCursor, TextStyle};
use super::sections::{dash, labelled};
use super::table::TableBuilder;
use crate::models::Invoice;
use crate::models::invoice::Payroll;
use crate::normalize::{format_amount, format_money};

pub(super) fn draw_body(cursor: &mut PageCursor, invoice: &Invoice, payroll: &Payroll) {
    employee(cursor, invoice, payroll);
    perceptions(cursor, payroll);
    deductions(cursor, payroll);
    other_payments(cursor, payroll);
    totals(cursor, invoice, payroll);
}

fn employee(cursor: &mut PageCursor, invoice: &Invoice, payroll: &Payroll) {
    let recipient = &invoice.recipient;
    let receiver = &payroll.receiver;

    let receiver_lines: Vec<String> = [
        Some(dash(recipient.name.as_deref()).to_string()),
        labelled("RFC", recipient.rfc.as_deref()),
        labelled("CURP", receiver.curp.as_deref()),
        labelled("NSS", receiver.social_security_number.as_deref()),
        labelled("Num Empleado", receiver.employee_number.as_deref()),
        labelled("Depto", receiver.department.as_deref()),
        labelled("Puesto", receiver.position.as_deref()),
        labelled("Tipo Contrato", receiver.contract_type.as_deref()),
        labelled("Jornada", receiver.shift_type.as_deref()),
        labelled("Periodicidad", receiver.pay_periodicity.as_deref()),
        labelled("Reg Fiscal Receptor", recipient.tax_regime.as_deref()),
        labelled("Domicilio Fiscal", recipient.fiscal_address.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let period = (payroll.period_start.is_some() || payroll.period_end.is_some()).then(|| {
        format!(
            "Periodo: {} - {}",
            dash(payroll.period_start.as_deref()),
            dash(payroll.period_end.as_deref())
        )
    });
    let payroll_lines: Vec<String> = [
        period,
        labelled("Fecha Pago", payroll.payment_date.as_deref()),
        labelled("Dias de pago", payroll.days_paid.as_deref()),
        labelled("Fecha ini relacion laboral", receiver.labor_start.as_deref()),
        labelled("Antiguedad", receiver.seniority.as_deref()),
        receiver
            .base_contribution_salary
            .as_deref()
            .map(|v| format!("SBC: {}", format_money(Some(v)))),
        receiver
            .integrated_daily_wage
            .as_deref()
            .map(|v| format!("SDI: {}", format_money(Some(v)))),
        labelled("Tipo Nomina", payroll.payroll_type.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    TableBuilder::new(&["Receptor", "Nomina"])
        .font_size(9.0)
        .cell_padding(6.0)
        .column_width(0, 260.0)
        .column_width(1, 260.0)
        .row([receiver_lines.join("\n"), payroll_lines.join("\n")])
        .draw(cursor);
}

fn section_heading(cursor: &mut PageCursor, title: &str) {
    cursor.line(title, TextStyle::bold(10.0));
}

fn perceptions(cursor: &mut PageCursor, payroll: &Payroll) {
    if payroll.perceptions.is_empty() {
        return;
    }

    section_heading(cursor, "Percepciones");
    payroll
        .perceptions
        .iter()
        .fold(
            TableBuilder::new(&["Tipo", "Clave", "Concepto", "Gravado", "Exento", "Total"])
                .column_width(2, 200.0),
            |table, p| {
                table.row([
                    dash(p.perception_type.as_deref()).to_string(),
                    dash(p.code.as_deref()).to_string(),
                    dash(p.concept.as_deref()).to_string(),
                    format_amount(p.taxed_amount()),
                    format_amount(p.exempt_amount()),
                    format_amount(p.total()),
                ])
            },
        )
        .draw(cursor);
}

fn deductions(cursor: &mut PageCursor, payroll: &Payroll) {
    if payroll.deductions.is_empty() {
        return;
    }

    section_heading(cursor, "Deducciones");
    payroll
        .deductions
        .iter()
        .fold(
            TableBuilder::new(&["Tipo", "Clave", "Concepto", "Importe"]).column_width(2, 240.0),
            |table, d| {
                table.row([
                    dash(d.deduction_type.as_deref()).to_string(),
                    dash(d.code.as_deref()).to_string(),
                    dash(d.concept.as_deref()).to_string(),
                    format_money(d.amount.as_deref()),
                ])
            },
        )
        .draw(cursor);
}

fn other_payments(cursor: &mut PageCursor, payroll: &Payroll) {
    if payroll.other_payments.is_empty() {
        return;
    }

    section_heading(cursor, "Otros Pagos");
    payroll
        .other_payments
        .iter()
        .fold(
            TableBuilder::new(&["Tipo", "Clave", "Concepto", "Importe"]).column_width(2, 240.0),
            |table, o| {
                table.row([
                    dash(o.payment_type.as_deref()).to_string(),
                    dash(o.code.as_deref()).to_string(),
                    dash(o.concept.as_deref()).to_string(),
                    format_money(o.amount.as_deref()),
                ])
            },
        )
        .draw(cursor);
}

fn totals(cursor: &mut PageCursor, invoice: &Invoice, payroll: &Payroll) {
    let voucher = &invoice.voucher;
    TableBuilder::new(&["Totales", ""])
        .column_width(0, 200.0)
        .column_width(1, 120.0)
        .row(["SubTotal".to_string(), format_money(voucher.subtotal.as_deref())])
        .row(["Descuentos".to_string(), format_money(voucher.discount.as_deref())])
        .row(["Retenciones".to_string(), format_amount(payroll.total_deductions_amount())])
        .row(["Total".to_string(), format_money(voucher.total.as_deref())])
        .row(["Total Percepciones".to_string(), format_amount(payroll.total_perceptions_amount())])
        .row(["Total Otros Pagos".to_string(), format_amount(payroll.total_other_payments_amount())])
        .row(["Neto del recibo".to_string(), format_amount(payroll.net_pay())])
        .draw(cursor);
}
