//! Typed view over an [`ExtractedRecord`].
//!
//! Each logical CFDI section gets its own struct with optional fields. The
//! renderer works exclusively on these types; attribute-name lookups live in
//! the `from_*` mapping functions at the bottom of this file.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::{AttributeMap, DocumentKind, ExtractedRecord};
use crate::normalize::{NormalizedDate, to_amount};

/// A complete typed CFDI document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Layout selector.
    pub kind: DocumentKind,

    /// Parsed issuance date, if the `Fecha` attribute was usable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NormalizedDate>,

    /// Root `Comprobante` fields.
    pub voucher: Voucher,

    /// Issuer (emisor).
    pub issuer: Issuer,

    /// Recipient (receptor).
    pub recipient: Recipient,

    /// Line items (conceptos).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,

    /// Document-level and per-concept taxes.
    pub taxes: Taxes,

    /// Payroll complement; present iff `kind` is [`DocumentKind::Payroll`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payroll: Option<Payroll>,

    /// Digital stamp; present iff the stamp element carried any attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<Stamp>,
}

/// Root voucher attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voucher {
    pub series: Option<String>,
    pub folio: Option<String>,
    pub currency: Option<String>,
    /// `TipoDeComprobante` (I, E, T, N, P).
    pub voucher_type: Option<String>,
    /// `MetodoPago` (PUE, PPD).
    pub payment_method: Option<String>,
    /// `FormaPago` (01, 03, 99, ...).
    pub payment_form: Option<String>,
    pub export: Option<String>,
    pub subtotal: Option<String>,
    pub discount: Option<String>,
    pub total: Option<String>,
    /// `LugarExpedicion` postal code.
    pub place_of_issue: Option<String>,
    /// Issuer certificate serial (`NoCertificado`).
    pub certificate_number: Option<String>,
    /// Issuer digital seal (`Sello`).
    pub seal: Option<String>,
}

impl Voucher {
    /// `MetodoPago - FormaPago`, or the method alone. `None` without a method.
    pub fn payment_line(&self) -> Option<String> {
        let method = self.payment_method.as_deref()?;
        Some(match self.payment_form.as_deref() {
            Some(form) => format!("{} - {}", method, form),
            None => method.to_string(),
        })
    }
}

/// Invoice issuer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issuer {
    pub name: Option<String>,
    pub rfc: Option<String>,
    pub tax_regime: Option<String>,
}

impl Issuer {
    /// Name used for output grouping: display name, then RFC.
    pub fn grouping_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.rfc.as_deref())
    }
}

/// Invoice recipient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recipient {
    pub name: Option<String>,
    pub rfc: Option<String>,
    /// `UsoCFDI`.
    pub cfdi_use: Option<String>,
    /// `RegimenFiscalReceptor`.
    pub tax_regime: Option<String>,
    /// `DomicilioFiscalReceptor`.
    pub fiscal_address: Option<String>,
}

/// A single line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Concept {
    /// `ClaveProdServ`.
    pub product_code: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    /// `ClaveUnidad`.
    pub unit_code: Option<String>,
    pub description: Option<String>,
    pub unit_value: Option<String>,
    pub amount: Option<String>,
    pub discount: Option<String>,
}

impl Concept {
    /// Free-text unit, falling back to the SAT unit code.
    pub fn unit_label(&self) -> Option<&str> {
        self.unit.as_deref().or(self.unit_code.as_deref())
    }
}

/// Kind of tax line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    /// Traslado.
    Transfer,
    /// Retencion.
    Withholding,
}

impl TaxKind {
    /// Label printed in the tax table.
    pub fn label(&self) -> &'static str {
        match self {
            TaxKind::Transfer => "Traslado",
            TaxKind::Withholding => "Retencion",
        }
    }
}

/// A transferred or withheld tax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxLine {
    pub kind: TaxKind,
    /// `Impuesto` code (001 ISR, 002 IVA, 003 IEPS).
    pub tax: Option<String>,
    /// `TipoFactor` (Tasa, Cuota, Exento).
    pub factor_type: Option<String>,
    /// `TasaOCuota`.
    pub rate: Option<String>,
    pub base: Option<String>,
    pub amount: Option<String>,
}

/// Taxes at document level and per concept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Taxes {
    pub transfers: Vec<TaxLine>,
    pub withholdings: Vec<TaxLine>,
    pub concept_transfers: Vec<TaxLine>,
    pub concept_withholdings: Vec<TaxLine>,
}

impl Taxes {
    /// Rows of the combined tax table.
    ///
    /// Document-level lines win when present; otherwise the per-concept lines
    /// are used. Transfers and withholdings are chosen independently and
    /// transfers are listed first.
    pub fn table_rows(&self) -> Vec<&TaxLine> {
        let transfers = if self.transfers.is_empty() {
            &self.concept_transfers
        } else {
            &self.transfers
        };
        let withholdings = if self.withholdings.is_empty() {
            &self.concept_withholdings
        } else {
            &self.withholdings
        };
        transfers.iter().chain(withholdings.iter()).collect()
    }
}

/// Payroll complement (`nomina12`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payroll {
    /// `TipoNomina` (O ordinary, E extraordinary).
    pub payroll_type: Option<String>,
    pub payment_date: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub days_paid: Option<String>,
    pub total_perceptions: Option<String>,
    pub total_deductions: Option<String>,
    pub total_other_payments: Option<String>,
    pub issuer: PayrollIssuer,
    pub receiver: PayrollReceiver,
    pub perceptions: Vec<Perception>,
    pub deductions: Vec<Deduction>,
    pub other_payments: Vec<OtherPayment>,
}

impl Payroll {
    pub fn total_perceptions_amount(&self) -> Decimal {
        to_amount(self.total_perceptions.as_deref())
    }

    pub fn total_deductions_amount(&self) -> Decimal {
        to_amount(self.total_deductions.as_deref())
    }

    pub fn total_other_payments_amount(&self) -> Decimal {
        to_amount(self.total_other_payments.as_deref())
    }

    /// Net pay: perceptions + other payments - deductions.
    pub fn net_pay(&self) -> Decimal {
        self.total_perceptions_amount() + self.total_other_payments_amount()
            - self.total_deductions_amount()
    }
}

/// Payroll issuer (employer) data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollIssuer {
    /// `RegistroPatronal`.
    pub employer_registration: Option<String>,
}

/// Payroll receiver (employee) data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollReceiver {
    pub curp: Option<String>,
    /// `NumSeguridadSocial`.
    pub social_security_number: Option<String>,
    pub employee_number: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub contract_type: Option<String>,
    /// `TipoJornada`.
    pub shift_type: Option<String>,
    /// `PeriodicidadPago`.
    pub pay_periodicity: Option<String>,
    /// `FechaInicioRelLaboral`.
    pub labor_start: Option<String>,
    /// `Antigüedad` (ISO-8601 duration such as `P52W`).
    pub seniority: Option<String>,
    /// `SalarioBaseCotApor`.
    pub base_contribution_salary: Option<String>,
    /// `SalarioDiarioIntegrado`.
    pub integrated_daily_wage: Option<String>,
}

/// Earnings line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Perception {
    pub perception_type: Option<String>,
    pub code: Option<String>,
    pub concept: Option<String>,
    pub taxed: Option<String>,
    pub exempt: Option<String>,
}

impl Perception {
    pub fn taxed_amount(&self) -> Decimal {
        to_amount(self.taxed.as_deref())
    }

    pub fn exempt_amount(&self) -> Decimal {
        to_amount(self.exempt.as_deref())
    }

    pub fn total(&self) -> Decimal {
        self.taxed_amount() + self.exempt_amount()
    }
}

/// Deduction line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deduction {
    pub deduction_type: Option<String>,
    pub code: Option<String>,
    pub concept: Option<String>,
    pub amount: Option<String>,
}

/// Other-payment line (subsidies, reimbursements).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherPayment {
    pub payment_type: Option<String>,
    pub code: Option<String>,
    pub concept: Option<String>,
    pub amount: Option<String>,
}

/// `TimbreFiscalDigital` stamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stamp {
    pub uuid: Option<String>,
    /// `NoCertificadoSAT`.
    pub sat_certificate: Option<String>,
    /// `FechaTimbrado`.
    pub stamped_at: Option<String>,
    /// `RfcProvCertif`.
    pub provider_rfc: Option<String>,
    /// `SelloCFD`.
    pub seal_cfd: Option<String>,
    /// `SelloSAT`.
    pub seal_sat: Option<String>,
}

impl Stamp {
    /// Original string of the SAT certification complement.
    ///
    /// Only available when UUID, stamping timestamp, provider RFC, CFD seal
    /// and SAT certificate are all present.
    pub fn certification_chain(&self) -> Option<String> {
        Some(format!(
            "||1.1|{}|{}|{}|{}|{}||",
            self.uuid.as_deref()?,
            self.stamped_at.as_deref()?,
            self.provider_rfc.as_deref()?,
            self.seal_cfd.as_deref()?,
            self.sat_certificate.as_deref()?,
        ))
    }
}

impl Invoice {
    /// Map an untyped record into the typed view.
    pub fn from_record(record: &ExtractedRecord) -> Self {
        let kind = DocumentKind::classify(record);
        let payroll = match kind {
            DocumentKind::Payroll => Some(payroll_from_record(record)),
            DocumentKind::General => None,
        };
        let stamp = (!record.stamp.is_empty()).then(|| stamp_from_map(&record.stamp));

        Self {
            kind,
            issued_at: NormalizedDate::parse(&record.issued_at),
            voucher: voucher_from_map(&record.root),
            issuer: Issuer {
                name: attr(&record.issuer, "Nombre"),
                rfc: attr(&record.issuer, "Rfc"),
                tax_regime: attr(&record.issuer, "RegimenFiscal"),
            },
            recipient: Recipient {
                name: attr(&record.recipient, "Nombre"),
                rfc: attr(&record.recipient, "Rfc"),
                cfdi_use: attr(&record.recipient, "UsoCFDI"),
                tax_regime: attr(&record.recipient, "RegimenFiscalReceptor"),
                fiscal_address: attr(&record.recipient, "DomicilioFiscalReceptor"),
            },
            concepts: record.concepts.iter().map(concept_from_map).collect(),
            taxes: Taxes {
                transfers: tax_lines(&record.transfers, TaxKind::Transfer),
                withholdings: tax_lines(&record.withholdings, TaxKind::Withholding),
                concept_transfers: tax_lines(&record.concept_transfers, TaxKind::Transfer),
                concept_withholdings: tax_lines(&record.concept_withholdings, TaxKind::Withholding),
            },
            payroll,
            stamp,
        }
    }
}

/// Attribute value, treating an empty string as absent.
fn attr(map: &AttributeMap, key: &str) -> Option<String> {
    map.get(key).filter(|v| !v.is_empty()).cloned()
}

fn voucher_from_map(root: &AttributeMap) -> Voucher {
    Voucher {
        series: attr(root, "Serie"),
        folio: attr(root, "Folio"),
        currency: attr(root, "Moneda"),
        voucher_type: attr(root, "TipoDeComprobante"),
        payment_method: attr(root, "MetodoPago"),
        payment_form: attr(root, "FormaPago"),
        export: attr(root, "Exportacion"),
        subtotal: attr(root, "SubTotal"),
        discount: attr(root, "Descuento"),
        total: attr(root, "Total"),
        place_of_issue: attr(root, "LugarExpedicion"),
        certificate_number: attr(root, "NoCertificado"),
        seal: attr(root, "Sello"),
    }
}

fn concept_from_map(map: &AttributeMap) -> Concept {
    Concept {
        product_code: attr(map, "ClaveProdServ"),
        quantity: attr(map, "Cantidad"),
        unit: attr(map, "Unidad"),
        unit_code: attr(map, "ClaveUnidad"),
        description: attr(map, "Descripcion"),
        unit_value: attr(map, "ValorUnitario"),
        amount: attr(map, "Importe"),
        discount: attr(map, "Descuento"),
    }
}

fn tax_lines(maps: &[AttributeMap], kind: TaxKind) -> Vec<TaxLine> {
    maps.iter()
        .map(|map| TaxLine {
            kind,
            tax: attr(map, "Impuesto"),
            factor_type: attr(map, "TipoFactor"),
            rate: attr(map, "TasaOCuota"),
            base: attr(map, "Base"),
            amount: attr(map, "Importe"),
        })
        .collect()
}

fn payroll_from_record(record: &ExtractedRecord) -> Payroll {
    let header = &record.payroll;
    let receiver = &record.payroll_receiver;

    Payroll {
        payroll_type: attr(header, "TipoNomina"),
        payment_date: attr(header, "FechaPago"),
        period_start: attr(header, "FechaInicialPago"),
        period_end: attr(header, "FechaFinalPago"),
        days_paid: attr(header, "NumDiasPagados"),
        total_perceptions: attr(header, "TotalPercepciones"),
        total_deductions: attr(header, "TotalDeducciones"),
        total_other_payments: attr(header, "TotalOtrosPagos"),
        issuer: PayrollIssuer {
            employer_registration: attr(&record.payroll_issuer, "RegistroPatronal"),
        },
        receiver: PayrollReceiver {
            curp: attr(receiver, "Curp"),
            social_security_number: attr(receiver, "NumSeguridadSocial"),
            employee_number: attr(receiver, "NumEmpleado"),
            department: attr(receiver, "Departamento"),
            position: attr(receiver, "Puesto"),
            contract_type: attr(receiver, "TipoContrato"),
            shift_type: attr(receiver, "TipoJornada"),
            pay_periodicity: attr(receiver, "PeriodicidadPago"),
            labor_start: attr(receiver, "FechaInicioRelLaboral"),
            seniority: attr(receiver, "Antiguedad").or_else(|| attr(receiver, "Antigüedad")),
            base_contribution_salary: attr(receiver, "SalarioBaseCotApor"),
            integrated_daily_wage: attr(receiver, "SalarioDiarioIntegrado"),
        },
        perceptions: record
            .perception_items
            .iter()
            .map(|p| Perception {
                perception_type: attr(p, "TipoPercepcion"),
                code: attr(p, "Clave"),
                concept: attr(p, "Concepto"),
                taxed: attr(p, "ImporteGravado"),
                exempt: attr(p, "ImporteExento"),
            })
            .collect(),
        deductions: record
            .deduction_items
            .iter()
            .map(|d| Deduction {
                deduction_type: attr(d, "TipoDeduccion"),
                code: attr(d, "Clave"),
                concept: attr(d, "Concepto"),
                amount: attr(d, "Importe"),
            })
            .collect(),
        other_payments: record
            .other_payment_items
            .iter()
            .map(|o| OtherPayment {
                payment_type: attr(o, "TipoOtroPago"),
                code: attr(o, "Clave"),
                concept: attr(o, "Concepto"),
                amount: attr(o, "Importe"),
            })
            .collect(),
    }
}

fn stamp_from_map(map: &AttributeMap) -> Stamp {
    Stamp {
        uuid: attr(map, "UUID"),
        sat_certificate: attr(map, "NoCertificadoSAT"),
        stamped_at: attr(map, "FechaTimbrado"),
        provider_rfc: attr(map, "RfcProvCertif"),
        seal_cfd: attr(map, "SelloCFD"),
        seal_sat: attr(map, "SelloSAT"),
    }
}
