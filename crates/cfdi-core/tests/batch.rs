mod common;

use std::collections::HashSet;

use cfdi_core::{BatchOrchestrator, CfdiConfig, DocumentKind, ErrorKind, RawDocument, bundle_item};
use common::{TestSource, archive_names, document, fixture, fixture_path, pdf_text};
use pretty_assertions::assert_eq;

fn acme(filename: &str, fecha: &str) -> RawDocument {
    let xml = fixture("factura.xml").replace("2024-03-05T10:00:00", fecha);
    RawDocument::new(filename, xml)
}

#[tokio::test]
async fn test_same_issuer_same_month_numbered_by_date() {
    let output = BatchOrchestrator::default()
        .run(vec![
            acme("later.xml", "2024-03-05T10:00:00"),
            acme("earlier.xml", "2024-03-02T09:00:00"),
        ])
        .await
        .unwrap();

    let names: Vec<_> = output
        .items
        .iter()
        .map(|item| item.output_base_name.as_deref())
        .collect();
    assert_eq!(names, vec![Some("acme-sa-24-03-02"), Some("acme-sa-24-03-01")]);
    assert_eq!(
        archive_names(&output.archive),
        vec![
            "acme-sa-24-03-01.pdf",
            "acme-sa-24-03-01.xml",
            "acme-sa-24-03-02.pdf",
            "acme-sa-24-03-02.xml",
        ]
    );
}

#[tokio::test]
async fn test_century_apart_dates_keep_archive_names_unique() {
    let output = BatchOrchestrator::default()
        .run(vec![
            acme("factura.xml", "2024-03-05T10:00:00"),
            acme("copia.xml", "1924-03-05T10:00:00"),
        ])
        .await
        .unwrap();

    assert_eq!(output.summary.valid, 2);
    assert_eq!(
        archive_names(&output.archive),
        vec![
            "acme-sa-24-03-01.pdf",
            "acme-sa-24-03-01.xml",
            "acme-sa-24-03-02.pdf",
            "acme-sa-24-03-02.xml",
        ]
    );
}

#[tokio::test]
async fn test_missing_fecha_does_not_stop_batch() {
    let output = BatchOrchestrator::default()
        .run(vec![
            document("ok.xml", "factura.xml"),
            document("sin_fecha.xml", "sin_fecha.xml"),
        ])
        .await
        .unwrap();

    let failed = &output.items[1];
    assert_eq!(failed.error, Some(ErrorKind::MissingOrInvalidDate));
    assert_eq!(
        failed.error_message().as_deref(),
        Some("Missing or invalid Fecha attribute")
    );
    assert_eq!(failed.output_base_name, None);
    assert!(failed.pdf_bytes.is_none());

    assert!(output.items[0].pdf_bytes.is_some());
    assert_eq!(
        archive_names(&output.archive),
        vec!["acme-sa-24-03-01.pdf", "acme-sa-24-03-01.xml"]
    );
}

#[tokio::test]
async fn test_malformed_xml_produces_no_entries() {
    let output = BatchOrchestrator::default()
        .run(vec![document("malformado.xml", "malformado.xml")])
        .await
        .unwrap();

    assert_eq!(output.items[0].error, Some(ErrorKind::InvalidXml));
    assert!(archive_names(&output.archive).is_empty());
    assert_eq!(output.summary.errors, 1);
    assert_eq!(output.summary.valid, 0);
}

#[tokio::test]
async fn test_unreadable_source_is_read_failure() {
    let output = BatchOrchestrator::default()
        .run(vec![
            TestSource::Unreadable("locked.xml".to_string()),
            TestSource::Ready(document("ok.xml", "factura.xml")),
        ])
        .await
        .unwrap();

    assert_eq!(output.items[0].filename, "locked.xml");
    assert_eq!(output.items[0].error, Some(ErrorKind::ReadFailure));
    assert!(output.items[1].is_valid());
}

#[tokio::test]
async fn test_total_rendered_in_words() {
    let output = BatchOrchestrator::default()
        .run(vec![document("factura.xml", "factura.xml")])
        .await
        .unwrap();

    let pdf = output.items[0].pdf_bytes.as_deref().unwrap();
    let text = pdf_text(pdf);
    assert!(text.iter().any(|run| run == "ciento dieciseis pesos 00/100 M.N."));
    assert!(text.iter().any(|run| run == "Hospedaje web anual"));
}

#[tokio::test]
async fn test_payroll_document_uses_payroll_layout() {
    let output = BatchOrchestrator::default()
        .run(vec![
            document("nomina.xml", "nomina.xml"),
            document("factura.xml", "factura.xml"),
        ])
        .await
        .unwrap();

    assert_eq!(output.items[0].kind(), Some(DocumentKind::Payroll));
    assert_eq!(output.items[1].kind(), Some(DocumentKind::General));

    let payroll = pdf_text(output.items[0].pdf_bytes.as_deref().unwrap());
    assert!(payroll.iter().any(|run| run == "Percepciones"));
    assert!(payroll.iter().any(|run| run == "Otros Pagos"));
    assert!(payroll.iter().any(|run| run == "Neto del recibo"));
    assert!(payroll.iter().any(|run| run == "8,749.50"));
    assert!(payroll.iter().any(|run| run.contains("Reg Pat: Y5412345108")));

    let general = pdf_text(output.items[1].pdf_bytes.as_deref().unwrap());
    assert!(general.iter().any(|run| run == "Receptor"));
    assert!(!general.iter().any(|run| run == "Percepciones"));

    // Both documents share issuer and month.
    assert_eq!(output.items[0].output_base_name.as_deref(), Some("acme-sa-24-03-02"));
    assert_eq!(output.items[1].output_base_name.as_deref(), Some("acme-sa-24-03-01"));
}

#[tokio::test]
async fn test_names_stable_under_permutation() {
    let build = || {
        vec![
            acme("a.xml", "2024-03-05T10:00:00"),
            acme("b.xml", "2024-03-05T10:00:00"),
            acme("c.xml", "2024-03-01T08:00:00"),
            document("n.xml", "nomina.xml"),
            acme("d.xml", "2024-04-01T08:00:00"),
        ]
    };

    let forward = BatchOrchestrator::default().run(build()).await.unwrap();
    let mut shuffled_input = build();
    shuffled_input.rotate_left(2);
    shuffled_input.swap(0, 2);
    let shuffled = BatchOrchestrator::default().run(shuffled_input).await.unwrap();

    let pairs = |items: &[cfdi_core::OutputItem]| {
        let mut pairs: Vec<(String, String)> = items
            .iter()
            .map(|i| (i.filename.clone(), i.output_base_name.clone().unwrap()))
            .collect();
        pairs.sort();
        pairs
    };
    let expected = pairs(&forward.items);
    assert_eq!(expected, pairs(&shuffled.items));

    let unique: HashSet<&String> = expected.iter().map(|(_, name)| name).collect();
    assert_eq!(unique.len(), 5);
}

#[tokio::test]
async fn test_archive_without_xml() {
    let mut config = CfdiConfig::default();
    config.output.include_xml = false;

    let output = BatchOrchestrator::new(&config)
        .run(vec![document("factura.xml", "factura.xml")])
        .await
        .unwrap();

    assert_eq!(archive_names(&output.archive), vec!["acme-sa-24-03-01.pdf"]);
}

#[tokio::test]
async fn test_bundle_contains_pdf_and_original_xml() {
    let output = BatchOrchestrator::default()
        .run(vec![document("factura.xml", "factura.xml")])
        .await
        .unwrap();

    let item = &output.items[0];
    let bundle = bundle_item(item).unwrap().unwrap();
    assert_eq!(
        archive_names(&bundle),
        vec!["acme-sa-24-03-01.pdf", "acme-sa-24-03-01.xml"]
    );
    assert_eq!(item.xml_text.as_deref(), Some(fixture("factura.xml").as_str()));
}

#[tokio::test]
async fn test_latin1_bytes_render_accented_issuer() {
    let bytes = std::fs::read(fixture_path("latin1.xml")).unwrap();
    let output = BatchOrchestrator::default()
        .run(vec![RawDocument::from_bytes("latin1.xml", &bytes)])
        .await
        .unwrap();

    let item = &output.items[0];
    assert_eq!(item.output_base_name.as_deref(), Some("acme-diseo-sa-24-03-01"));
    let text = pdf_text(item.pdf_bytes.as_deref().unwrap());
    assert!(text.iter().any(|run| run.contains("Acme Diseño S.A.")));
}
