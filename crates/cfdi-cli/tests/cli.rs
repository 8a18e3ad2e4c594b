use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("cfdi-core")
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Command isolated from any user configuration.
fn cfdi2pdf(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cfdi2pdf").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn inputs_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in ["factura.xml", "nomina.xml", "sin_fecha.xml", "malformado.xml"] {
        fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }
    fs::write(dir.path().join("readme.txt"), "not a cfdi").unwrap();
    dir
}

fn zip_names(path: &Path) -> Vec<String> {
    let bytes = fs::read(path).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    cfdi2pdf(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("process"));
}

#[test]
fn test_batch_writes_archive() {
    let home = TempDir::new().unwrap();
    let inputs = inputs_dir();
    let out = TempDir::new().unwrap();

    cfdi2pdf(home.path())
        .arg("batch")
        .arg(inputs.path())
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 4 XML files"))
        .stdout(predicate::str::contains("2 rendered"))
        .stdout(predicate::str::contains("Missing or invalid Fecha attribute"))
        .stdout(predicate::str::contains("Invalid XML"));

    assert_eq!(
        zip_names(&out.path().join("cfdi-pdfs.zip")),
        vec![
            "acme-sa-24-03-01.pdf",
            "acme-sa-24-03-01.xml",
            "acme-sa-24-03-02.pdf",
            "acme-sa-24-03-02.xml",
        ]
    );
}

#[test]
fn test_batch_renders_latin1_file() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    cfdi2pdf(home.path())
        .arg("batch")
        .arg(fixture("latin1.xml"))
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rendered"));

    assert_eq!(
        zip_names(&out.path().join("cfdi-pdfs.zip")),
        vec!["acme-diseo-sa-24-03-01.pdf", "acme-diseo-sa-24-03-01.xml"]
    );
}

#[test]
fn test_batch_without_xml_and_custom_name() {
    let home = TempDir::new().unwrap();
    let inputs = inputs_dir();
    let out = TempDir::new().unwrap();

    cfdi2pdf(home.path())
        .arg("batch")
        .arg(inputs.path().join("factura.xml"))
        .args(["--no-xml", "--archive-name", "marzo.zip", "--individual", "--bundles"])
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success();

    assert_eq!(zip_names(&out.path().join("marzo.zip")), vec!["acme-sa-24-03-01.pdf"]);
    assert!(out.path().join("acme-sa-24-03-01.pdf").exists());
    assert!(out.path().join("acme-sa-24-03-01.xml").exists());
    assert_eq!(
        zip_names(&out.path().join("acme-sa-24-03-01.zip")),
        vec!["acme-sa-24-03-01.pdf", "acme-sa-24-03-01.xml"]
    );
}

#[test]
fn test_batch_summary_csv_and_json() {
    let home = TempDir::new().unwrap();
    let inputs = inputs_dir();
    let out = TempDir::new().unwrap();

    let assert = cfdi2pdf(home.path())
        .arg("batch")
        .arg(inputs.path())
        .args(["--summary", "--json"])
        .arg("--output-dir")
        .arg(out.path())
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["summary"]["total"], 4);
    assert_eq!(report["summary"]["errors"], 2);
    assert_eq!(report["items"].as_array().unwrap().len(), 4);

    let csv = fs::read_to_string(out.path().join("summary.csv")).unwrap();
    assert!(csv.starts_with("filename,status,output_name"));
    assert!(csv.contains("nomina.xml,success,acme-sa-24-03-02,payroll"));
    assert!(csv.contains("sin_fecha.xml,error"));
}

#[test]
fn test_batch_with_no_inputs_fails() {
    let home = TempDir::new().unwrap();
    let empty = TempDir::new().unwrap();

    cfdi2pdf(home.path())
        .arg("batch")
        .arg(empty.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No XML files found"));
}

#[test]
fn test_process_single_file() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let pdf = out.path().join("factura.pdf");

    cfdi2pdf(home.path())
        .arg("process")
        .arg(fixture("factura.xml"))
        .arg("--output")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("PDF written"));

    let bytes = fs::read(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_process_text_preview() {
    let home = TempDir::new().unwrap();

    cfdi2pdf(home.path())
        .arg("process")
        .arg(fixture("nomina.xml"))
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- page 1 ---"))
        .stdout(predicate::str::contains("Neto del recibo"))
        .stdout(predicate::str::contains("ocho mil setecientos cuarenta y nueve pesos 50/100 M.N."));
}

#[test]
fn test_process_reports_item_error() {
    let home = TempDir::new().unwrap();

    cfdi2pdf(home.path())
        .arg("process")
        .arg(fixture("sin_fecha.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing or invalid Fecha attribute"));
}

#[test]
fn test_config_init_and_get() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("cfdi.json");

    cfdi2pdf(home.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    cfdi2pdf(home.path())
        .args(["config", "get", "output.archive_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cfdi-pdfs.zip"));
}

#[test]
fn test_config_set_round_trip() {
    let home = TempDir::new().unwrap();

    cfdi2pdf(home.path())
        .args(["config", "set", "output.include_xml", "false"])
        .assert()
        .success();

    cfdi2pdf(home.path())
        .args(["config", "get", "output.include_xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));
}
