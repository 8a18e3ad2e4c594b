//! Batch command - render many CFDI files into one archive.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use cfdi_core::batch::{BatchObserver, BatchOutput, BatchPhase, BatchProgress};
use cfdi_core::normalize::{format_date, format_money};
use cfdi_core::{BatchOrchestrator, ErrorKind, OutputItem, bundle_item};

use super::load_config;
use super::source::{FileSource, gather_inputs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files, directories or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Leave the renamed XML files out of the archive
    #[arg(long)]
    no_xml: bool,

    /// Archive file name
    #[arg(long)]
    archive_name: Option<String>,

    /// Also write each PDF and XML to the output directory
    #[arg(long)]
    individual: bool,

    /// Also write a ZIP bundle per document
    #[arg(long)]
    bundles: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Print a JSON report to stdout instead of the human summary
    #[arg(long)]
    json: bool,
}

/// Spinner that follows the batch phases.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BatchObserver for ProgressObserver {
    fn on_progress(&self, progress: BatchProgress) {
        let label = match progress.phase {
            BatchPhase::Parsing => "Parsing XML",
            BatchPhase::Grouping => "Grouping by issuer and month",
            BatchPhase::Rendering => "Generating PDFs",
            BatchPhase::Archiving => "Building ZIP",
            BatchPhase::Ready => "Ready",
        };
        self.bar
            .set_message(format!("{} ({}/{})", label, progress.processed, progress.total));
    }

    fn on_item_failed(&self, filename: &str, error: ErrorKind) {
        self.bar
            .println(format!("{} {}: {}", style("✗").red(), filename, error));
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    archive: String,
    #[serde(flatten)]
    output: &'a BatchOutput,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.no_xml {
        config.output.include_xml = false;
    }
    if let Some(name) = &args.archive_name {
        config.output.archive_name = name.clone();
    }
    config.output.write_individual |= args.individual;
    config.output.write_bundles |= args.bundles;

    let files = gather_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No XML files found in: {}", args.inputs.join(", "));
    }
    if !args.json {
        println!(
            "{} Found {} XML files to process",
            style("ℹ").blue(),
            files.len()
        );
    }

    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let sources: Vec<FileSource> = files.into_iter().map(FileSource::new).collect();
    let observer = ProgressObserver::new(args.json);
    let output = BatchOrchestrator::new(&config)
        .run_with(sources, &observer)
        .await;
    observer.finish();
    let output = output?;

    let archive_path = output_dir.join(&config.output.archive_name);
    fs::write(&archive_path, &output.archive)?;
    debug!("Wrote archive to {}", archive_path.display());

    if config.output.write_individual {
        write_individual(&output_dir, &output)?;
    }
    if config.output.write_bundles {
        write_bundles(&output_dir, &output)?;
    }

    let summary_path = output_dir.join("summary.csv");
    if args.summary {
        write_summary(&summary_path, &output.items)?;
    }

    if args.json {
        let report = JsonReport {
            archive: archive_path.display().to_string(),
            output: &output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.summary {
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        output.summary.total,
        start.elapsed()
    );
    println!(
        "   {} rendered, {} failed",
        style(output.summary.valid).green(),
        style(output.summary.errors).red()
    );
    println!(
        "{} Archive written to {}",
        style("✓").green(),
        archive_path.display()
    );

    for item in output.valid_items() {
        println!("  {}", describe(item));
    }

    let failed: Vec<_> = output.failed_items().collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (item, error) in failed {
            println!("  - {}: {}", item.filename, error);
        }
    }

    Ok(())
}

/// `<base>  <filename> - <date> - Total <amount>`
fn describe(item: &OutputItem) -> String {
    let total = item
        .invoice()
        .map(|invoice| format_money(invoice.voucher.total.as_deref()))
        .unwrap_or_else(|| format_money(None));
    format!(
        "{}  {} - {} - Total {}",
        style(item.output_base_name.as_deref().unwrap_or(&item.filename)).bold(),
        item.filename,
        format_date(item.date.as_ref()),
        total
    )
}

fn write_individual(dir: &Path, output: &BatchOutput) -> anyhow::Result<()> {
    for item in output.valid_items() {
        if let (Some(name), Some(pdf)) = (item.pdf_name(), item.pdf_bytes.as_deref()) {
            fs::write(dir.join(name), pdf)?;
        }
        if let (Some(name), Some(xml)) = (item.xml_name(), item.xml_text.as_deref()) {
            fs::write(dir.join(name), xml)?;
        }
    }
    Ok(())
}

fn write_bundles(dir: &Path, output: &BatchOutput) -> anyhow::Result<()> {
    for item in output.valid_items() {
        if let (Some(name), Some(bytes)) = (item.bundle_name(), bundle_item(item)?) {
            fs::write(dir.join(name), bytes)?;
        }
    }
    Ok(())
}

fn write_summary(path: &Path, items: &[OutputItem]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "output_name",
        "kind",
        "issuer_name",
        "issuer_rfc",
        "issue_date",
        "total",
        "error",
    ])?;

    for item in items {
        match (item.invoice(), item.error) {
            (Some(invoice), None) => {
                let date = format_date(item.date.as_ref());
                let total = format_money(invoice.voucher.total.as_deref());
                wtr.write_record([
                    item.filename.as_str(),
                    "success",
                    item.output_base_name.as_deref().unwrap_or(""),
                    invoice.kind.as_str(),
                    invoice.issuer.name.as_deref().unwrap_or(""),
                    invoice.issuer.rfc.as_deref().unwrap_or(""),
                    date.as_str(),
                    total.as_str(),
                    "",
                ])?;
            }
            (_, error) => {
                let message = error.map(|e| e.to_string()).unwrap_or_default();
                wtr.write_record([
                    item.filename.as_str(),
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    message.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
