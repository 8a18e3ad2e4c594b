//! Process command - render a single CFDI file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use cfdi_core::render::page_text;
use cfdi_core::{BatchOrchestrator, OutputItem};

use super::load_config;
use super::source::FileSource;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input CFDI XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: `<name>.pdf` in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pdf")]
    format: OutputFormat,

    /// Also write the XML under the generated name next to the PDF
    #[arg(long)]
    with_xml: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Rendered PDF
    Pdf,
    /// Extracted fields as JSON
    Json,
    /// Text lines of the rendered PDF, page by page
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Rendering...");

    let output = BatchOrchestrator::new(&config)
        .run(vec![FileSource::new(args.input.clone())])
        .await;
    pb.finish_and_clear();

    let mut output = output?;
    let item = output
        .items
        .pop()
        .ok_or_else(|| anyhow::anyhow!("No result for {}", args.input.display()))?;

    if let Some(error) = item.error {
        anyhow::bail!("{}: {}", item.filename, error);
    }

    match args.format {
        OutputFormat::Pdf => write_pdf(&args, &item)?,
        OutputFormat::Json => {
            let invoice = item
                .invoice()
                .ok_or_else(|| anyhow::anyhow!("No record for {}", item.filename))?;
            emit(&args, serde_json::to_string_pretty(&invoice)?)?;
        }
        OutputFormat::Text => {
            let pdf = item
                .pdf_bytes
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Nothing rendered for {}", item.filename))?;
            let pages = page_text(pdf)?;
            let text = pages
                .iter()
                .enumerate()
                .map(|(i, runs)| format!("--- page {} ---\n{}", i + 1, runs.join("\n")))
                .collect::<Vec<_>>()
                .join("\n");
            emit(&args, text)?;
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn write_pdf(args: &ProcessArgs, item: &OutputItem) -> anyhow::Result<()> {
    let (Some(name), Some(pdf)) = (item.pdf_name(), item.pdf_bytes.as_deref()) else {
        anyhow::bail!("Nothing rendered for {}", item.filename);
    };

    let pdf_path = args.output.clone().unwrap_or_else(|| PathBuf::from(&name));
    if let Some(parent) = pdf_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pdf_path, pdf)?;
    println!(
        "{} PDF written to {}",
        style("✓").green(),
        pdf_path.display()
    );

    if args.with_xml {
        if let (Some(xml_name), Some(xml)) = (item.xml_name(), item.xml_text.as_deref()) {
            let xml_path = pdf_path.with_file_name(xml_name);
            fs::write(&xml_path, xml)?;
            println!(
                "{} XML written to {}",
                style("✓").green(),
                xml_path.display()
            );
        }
    }

    Ok(())
}

fn emit(args: &ProcessArgs, content: String) -> anyhow::Result<()> {
    if let Some(output_path) = &args.output {
        fs::write(output_path, &content)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}
