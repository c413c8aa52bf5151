//! Command-line client for the PDF OCR server
//!
//! Uploads a PDF and prints its text. Scanned documents are rasterized
//! locally and sent page by page for OCR.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_ocr::client::{FallbackPipeline, HttpOcrClient, MuPdfRasterizer, PdfFile};

#[derive(Parser, Debug)]
#[command(name = "pdf-ocr", version, about = "Extract text from a PDF, with OCR for scanned documents")]
struct Args {
    /// PDF file to extract
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Base URL of the OCR server
    #[arg(long, env = "OCR_SERVER_URL", default_value = "http://localhost:5000")]
    server: String,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the full JSON result instead of the text
    #[arg(long)]
    json: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_ocr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    let file = PdfFile::open(&args.file).await?;
    let client = HttpOcrClient::new(&args.server, args.timeout_secs.map(Duration::from_secs))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("template is compile-time constant"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));

    let progress = spinner.clone();
    let pipeline = FallbackPipeline::new(Arc::new(client), Arc::new(MuPdfRasterizer::default()))
        .on_event(move |event| progress.set_message(event.to_string()));

    let result = pipeline.run(&file).await;
    spinner.finish_and_clear();
    let result = result?;

    if !result.skipped_pages.is_empty() {
        tracing::warn!("Pages without text: {:?}", result.skipped_pages);
    }
    eprintln!("{}", result.message);

    let rendered = if args.json {
        serde_json::to_string_pretty(&result)?
    } else {
        result.text().to_string()
    };

    match args.output {
        Some(path) => tokio::fs::write(&path, rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}
