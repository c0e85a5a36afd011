use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tender_ingest::{Capabilities, ExtractOptions, OcrSettings};
use tracing_subscriber::EnvFilter;

mod output;
mod settings;

use output::ColorMode;
use settings::{Layer, Settings};

/// Tender Analyzer - Extract title, reference, organization and closing date from tender PDFs
#[derive(Parser, Debug)]
#[command(name = "tender-analyzer", version, about, long_about = None)]
struct Cli {
    /// Path to the PDF file to analyze
    path: PathBuf,

    /// Emit JSON output
    #[arg(long)]
    json: bool,

    /// Force OCR for all pages
    #[arg(long)]
    ocr: bool,

    /// DPI for OCR rendering [default: 200]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: Option<u32>,

    /// Tesseract executable used for OCR
    #[arg(long, value_name = "CMD")]
    tesseract: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Flags only count when given; an absent switch defers to env and config.
    fn layer(&self) -> Layer {
        Layer {
            json: self.json.then_some(true),
            force_ocr: self.ocr.then_some(true),
            dpi: self.dpi,
            tesseract_cmd: self.tesseract.clone(),
            color: self.no_color.then_some(false),
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let config = tender_core::config_file::load_config();
    let settings = Settings::resolve(
        cli.layer(),
        Layer::from_env(),
        Layer::from_config(&config),
        std::io::stdout().is_terminal(),
    );
    tracing::debug!(?settings, "resolved settings");
    let parser =
        settings::field_parser(&config).context("invalid [parsing] pattern in config file")?;

    if !cli.path.exists() {
        anyhow::bail!("File not found: {}", cli.path.display());
    }

    let capabilities = Capabilities::detect(&OcrSettings {
        tesseract_cmd: settings.tesseract_cmd.clone(),
    });
    tracing::info!(?capabilities, "capabilities detected");

    let options = ExtractOptions {
        force_ocr: settings.force_ocr,
        dpi: settings.dpi,
    };
    let result = tender_ingest::analyze_file_with(&cli.path, &options, &capabilities, &parser)?;

    // Render fully before writing so a failure never leaves partial output
    let mut buf: Vec<u8> = Vec::new();
    if settings.json {
        output::print_json(&mut buf, &result)?;
    } else {
        output::print_report(&mut buf, &result, ColorMode(settings.color))?;
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&buf).context("failed to write output")?;
    stdout.flush()?;
    Ok(())
}
