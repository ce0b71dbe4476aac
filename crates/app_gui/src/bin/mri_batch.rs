//! Headless triage of a single scan or a folder of scans.

use anyhow::{Context, Result};
use clap::Parser;
use mri_core::{
    AppConfig, AppContext, DEFAULT_CONFIG_FILE, ScanOptions, collect_images, export_csv, triage,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "MriBatch", version, about = "Classify MRI scans without the GUI")]
struct Cli {
    /// Image file or folder of images (.jpg, .jpeg, .png)
    input: PathBuf,
    /// Descend into subfolders
    #[arg(short, long)]
    recursive: bool,
    /// Write a CSV report here instead of printing JSON lines
    #[arg(long)]
    csv: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)?;
    let ctx = AppContext::load(config);
    if let Some(err) = ctx.model_error() {
        anyhow::bail!("Model loading failed: {err}");
    }

    let files = collect_images(
        &cli.input,
        ScanOptions {
            recursive: cli.recursive,
        },
    )?;
    if files.is_empty() {
        tracing::warn!("no images found under {}", cli.input.display());
        return Ok(());
    }

    let rows = triage(&ctx, &files, |done, total| {
        tracing::info!("classified {done}/{total}");
    });

    match &cli.csv {
        Some(path) => {
            export_csv(&rows, path)
                .with_context(|| format!("could not write {}", path.display()))?;
            tracing::info!("report written to {}", path.display());
        }
        None => {
            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }
    }

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    tracing::info!("done: {} scans, {failed} failed", rows.len());
    Ok(())
}
