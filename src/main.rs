use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use image_fetcher::{logging, Downloader, Manifest};

/// Fetches the images listed in a manifest into a local directory.
#[derive(Debug, Parser)]
#[command(name = "image-fetcher", version)]
#[command(about = "Download the images listed in a TOML manifest", long_about = None)]
struct Cli {
    /// Manifest listing the images to fetch.
    #[arg(value_name = "MANIFEST", default_value = "manifests/stock_images.toml")]
    manifest: PathBuf,

    /// Write files here instead of the manifest's `output_dir`.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Pause between downloads in milliseconds, overriding the manifest's `delay_ms`.
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Exit with status 1 if any image failed. By default a run always exits 0.
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    logging::init_logging();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("image-fetcher error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let manifest = Manifest::load(&cli.manifest)
        .with_context(|| format!("loading {}", cli.manifest.display()))?;

    let output_dir = cli.output_dir.unwrap_or_else(|| manifest.output_dir.clone());
    let delay = Duration::from_millis(cli.delay_ms.unwrap_or(manifest.delay_ms));
    let requests = manifest.requests();

    tracing::debug!(
        manifest = %cli.manifest.display(),
        images = requests.len(),
        ?delay,
        "loaded manifest"
    );

    let downloader = Downloader::new(&output_dir);
    let report = image_fetcher::run(&downloader, &requests, delay);

    println!(
        "downloaded {} of {} images into {} ({} failed)",
        report.succeeded(),
        report.total(),
        downloader.output_dir().display(),
        report.failed()
    );

    Ok(ExitCode::from(report.exit_status(cli.strict)))
}
