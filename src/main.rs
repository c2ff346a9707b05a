//! CLI driver for the batch conversion engine.
//!
//! Owns the progress sink and all interactive concerns; the engine itself has
//! no UI dependency. Exits 0 whenever the batch ran to completion, even with
//! per-source failures — the summary line carries the breakdown.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use webp_batch::core::{default_concurrency, parse_widths, DEFAULT_NAME_PATTERN};
use webp_batch::{run_batch, ConversionOptions};

#[derive(Parser, Debug)]
#[command(name = "webp-batch", version, about = "Convert a directory of images into responsive WebP width variants")]
struct Args {
    /// Directory scanned recursively for source images
    input_dir: PathBuf,

    /// Directory receiving the WebP derivatives
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Comma-separated target widths in pixels
    #[arg(long, default_value = "640,768,1024,1280,1536,1920")]
    widths: String,

    /// Lossy encoding quality (0-100)
    #[arg(short, long, default_value_t = 80)]
    quality: u8,

    /// Copy EXIF and ICC metadata to every derivative
    #[arg(long)]
    keep_metadata: bool,

    /// Allow derivatives wider than the source image
    #[arg(long)]
    allow_upscale: bool,

    /// Encode transparent sources lossy instead of lossless
    #[arg(long)]
    no_lossless_alpha: bool,

    /// Derivative name template with {name} and {width} placeholders
    #[arg(long, default_value = DEFAULT_NAME_PATTERN)]
    pattern: String,

    /// Simultaneous conversions (default: host CPU count, clamped to 2..=32)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Write the final batch summary as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let options = ConversionOptions {
        widths: parse_widths(&args.widths),
        quality: args.quality,
        keep_metadata: args.keep_metadata,
        skip_upscale: !args.allow_upscale,
        lossless_for_alpha: !args.no_lossless_alpha,
        name_pattern: args.pattern,
        concurrency: args.jobs.unwrap_or_else(default_concurrency),
    };

    let summary = run_batch(&args.input_dir, &args.output_dir, options, |update| {
        let result = &update.result;
        match &result.error {
            None => println!(
                "[{}/{}] ok   {} ({} variants)",
                update.completed_tasks,
                update.total_tasks,
                result.source.display(),
                result.outputs.len()
            ),
            Some(error) => println!(
                "[{}/{}] FAIL {}: {error}",
                update.completed_tasks,
                update.total_tasks,
                result.source.display()
            ),
        }
    })
    .await?;

    println!(
        "done: {} sources, {} derivatives, {} failures in {:.1}s",
        summary.total_sources,
        summary.total_outputs,
        summary.failures.len(),
        summary.elapsed_ms as f64 / 1000.0
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write report {}", path.display()))?;
    }

    Ok(())
}
