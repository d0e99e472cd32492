//! vmextract - Audio clips to a feature dataset file
//!
//! Usage: vmextract <output> <files...>

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vocmus_cli::output::{print_json, ExtractOutput};
use vocmus_core::pipeline::{write_dataset_file, FeaturePipeline};
use vocmus_core::ClassifierConfig;
use vocmus_data::ClassLabel;

#[derive(Parser, Debug)]
#[command(name = "vmextract")]
#[command(about = "Extract speech/music features from audio files into a dataset file", long_about = None)]
struct Args {
    /// Output dataset file
    output: PathBuf,

    /// Audio files, in dataset order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    vocmus_cli::init_logger(args.verbose);

    let config = ClassifierConfig::load_or_default(args.config.as_deref())?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let start = std::time::Instant::now();
    let pipeline = FeaturePipeline::new(&config);
    let outcome = pipeline.extract_set("input", &args.files)?;
    let records = write_dataset_file(&args.output, &outcome.extracted)?;

    let speech = outcome
        .extracted
        .iter()
        .filter(|f| f.vector.label == ClassLabel::Speech)
        .count();

    log::info!(
        "Wrote {} records to {} in {:.2}s",
        records,
        args.output.display(),
        start.elapsed().as_secs_f64()
    );

    print_json(&ExtractOutput {
        output: args.output,
        files: args.files.len(),
        records,
        speech,
        music: records - speech,
        skipped: outcome.skipped,
    });

    Ok(())
}
