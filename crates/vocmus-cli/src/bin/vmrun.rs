//! vmrun - Full speech/music classification run
//!
//! Usage: vmrun <output_dir> --train <files...> --test <files...>

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vocmus_cli::output::print_json;
use vocmus_core::{run, ClassifierConfig, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "vmrun")]
#[command(about = "Extract features, train, classify and report in one run", long_about = None)]
struct Args {
    /// Directory for datasets, model, predictions and report
    output_dir: PathBuf,

    /// Training audio files (labels come from file names)
    #[arg(long = "train", num_args = 1.., required = true)]
    training_files: Vec<PathBuf>,

    /// Test audio files
    #[arg(long = "test", num_args = 1.., required = true)]
    test_files: Vec<PathBuf>,

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
    let run_config = RunConfig {
        training_files: args.training_files,
        test_files: args.test_files,
        output_dir: args.output_dir,
    };

    let start = std::time::Instant::now();
    let summary = run(&run_config, &config)?;
    log::info!("Run finished in {:.2}s", start.elapsed().as_secs_f64());

    print_json(&summary);
    Ok(())
}
