//! vmclassify - Train on one dataset file, predict another
//!
//! Usage: vmclassify <training> <test> <output_dir> [--ground-truth <file>]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vocmus_cli::output::{print_json, ClassifyOutput};
use vocmus_core::{build_report, classify, ClassifierConfig, Dataset, FixedHyperparameters, SmoEngine};
use vocmus_data::{read_ground_truth, write_predictions};

#[derive(Parser, Debug)]
#[command(name = "vmclassify")]
#[command(about = "Train an RBF C-SVC on a dataset file and classify a test dataset", long_about = None)]
struct Args {
    /// Training dataset file
    training: PathBuf,

    /// Test dataset file
    test: PathBuf,

    /// Directory for the model, predictions and report
    output_dir: PathBuf,

    /// Ground-truth file for the test set; enables the report
    #[arg(short, long)]
    ground_truth: Option<PathBuf>,

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

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", args.output_dir.display())
    })?;

    let training = Dataset::from_file(&args.training)?;
    let test = Dataset::from_file(&args.test)?;
    let training_examples = training.len();
    let test_examples = test.len();
    log::info!(
        "Loaded {} training and {} test examples",
        training_examples,
        test_examples
    );

    let selector = FixedHyperparameters::from_config(&config.svm);
    let classification = classify(training, test, &selector, &SmoEngine)?;

    let model_path = args.output_dir.join(&config.output.model);
    let predictions_path = args.output_dir.join(&config.output.predictions);
    classification.model.save(&model_path, training_examples)?;
    write_predictions(&predictions_path, &classification.predictions)?;

    let (report, evaluation) = match &args.ground_truth {
        Some(path) => {
            let ground_truth = read_ground_truth(path)?;
            let (report, evaluation) = build_report(&ground_truth, &classification.predictions)
                .with_context(|| format!("Cannot join {} with predictions", path.display()))?;
            let report_path = args.output_dir.join(&config.output.report);
            report.write(&report_path)?;
            log::info!("Accuracy of the classification: {}", evaluation.accuracy);
            (Some(report_path), Some(evaluation))
        }
        None => (None, None),
    };

    print_json(&ClassifyOutput {
        training_examples,
        test_examples,
        support_vectors: classification.model.support_vectors.len(),
        model: model_path,
        predictions: predictions_path,
        report,
        evaluation,
    });

    Ok(())
}
