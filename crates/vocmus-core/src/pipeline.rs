//! Batch pipeline: audio files → datasets → model → predictions → report
//!
//! File order is preserved end to end. The report joins ground truth and
//! predictions by position, so a reordered dataset would silently mislabel
//! every row.

use crate::audio::decode_audio;
use crate::config::{ClassifierConfig, FailurePolicy};
use crate::dataset::{normalize, Dataset, Example};
use crate::error::{ClassifyError, ExtractionError, PipelineError, Stage};
use crate::evaluation::{build_report, EvaluationReport};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::labeling::{display_name, Labeler, SubstringLabeler};
use crate::svm::{ClassifierEngine, FixedHyperparameters, HyperparameterSelector, SmoEngine, SvmModel};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use vocmus_data::{
    write_predictions, ClassLabel, DatasetWriter, GroundTruthEntry, GroundTruthWriter,
};

/// Inputs of one end-to-end run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub training_files: Vec<PathBuf>,
    pub test_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// A file that produced a feature vector
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub path: PathBuf,
    /// Name used in ground-truth and report rows
    pub name: String,
    pub vector: FeatureVector,
}

/// A file left out under `FailurePolicy::Skip`
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub stage: Stage,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub extracted: Vec<ExtractedFile>,
    pub skipped: Vec<SkippedFile>,
}

impl ExtractionOutcome {
    pub fn dataset(&self) -> Dataset {
        self.extracted
            .iter()
            .map(|f| Example::from_vector(&f.vector, f.name.clone()))
            .collect()
    }

    pub fn ground_truth(&self) -> Vec<GroundTruthEntry> {
        self.extracted
            .iter()
            .map(|f| GroundTruthEntry::new(f.name.clone(), f.vector.label))
            .collect()
    }
}

/// Decodes, labels and extracts features for sets of files
pub struct FeaturePipeline<L: Labeler = SubstringLabeler> {
    extractor: FeatureExtractor,
    labeler: L,
    policy: FailurePolicy,
    parallel: bool,
}

impl FeaturePipeline<SubstringLabeler> {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self::with_labeler(config, SubstringLabeler::from_config(&config.labeling))
    }
}

impl<L: Labeler> FeaturePipeline<L> {
    pub fn with_labeler(config: &ClassifierConfig, labeler: L) -> Self {
        Self {
            extractor: FeatureExtractor::new(&config.analysis),
            labeler,
            policy: config.pipeline.on_file_error,
            parallel: config.pipeline.parallel,
        }
    }

    /// Decode one file and turn it into a labeled feature vector
    pub fn extract_file(&self, path: &Path) -> Result<FeatureVector, ExtractionError> {
        let audio = decode_audio(path).map_err(|e| ExtractionError::Decode(format!("{:#}", e)))?;
        let label = self.labeler.label_path(path);
        log::debug!(
            "{}: {} samples at {} Hz, label {}",
            path.display(),
            audio.samples.len(),
            audio.sample_rate,
            label.name()
        );
        self.extractor.extract(&audio.samples, audio.sample_rate, label)
    }

    /// Extract every file of a set, in input order
    ///
    /// `set` names the set in errors and logs ("training", "test").
    pub fn extract_set(&self, set: &'static str, files: &[PathBuf]) -> Result<ExtractionOutcome, PipelineError> {
        log::info!(
            "Extracting {} {} files (zero-crossing feature: {:?}{})",
            files.len(),
            set,
            self.extractor.zero_crossing_mode(),
            if self.parallel { ", parallel" } else { "" }
        );

        let mut outcome = ExtractionOutcome::default();

        if self.parallel {
            // Indexed collect keeps input order regardless of completion order
            let results: Vec<Result<FeatureVector, ExtractionError>> =
                files.par_iter().map(|path| self.extract_file(path)).collect();
            for (path, result) in files.iter().zip(results) {
                self.accept(&mut outcome, path, result)?;
            }
        } else {
            for path in files {
                let result = self.extract_file(path);
                self.accept(&mut outcome, path, result)?;
            }
        }

        if outcome.extracted.is_empty() {
            return Err(PipelineError::NoUsableFiles {
                set,
                attempted: files.len(),
            });
        }
        if !outcome.skipped.is_empty() {
            log::warn!(
                "Skipped {} of {} {} files",
                outcome.skipped.len(),
                files.len(),
                set
            );
        }
        Ok(outcome)
    }

    fn accept(
        &self,
        outcome: &mut ExtractionOutcome,
        path: &Path,
        result: Result<FeatureVector, ExtractionError>,
    ) -> Result<(), PipelineError> {
        match result {
            Ok(vector) => {
                outcome.extracted.push(ExtractedFile {
                    path: path.to_path_buf(),
                    name: display_name(path),
                    vector,
                });
                Ok(())
            }
            Err(e) => match self.policy {
                FailurePolicy::Abort => Err(PipelineError::file(path, e)),
                FailurePolicy::Skip => {
                    log::warn!("Skipping {} ({} stage): {}", path.display(), e.stage(), e);
                    outcome.skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        stage: e.stage(),
                        reason: e.to_string(),
                    });
                    Ok(())
                }
            },
        }
    }
}

/// Write extracted vectors as a dataset file; returns the record count
pub fn write_dataset_file(path: &Path, files: &[ExtractedFile]) -> Result<usize> {
    let mut writer = DatasetWriter::create(path)?;
    for file in files {
        writer.write_record(&file.vector.to_record())?;
    }
    writer.finish()
}

/// Write the ground-truth file of a test set; returns the entry count
pub fn write_ground_truth_file(path: &Path, entries: &[GroundTruthEntry]) -> Result<usize> {
    let mut writer = GroundTruthWriter::create(path)?;
    for entry in entries {
        writer.write_entry(entry)?;
    }
    writer.finish()
}

/// Trained model and its predictions for a test set
#[derive(Debug, Clone)]
pub struct Classification {
    pub model: SvmModel,
    pub predictions: Vec<ClassLabel>,
}

/// Normalize both sets, train on one, predict the other
pub fn classify(
    training: Dataset,
    test: Dataset,
    selector: &dyn HyperparameterSelector,
    engine: &dyn ClassifierEngine,
) -> Result<Classification, ClassifyError> {
    if training.is_empty() || test.is_empty() {
        return Err(ClassifyError::EmptyDataset);
    }
    let training = normalize(training).map_err(|e| e.in_set("training"))?;
    let test = normalize(test).map_err(|e| e.in_set("test"))?;

    let params = selector.select(&training);
    log::info!(
        "Training {:?} with {:?} kernel, C={}, gamma={}",
        params.svm_type,
        params.kernel,
        params.c,
        params.gamma
    );
    let model = engine.train(&training, &params)?;
    let predictions = engine.predict(&model, &test)?;
    Ok(Classification { model, predictions })
}

/// Paths of everything a run wrote
#[derive(Debug, Clone, Serialize)]
pub struct RunOutputs {
    pub training_dataset: PathBuf,
    pub test_dataset: PathBuf,
    pub ground_truth: PathBuf,
    pub model: PathBuf,
    pub predictions: PathBuf,
    pub report: PathBuf,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub training_files: usize,
    pub test_files: usize,
    pub training_examples: usize,
    pub test_examples: usize,
    pub skipped: Vec<SkippedFile>,
    pub support_vectors: usize,
    pub iterations: usize,
    pub evaluation: EvaluationReport,
    pub outputs: RunOutputs,
}

impl RunOutputs {
    fn paths(&self) -> [&Path; 6] {
        [
            self.training_dataset.as_path(),
            self.test_dataset.as_path(),
            self.ground_truth.as_path(),
            self.model.as_path(),
            self.predictions.as_path(),
            self.report.as_path(),
        ]
    }

    /// Remove outputs of an earlier run; missing files are fine
    fn clear(&self) -> Result<()> {
        for path in self.paths() {
            match std::fs::remove_file(path) {
                Ok(()) => log::debug!("Removed previous output {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(PipelineError::Io(e))
                        .with_context(|| format!("Failed to remove {}", path.display()))
                }
            }
        }
        Ok(())
    }
}

/// Run the whole pipeline with the default labeler and SMO engine
pub fn run(run_config: &RunConfig, config: &ClassifierConfig) -> Result<RunSummary> {
    let pipeline = FeaturePipeline::new(config);
    let selector = FixedHyperparameters::from_config(&config.svm);
    run_with(run_config, config, &pipeline, &selector, &SmoEngine)
}

/// Run the whole pipeline with explicit collaborators
pub fn run_with<L: Labeler>(
    run_config: &RunConfig,
    config: &ClassifierConfig,
    pipeline: &FeaturePipeline<L>,
    selector: &dyn HyperparameterSelector,
    engine: &dyn ClassifierEngine,
) -> Result<RunSummary> {
    let dir = &run_config.output_dir;
    std::fs::create_dir_all(dir)
        .map_err(PipelineError::Io)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let names = &config.output;
    let outputs = RunOutputs {
        training_dataset: dir.join(&names.training_dataset),
        test_dataset: dir.join(&names.test_dataset),
        ground_truth: dir.join(&names.ground_truth),
        model: dir.join(&names.model),
        predictions: dir.join(&names.predictions),
        report: dir.join(&names.report),
    };
    outputs.clear()?;

    let training = pipeline.extract_set("training", &run_config.training_files)?;
    write_dataset_file(&outputs.training_dataset, &training.extracted)?;

    let test = pipeline.extract_set("test", &run_config.test_files)?;
    write_dataset_file(&outputs.test_dataset, &test.extracted)?;
    let ground_truth = test.ground_truth();
    write_ground_truth_file(&outputs.ground_truth, &ground_truth)?;

    let training_set = training.dataset();
    let training_examples = training_set.len();
    let classification = classify(training_set, test.dataset(), selector, engine)
        .map_err(PipelineError::from)?;

    classification
        .model
        .save(&outputs.model, training_examples)?;
    write_predictions(&outputs.predictions, &classification.predictions)?;

    let (report, evaluation) = build_report(&ground_truth, &classification.predictions)
        .map_err(PipelineError::from)?;
    report.write(&outputs.report)?;

    log::info!(
        "Accuracy {}% over {} test files; report written to {}",
        evaluation.accuracy,
        ground_truth.len(),
        outputs.report.display()
    );

    let mut skipped = training.skipped;
    skipped.extend(test.skipped);

    Ok(RunSummary {
        training_files: run_config.training_files.len(),
        test_files: run_config.test_files.len(),
        training_examples,
        test_examples: ground_truth.len(),
        skipped,
        support_vectors: classification.model.support_vectors.len(),
        iterations: classification.model.iterations,
        evaluation,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use vocmus_data::{read_dataset, read_ground_truth, read_predictions};

    /// Mono 16-bit WAV of summed sines
    fn write_wav(path: &Path, freqs: &[f64], sample_rate: u32, len: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..len {
            let t = i as f64 / sample_rate as f64;
            let v: f64 = freqs.iter().map(|f| (2.0 * PI * f * t + 0.2).sin()).sum::<f64>()
                / freqs.len() as f64;
            writer.write_sample((v * 0.5 * i16::MAX as f64) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn fixtures(dir: &Path) -> RunConfig {
        let train_sp = dir.join("sp_train.wav");
        let train_mu = dir.join("mu_train.wav");
        let test_sp = dir.join("sp1.wav");
        let test_mu = dir.join("mu1.wav");
        // Speech stand-in: wide band; music stand-in: two close partials
        write_wav(&train_sp, &[300.0, 3500.0], 8000, 8000);
        write_wav(&train_mu, &[440.0, 470.0], 8000, 8000);
        write_wav(&test_sp, &[350.0, 3400.0], 8000, 8000);
        write_wav(&test_mu, &[460.0, 490.0], 8000, 8000);

        RunConfig {
            training_files: vec![train_sp, train_mu],
            test_files: vec![test_sp, test_mu],
            output_dir: dir.join("out"),
        }
    }

    #[test]
    fn test_end_to_end_run() {
        let dir = tempfile::tempdir().unwrap();
        let run_config = fixtures(dir.path());
        let summary = run(&run_config, &ClassifierConfig::default()).unwrap();

        assert_eq!(summary.training_examples, 2);
        assert_eq!(summary.test_examples, 2);
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.evaluation.matrix.counts, [[1, 0], [0, 1]]);
        assert_eq!(summary.evaluation.precision, [100.0, 100.0]);
        assert_eq!(summary.evaluation.recall, [100.0, 100.0]);
        assert_eq!(summary.evaluation.accuracy, 100.0);

        let training = read_dataset(&summary.outputs.training_dataset).unwrap();
        assert_eq!(training.len(), 2);
        assert_eq!(training[0].label, ClassLabel::Speech);
        assert_eq!(training[1].label, ClassLabel::Music);

        let truth = read_ground_truth(&summary.outputs.ground_truth).unwrap();
        assert_eq!(truth[0], GroundTruthEntry::new("sp1.wav", ClassLabel::Speech));
        assert_eq!(truth[1], GroundTruthEntry::new("mu1.wav", ClassLabel::Music));

        let predictions = read_predictions(&summary.outputs.predictions).unwrap();
        assert_eq!(predictions, vec![ClassLabel::Speech, ClassLabel::Music]);

        let report = std::fs::read_to_string(&summary.outputs.report).unwrap();
        assert!(report.starts_with("Filename  Groundtruth  Model\nsp1.wav   Speech       Speech\n"));
        assert!(report.contains("Accuracy of the classification: 100"));

        assert!(SvmModel::load(&summary.outputs.model).is_ok());
    }

    #[test]
    fn test_parallel_extraction_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let run_config = fixtures(dir.path());
        let mut config = ClassifierConfig::default();
        let sequential = FeaturePipeline::new(&config)
            .extract_set("test", &run_config.test_files)
            .unwrap();

        config.pipeline.parallel = true;
        let parallel = FeaturePipeline::new(&config)
            .extract_set("test", &run_config.test_files)
            .unwrap();

        let names: Vec<_> = parallel.extracted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["sp1.wav", "mu1.wav"]);
        assert_eq!(parallel.dataset(), sequential.dataset());
    }

    #[test]
    fn test_abort_names_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut run_config = fixtures(dir.path());
        let short = dir.path().join("sp_short.wav");
        write_wav(&short, &[440.0], 8000, 300);
        run_config.test_files.insert(1, short);

        let err = run(&run_config, &ClassifierConfig::default()).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::File { path, stage, .. }) => {
                assert!(path.ends_with("sp_short.wav"));
                assert_eq!(*stage, Stage::Spectral);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_skip_drops_file_and_its_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let mut run_config = fixtures(dir.path());
        let short = dir.path().join("sp_short.wav");
        write_wav(&short, &[440.0], 8000, 300);
        let missing = dir.path().join("mu_missing.wav");
        run_config.test_files.insert(1, short);
        run_config.test_files.push(missing);

        let mut config = ClassifierConfig::default();
        config.pipeline.on_file_error = FailurePolicy::Skip;
        let summary = run(&run_config, &config).unwrap();

        assert_eq!(summary.test_files, 4);
        assert_eq!(summary.test_examples, 2);
        assert_eq!(summary.skipped.len(), 2);
        assert_eq!(summary.skipped[0].stage, Stage::Spectral);
        assert_eq!(summary.skipped[1].stage, Stage::Decode);

        let truth = read_ground_truth(&summary.outputs.ground_truth).unwrap();
        let names: Vec<_> = truth.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["sp1.wav", "mu1.wav"]);
        assert_eq!(read_predictions(&summary.outputs.predictions).unwrap().len(), 2);
    }

    #[test]
    fn test_no_usable_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClassifierConfig::default();
        config.pipeline.on_file_error = FailurePolicy::Skip;
        let pipeline = FeaturePipeline::new(&config);

        let err = pipeline
            .extract_set("training", &[dir.path().join("nothing.wav")])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NoUsableFiles {
                set: "training",
                attempted: 1
            }
        ));
    }

    #[test]
    fn test_custom_labeler() {
        let dir = tempfile::tempdir().unwrap();
        let run_config = fixtures(dir.path());
        let config = ClassifierConfig::default();
        let pipeline = FeaturePipeline::with_labeler(&config, |_: &str| ClassLabel::Music);

        let outcome = pipeline.extract_set("test", &run_config.test_files).unwrap();
        assert!(outcome
            .ground_truth()
            .iter()
            .all(|e| e.label == ClassLabel::Music));
    }

    #[test]
    fn test_classify_rejects_zero_vector() {
        let training: Dataset = vec![
            Example::new([1.0, 2.0, 0.1, 3.0], ClassLabel::Speech, "sp1.wav"),
            Example::new([0.0; 4], ClassLabel::Music, "mu1.wav"),
        ]
        .into_iter()
        .collect();
        let test: Dataset = vec![Example::new([1.0, 1.0, 1.0, 1.0], ClassLabel::Music, "mu2.wav")]
            .into_iter()
            .collect();

        let selector = FixedHyperparameters::from_config(&Default::default());
        let err = classify(training, test, &selector, &SmoEngine).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::ZeroVector {
                index: 1,
                origin: "mu1.wav".to_string()
            }
            .in_set("training")
        );
    }

    #[test]
    fn test_training_set_reclassified_perfectly() {
        let dir = tempfile::tempdir().unwrap();
        let mut run_config = fixtures(dir.path());
        run_config.training_files = run_config.test_files.clone();

        let summary = run(&run_config, &ClassifierConfig::default()).unwrap();
        assert_eq!(summary.evaluation.matrix.counts, [[1, 0], [0, 1]]);
        assert_eq!(summary.evaluation.accuracy, 100.0);
        assert_eq!(
            read_predictions(&summary.outputs.predictions).unwrap(),
            vec![ClassLabel::Speech, ClassLabel::Music]
        );
    }

    #[test]
    fn test_repeated_runs_agree() {
        let dir = tempfile::tempdir().unwrap();
        let mut run_config = fixtures(dir.path());
        let config = ClassifierConfig::default();

        let first = run(&run_config, &config).unwrap();
        run_config.output_dir = dir.path().join("out2");
        let second = run(&run_config, &config).unwrap();

        assert_eq!(first.evaluation, second.evaluation);
        assert_eq!(first.support_vectors, second.support_vectors);
        assert_eq!(first.iterations, second.iterations);
        assert_eq!(
            read_predictions(&first.outputs.predictions).unwrap(),
            read_predictions(&second.outputs.predictions).unwrap()
        );
        assert_eq!(
            SvmModel::load(&first.outputs.model).unwrap(),
            SvmModel::load(&second.outputs.model).unwrap()
        );
    }

    #[test]
    fn test_failed_run_leaves_no_stale_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut run_config = fixtures(dir.path());
        let config = ClassifierConfig::default();
        let first = run(&run_config, &config).unwrap();
        assert!(first.outputs.report.exists());

        run_config.test_files = vec![dir.path().join("mu_missing.wav")];
        assert!(run(&run_config, &config).is_err());

        assert!(first.outputs.training_dataset.exists());
        assert!(!first.outputs.test_dataset.exists());
        assert!(!first.outputs.ground_truth.exists());
        assert!(!first.outputs.model.exists());
        assert!(!first.outputs.predictions.exists());
        assert!(!first.outputs.report.exists());
    }

    #[test]
    fn test_zero_row_in_test_file_names_set_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let training_path = dir.path().join("training.txt");
        let test_path = dir.path().join("test.txt");
        std::fs::write(&training_path, "+1 1:900 2:3100 3:0.02 4:1400\n-1 1:80 2:60 3:0.1 4:450\n").unwrap();
        std::fs::write(&test_path, "+1 1:850 2:3000 3:0.03 4:1300\n\n-1 1:0 2:0 3:0 4:0\n").unwrap();

        let training = Dataset::from_file(&training_path).unwrap();
        let test = Dataset::from_file(&test_path).unwrap();
        let selector = FixedHyperparameters::from_config(&Default::default());
        let err = classify(training, test, &selector, &SmoEngine).unwrap_err();

        let msg = err.to_string();
        assert!(msg.starts_with("test set: example 1"), "{}", msg);
        assert!(msg.contains(&format!("{}:3", test_path.display())), "{}", msg);
    }
}
