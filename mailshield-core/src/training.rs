//! # Training job
//!
//! CSV → masking → split → TF-IDF + naive Bayes → evaluation → artifact.
//!
//! Texts are masked before fitting so the classifier learns from the same
//! redacted form it sees at serving time.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::classifier::{EmailClassifier, DEFAULT_ALPHA, DEFAULT_MAX_FEATURES};
use crate::dataset::{load_csv, train_test_split, LabeledEmail};
use crate::error::Result;
use crate::masking::PiiMasker;
use crate::metrics::ClassificationReport;

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub text_column: String,
    pub label_column: String,
    pub model_path: PathBuf,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    pub seed: u64,
    pub max_features: Option<usize>,
    pub alpha: f64,
    /// Skip the recognizer and mask with the regex stage only
    pub regex_only: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/enterprise_emails.csv"),
            text_column: "email".to_string(),
            label_column: "type".to_string(),
            model_path: PathBuf::from("models/email_classifier.json"),
            test_fraction: 0.2,
            seed: 42,
            max_features: Some(DEFAULT_MAX_FEATURES),
            alpha: DEFAULT_ALPHA,
            regex_only: false,
        }
    }
}

/// What a training run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub classifier: EmailClassifier,
    pub report: ClassificationReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Masks every text in parallel.
pub fn mask_dataset(rows: Vec<LabeledEmail>, masker: &PiiMasker, regex_only: bool) -> Vec<LabeledEmail> {
    rows.into_par_iter()
        .map(|row| LabeledEmail {
            text: if regex_only {
                masker.mask_patterns(&row.text)
            } else {
                masker.mask_all(&row.text)
            },
            label: row.label,
        })
        .collect()
}

/// Fits on the training split and evaluates on the held-out split.
pub fn fit_and_evaluate(
    rows: Vec<LabeledEmail>,
    config: &TrainingConfig,
) -> Result<TrainingOutcome> {
    let (train, test) = train_test_split(rows, config.test_fraction, config.seed);
    let (train_texts, train_labels): (Vec<String>, Vec<String>) =
        train.into_iter().map(|r| (r.text, r.label)).unzip();

    let classifier =
        EmailClassifier::fit(&train_texts, &train_labels, config.max_features, config.alpha)?;

    let gold: Vec<String> = test.iter().map(|r| r.label.clone()).collect();
    let predicted: Vec<String> = test
        .iter()
        .map(|r| classifier.predict(&r.text).category)
        .collect();
    let report = ClassificationReport::new(&gold, &predicted);

    Ok(TrainingOutcome {
        classifier,
        report,
        train_rows: train_texts.len(),
        test_rows: test.len(),
    })
}

/// Full run: load, mask, fit, evaluate and save the artifact.
pub fn train(config: &TrainingConfig, masker: &PiiMasker) -> Result<TrainingOutcome> {
    let rows = load_csv(&config.data_path, &config.text_column, &config.label_column)?;

    let started = Instant::now();
    tracing::info!(
        rows = rows.len(),
        regex_only = config.regex_only,
        "Masking PII in training data"
    );
    let rows = mask_dataset(rows, masker, config.regex_only);
    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "Masking done");

    let outcome = fit_and_evaluate(rows, config)?;
    tracing::info!(
        train = outcome.train_rows,
        test = outcome.test_rows,
        accuracy = outcome.report.accuracy,
        "Classifier trained"
    );

    outcome.classifier.save(&config.model_path)?;
    tracing::info!(path = %config.model_path.display(), "Model saved");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternMatcher;
    use crate::pipeline::NerPipeline;

    fn rows() -> Vec<LabeledEmail> {
        let support = [
            "my laptop will not boot",
            "vpn keeps disconnecting",
            "password reset does not work",
            "outlook crashes on startup",
            "printer is offline again",
        ];
        let billing = [
            "invoice amount is wrong",
            "refund the duplicate charge",
            "payment declined on card",
            "update billing address on invoice",
            "charged twice this month",
        ];
        support
            .iter()
            .map(|t| (t, "support"))
            .chain(billing.iter().map(|t| (t, "billing")))
            .map(|(t, l)| LabeledEmail {
                text: t.to_string(),
                label: l.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_mask_dataset_regex_only() {
        let masker = PiiMasker::new(PatternMatcher::new().unwrap(), NerPipeline::new());
        let input = vec![LabeledEmail {
            text: "John wrote from john@acme.com".into(),
            label: "support".into(),
        }];
        let masked = mask_dataset(input.clone(), &masker, true);
        assert_eq!(masked[0].text, "John wrote from [EMAIL]");

        let masked = mask_dataset(input, &masker, false);
        assert_eq!(masked[0].text, "[PERSON] wrote from [EMAIL]");
        assert_eq!(masked[0].label, "support");
    }

    #[test]
    fn test_fit_and_evaluate_split() {
        let outcome = fit_and_evaluate(rows(), &TrainingConfig::default()).unwrap();
        assert_eq!(outcome.train_rows, 8);
        assert_eq!(outcome.test_rows, 2);
        assert_eq!(outcome.report.total, 2);
        assert!((0.0..=1.0).contains(&outcome.report.accuracy));
    }

    #[test]
    fn test_train_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("emails.csv");
        let mut csv = String::from("email,type\n");
        for row in rows() {
            csv.push_str(&format!("{},{}\n", row.text, row.label));
        }
        std::fs::write(&data_path, csv).unwrap();

        let config = TrainingConfig {
            data_path,
            model_path: dir.path().join("out").join("model.json"),
            regex_only: true,
            ..TrainingConfig::default()
        };
        let masker = PiiMasker::with_default_model().unwrap();
        let outcome = train(&config, &masker).unwrap();

        let loaded = EmailClassifier::load(&config.model_path).unwrap();
        assert_eq!(loaded.classes(), outcome.classifier.classes());
    }
}
