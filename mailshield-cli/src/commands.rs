use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use mailshield_core::classifier::{DEFAULT_ALPHA, DEFAULT_MAX_FEATURES};
use mailshield_core::{AlgorithmMode, NerModel, NerPipeline, PatternMatcher, PiiMasker, TrainingConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mask a labeled CSV dataset, fit the classifier and save it
    Train(TrainArgs),

    /// Send an email to a running server and print the result
    Classify(ClassifyArgs),

    /// Build the recognizer and load the saved classifier
    Check(CheckArgs),
}

/// Which entity recognizer to build.
#[derive(Args, Debug, Clone)]
pub struct RecognizerArgs {
    /// JSON file with CRF weights replacing the built-in ones
    #[arg(long, env = "NER_WEIGHTS_PATH")]
    pub ner_weights: Option<PathBuf>,

    /// hybrid, rules_only or crf_only
    #[arg(long, env = "NER_MODE", default_value = "hybrid")]
    pub ner_mode: AlgorithmMode,
}

impl RecognizerArgs {
    pub fn pipeline(&self) -> anyhow::Result<NerPipeline> {
        let model = match &self.ner_weights {
            Some(path) => NerModel::with_weights_file(path)
                .with_context(|| format!("loading NER weights from {}", path.display()))?,
            None => NerModel::build(),
        };
        Ok(NerPipeline::with_model(model, self.ner_mode))
    }

    pub fn masker(&self) -> anyhow::Result<PiiMasker> {
        let patterns = PatternMatcher::new().context("compiling PII patterns")?;
        Ok(PiiMasker::new(patterns, self.pipeline()?))
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with one email per row
    #[arg(long, default_value = "data/enterprise_emails.csv")]
    pub data: PathBuf,

    #[arg(long, default_value = "email")]
    pub text_column: String,

    #[arg(long, default_value = "type")]
    pub label_column: String,

    /// Where the trained artifact is written
    #[arg(long, env = "MODEL_PATH", default_value = "models/email_classifier.json")]
    pub model_path: PathBuf,

    /// Share of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Vocabulary cap (0 keeps every term)
    #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
    pub max_features: usize,

    /// Additive smoothing for naive Bayes
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Mask emails and phones only, skipping entity recognition
    #[arg(long)]
    pub regex_only: bool,

    #[command(flatten)]
    pub recognizer: RecognizerArgs,
}

impl From<&TrainArgs> for TrainingConfig {
    fn from(a: &TrainArgs) -> Self {
        TrainingConfig {
            data_path: a.data.clone(),
            text_column: a.text_column.clone(),
            label_column: a.label_column.clone(),
            model_path: a.model_path.clone(),
            test_fraction: a.test_size,
            seed: a.seed,
            max_features: (a.max_features > 0).then_some(a.max_features),
            alpha: a.alpha,
            regex_only: a.regex_only,
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Base URL of the server, e.g. http://localhost:8000
    #[arg(long, env = "API_URL")]
    pub api_url: String,

    /// Bearer token expected by the server
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Email text; read from stdin when omitted
    pub text: Option<String>,

    /// Also print the raw JSON response
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(long, env = "MODEL_PATH", default_value = "models/email_classifier.json")]
    pub model_path: PathBuf,

    #[command(flatten)]
    pub recognizer: RecognizerArgs,
}
