use std::sync::Arc;

use anyhow::Context;
use mailshield_core::{EmailClassifier, NerModel, NerPipeline, PatternMatcher, PiiMasker};

use crate::config::Config;

/// Read-only context shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub masker: Arc<PiiMasker>,
    pub classifier: Arc<EmailClassifier>,
    pub api_secret: Arc<str>,
}

impl AppState {
    pub fn new(masker: PiiMasker, classifier: EmailClassifier, api_secret: &str) -> Self {
        Self {
            masker: Arc::new(masker),
            classifier: Arc::new(classifier),
            api_secret: Arc::from(api_secret),
        }
    }

    /// Builds the recognizer and loads the classifier. Any failure aborts
    /// startup, so requests never see a half-loaded state.
    pub fn load(config: &Config) -> anyhow::Result<Self> {
        let model = match &config.ner_weights {
            Some(path) => NerModel::with_weights_file(path)
                .with_context(|| format!("loading NER weights from {}", path.display()))?,
            None => NerModel::build(),
        };
        let pipeline = NerPipeline::with_model(model, config.ner_mode);
        let patterns = PatternMatcher::new().context("compiling PII patterns")?;
        tracing::info!(mode = %config.ner_mode, "Entity recognizer ready");

        let classifier = EmailClassifier::load(&config.model_path).with_context(|| {
            format!(
                "loading classifier from {} (run `mailshield train` first)",
                config.model_path.display()
            )
        })?;

        Ok(Self::new(
            PiiMasker::new(patterns, pipeline),
            classifier,
            &config.api_secret,
        ))
    }
}
