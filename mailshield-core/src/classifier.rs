//! # Email classifier
//!
//! TF-IDF features followed by multinomial naive Bayes. The fitted pipeline
//! is persisted as one JSON document and loaded once at startup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::naive_bayes::{argmax, MultinomialNb};
use crate::vectorizer::TfidfVectorizer;

/// Vocabulary cap used when training
pub const DEFAULT_MAX_FEATURES: usize = 5000;
/// Laplace smoothing
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Most probable category and its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: String,
    /// In `[0, 1]`, rounded to 4 decimals
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailClassifier {
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
}

impl EmailClassifier {
    pub fn fit<S: AsRef<str>>(
        texts: &[S],
        labels: &[String],
        max_features: Option<usize>,
        alpha: f64,
    ) -> Result<Self> {
        if texts.len() != labels.len() {
            return Err(Error::LengthMismatch {
                texts: texts.len(),
                labels: labels.len(),
            });
        }
        let vectorizer = TfidfVectorizer::fit(texts, max_features)?;
        let rows: Vec<_> = texts.iter().map(|t| vectorizer.transform(t.as_ref())).collect();
        let model = MultinomialNb::fit(&rows, labels, vectorizer.n_features(), alpha)?;
        Ok(Self { vectorizer, model })
    }

    pub fn classes(&self) -> &[String] {
        self.model.classes()
    }

    /// `(category, probability)` for every class, in label order
    pub fn predict_proba(&self, text: &str) -> Vec<(String, f64)> {
        let row = self.vectorizer.transform(text);
        self.model
            .classes()
            .iter()
            .cloned()
            .zip(self.model.predict_proba(&row))
            .collect()
    }

    pub fn predict(&self, text: &str) -> Prediction {
        let proba = self.predict_proba(text);
        let probs: Vec<f64> = proba.iter().map(|(_, p)| *p).collect();
        // A loaded model always has at least one class
        let best = argmax(&probs).unwrap_or(0);
        let (category, confidence) = proba
            .get(best)
            .cloned()
            .unwrap_or_else(|| (String::new(), 0.0));
        Prediction {
            category,
            confidence: round4(confidence),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::WriteFile {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|source| Error::WriteFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let classifier: Self = serde_json::from_str(&raw)?;
        if !classifier.vectorizer.is_consistent()
            || !classifier.model.is_consistent(classifier.vectorizer.n_features())
        {
            return Err(Error::NotFitted);
        }
        tracing::info!(
            path = %path.display(),
            classes = classifier.classes().len(),
            features = classifier.vectorizer.n_features(),
            max_features = ?classifier.vectorizer.max_features(),
            alpha = classifier.model.alpha(),
            "Loaded classifier"
        );
        Ok(classifier)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<&'static str>, Vec<String>) {
        let data = [
            ("my laptop will not boot after the update", "support"),
            ("cannot connect to the vpn from home", "support"),
            ("password reset link is broken", "support"),
            ("the invoice total is wrong", "billing"),
            ("please refund the duplicate charge", "billing"),
            ("payment failed on my credit card", "billing"),
        ];
        (
            data.iter().map(|(t, _)| *t).collect(),
            data.iter().map(|(_, l)| l.to_string()).collect(),
        )
    }

    #[test]
    fn test_predict() {
        let (texts, labels) = sample();
        let clf = EmailClassifier::fit(&texts, &labels, Some(DEFAULT_MAX_FEATURES), DEFAULT_ALPHA)
            .unwrap();

        let pred = clf.predict("refund my invoice please");
        assert_eq!(pred.category, "billing");
        assert!(pred.confidence > 0.5 && pred.confidence <= 1.0);

        let pred = clf.predict("vpn will not connect");
        assert_eq!(pred.category, "support");
    }

    #[test]
    fn test_confidence_rounded() {
        let (texts, labels) = sample();
        let clf = EmailClassifier::fit(&texts, &labels, None, DEFAULT_ALPHA).unwrap();
        let pred = clf.predict("laptop invoice");
        assert_eq!(pred.confidence, round4(pred.confidence));
        let total: f64 = clf.predict_proba("laptop invoice").iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_words_fall_back_to_prior() {
        let (texts, labels) = sample();
        let clf = EmailClassifier::fit(&texts, &labels, None, DEFAULT_ALPHA).unwrap();
        let pred = clf.predict("zzz qqq");
        // Equal priors: first label in sorted order
        assert_eq!(pred.category, "billing");
        assert_eq!(pred.confidence, 0.5);
    }

    #[test]
    fn test_save_load_same_predictions() {
        let (texts, labels) = sample();
        let clf = EmailClassifier::fit(&texts, &labels, None, DEFAULT_ALPHA).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("email_classifier.json");
        clf.save(&path).unwrap();
        let loaded = EmailClassifier::load(&path).unwrap();

        for text in ["refund the charge", "laptop update", "hello"] {
            assert_eq!(clf.predict(text), loaded.predict(text));
        }
    }

    #[test]
    fn test_zero_alpha_rejected_before_saving() {
        let (texts, labels) = sample();
        let err = EmailClassifier::fit(&texts, &labels, None, 0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidAlpha(a) if a == 0.0));
    }

    #[test]
    fn test_load_rejects_non_positive_alpha() {
        let (texts, labels) = sample();
        let clf = EmailClassifier::fit(&texts, &labels, None, DEFAULT_ALPHA).unwrap();
        let mut json: serde_json::Value = serde_json::to_value(&clf).unwrap();
        json["model"]["alpha"] = serde_json::json!(0.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, json.to_string()).unwrap();
        assert!(matches!(EmailClassifier::load(&path), Err(Error::NotFitted)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EmailClassifier::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, Error::ReadFile { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EmailClassifier::load(&path), Err(Error::Artifact(_))));
    }
}
