//! Multinomial naive Bayes over TF-IDF rows.
//!
//! ```text
//! log P(c | x) ∝ log P(c) + Σ_j x_j · log θ_cj
//! θ_cj = (N_cj + α) / (N_c + α · n_features)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vectorizer::SparseVector;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    /// Class labels, sorted
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    /// `[class][feature]`
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fits on rows `x` with labels `y`; `n_features` is the row width.
    pub fn fit(x: &[SparseVector], y: &[String], n_features: usize, alpha: f64) -> Result<Self> {
        if !valid_alpha(alpha) {
            return Err(Error::InvalidAlpha(alpha));
        }
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                texts: x.len(),
                labels: y.len(),
            });
        }
        if x.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let mut classes: Vec<String> = y.to_vec();
        classes.sort();
        classes.dedup();

        let mut class_count = vec![0usize; classes.len()];
        let mut feature_count = vec![vec![0.0f64; n_features]; classes.len()];

        for (row, label) in x.iter().zip(y) {
            // `classes` is built from `y`, so the label is always present
            let Ok(c) = classes.binary_search(label) else {
                continue;
            };
            class_count[c] += 1;
            for &(col, value) in row {
                if col < n_features {
                    feature_count[c][col] += value;
                }
            }
        }

        let n_samples = x.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&count| (count as f64 / n_samples).ln())
            .collect();

        let feature_log_prob = feature_count
            .iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + alpha * n_features as f64;
                counts.iter().map(|&n| ((n + alpha) / total).ln()).collect()
            })
            .collect();

        Ok(Self {
            alpha,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Unnormalised `log P(c) + log P(x | c)` per class
    pub fn joint_log_likelihood(&self, row: &SparseVector) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                prior
                    + row
                        .iter()
                        .filter_map(|&(col, value)| log_probs.get(col).map(|lp| value * lp))
                        .sum::<f64>()
            })
            .collect()
    }

    /// Class probabilities in the order of [`MultinomialNb::classes`]; sums to 1.
    pub fn predict_proba(&self, row: &SparseVector) -> Vec<f64> {
        let jll = self.joint_log_likelihood(row);
        let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let log_sum = max + jll.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
        jll.iter().map(|v| (v - log_sum).exp()).collect()
    }

    /// Index of the most probable class; the first one wins a tie.
    pub fn predict(&self, row: &SparseVector) -> Option<usize> {
        argmax(&self.predict_proba(row))
    }

    /// Shapes agree: one prior and one probability row per class.
    pub(crate) fn is_consistent(&self, n_features: usize) -> bool {
        valid_alpha(self.alpha)
            && !self.classes.is_empty()
            && self.class_log_prior.len() == self.classes.len()
            && self.feature_log_prob.len() == self.classes.len()
            && self.feature_log_prob.iter().all(|r| r.len() == n_features)
    }
}

fn valid_alpha(alpha: f64) -> bool {
    alpha.is_finite() && alpha > 0.0
}

pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if best.map(|(_, b)| v > b).unwrap_or(true) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_separable_classes() {
        // column 0 = "invoice", column 1 = "laptop"
        let x = vec![vec![(0, 1.0)], vec![(0, 0.8), (1, 0.2)], vec![(1, 1.0)]];
        let y = labels(&["billing", "billing", "support"]);
        let nb = MultinomialNb::fit(&x, &y, 2, 1.0).unwrap();

        assert_eq!(nb.classes(), &["billing".to_string(), "support".to_string()]);
        assert_eq!(nb.predict(&vec![(0, 1.0)]), Some(0));
        assert_eq!(nb.predict(&vec![(1, 1.0)]), Some(1));
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let x = vec![vec![(0, 1.0)], vec![(1, 1.0)], vec![(2, 1.0)]];
        let y = labels(&["a", "b", "c"]);
        let nb = MultinomialNb::fit(&x, &y, 3, 1.0).unwrap();

        let probs = nb.predict_proba(&vec![(0, 0.6), (2, 0.8)]);
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_empty_row_follows_prior() {
        let x = vec![vec![(0, 1.0)], vec![(0, 1.0)], vec![(1, 1.0)]];
        let y = labels(&["spam", "spam", "ham"]);
        let nb = MultinomialNb::fit(&x, &y, 2, 1.0).unwrap();

        let probs = nb.predict_proba(&vec![]);
        // classes sorted: ham, spam
        assert!((probs[0] - 1.0 / 3.0).abs() < 1e-9);
        assert!((probs[1] - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_first_class() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_alpha_must_be_positive() {
        let x = vec![vec![(0, 1.0)], vec![(1, 1.0)]];
        let y = labels(&["billing", "support"]);
        for alpha in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = MultinomialNb::fit(&x, &y, 2, alpha).unwrap_err();
            assert!(matches!(err, Error::InvalidAlpha(_)), "{alpha}");
        }
        let nb = MultinomialNb::fit(&x, &y, 2, 1e-10).unwrap();
        assert_eq!(nb.alpha(), 1e-10);
        assert!(nb.predict_proba(&vec![(0, 1.0)]).iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_length_mismatch() {
        let err = MultinomialNb::fit(&[vec![]], &[], 1, 1.0).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { texts: 1, labels: 0 }));
    }
}
