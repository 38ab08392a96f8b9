//! # Linear-chain CRF
//!
//! Scores a tag sequence `y` for tokens `x` as
//!
//! ```text
//! score(y, x) = Σ_i [emission(y_i, x, i) + transition(y_{i-1}, y_i)]
//! ```
//!
//! Emission weights are keyed by `"feature|TAG"`, transitions live in a dense
//! `Tag::COUNT × Tag::COUNT` matrix. The model is serde-serializable so a
//! weights file can replace the built-in weights at startup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::tagger::Tag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrfModel {
    /// `"feature|TAG"` → weight
    pub emission_weights: HashMap<String, f64>,
    /// `[prev_tag_idx][next_tag_idx]` → weight
    pub transition_weights: Vec<Vec<f64>>,
}

impl CrfModel {
    /// Model with every weight at zero
    pub fn new() -> Self {
        let n = Tag::COUNT;
        Self {
            emission_weights: HashMap::new(),
            transition_weights: vec![vec![0.0f64; n]; n],
        }
    }

    /// `Σ_k w_{k,tag} * f_k(x, i)`
    pub fn emission_score(&self, features: &FeatureVector, tag: &Tag) -> f64 {
        let tag_label = tag.label();
        features
            .features
            .iter()
            .map(|(feat_name, feat_val)| {
                let key = format!("{feat_name}|{tag_label}");
                feat_val * self.emission_weights.get(&key).unwrap_or(&0.0)
            })
            .sum()
    }

    pub fn transition_score(&self, prev: &Tag, next: &Tag) -> f64 {
        self.transition_weights[prev.index()][next.index()]
    }

    pub fn set_emission(&mut self, feature: &str, tag: &Tag, weight: f64) {
        let key = format!("{feature}|{}", tag.label());
        self.emission_weights.insert(key, weight);
    }

    pub fn set_transition(&mut self, from: &Tag, to: &Tag, weight: f64) {
        self.transition_weights[from.index()][to.index()] = weight;
    }

    /// Whether the transition matrix has the `Tag::COUNT × Tag::COUNT` shape.
    ///
    /// Weights loaded from disk are checked with this before use.
    pub fn is_well_formed(&self) -> bool {
        self.transition_weights.len() == Tag::COUNT
            && self.transition_weights.iter().all(|row| row.len() == Tag::COUNT)
    }
}

impl Default for CrfModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Emission scores `[token][tag_index]` for a whole sentence
pub fn compute_emission_scores(
    model: &CrfModel,
    feature_vectors: &[FeatureVector],
) -> Vec<Vec<f64>> {
    let tags = Tag::all();
    feature_vectors
        .iter()
        .map(|fv| tags.iter().map(|tag| model.emission_score(fv, tag)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    #[test]
    fn test_emission_score_positive() {
        let mut model = CrfModel::new();
        let tag = Tag::Begin(EntityCategory::Person);
        model.set_emission("is_capitalized", &tag, 2.5);

        let mut fv = FeatureVector::new();
        fv.insert("is_capitalized", 1.0);

        assert!((model.emission_score(&fv, &tag) - 2.5).abs() < 1e-9);
        assert!(model.emission_score(&fv, &Tag::Outside).abs() < 1e-9);
    }

    #[test]
    fn test_transition_score() {
        let mut model = CrfModel::new();
        let b_per = Tag::Begin(EntityCategory::Person);
        let i_per = Tag::Inside(EntityCategory::Person);
        model.set_transition(&b_per, &i_per, 3.0);

        assert!((model.transition_score(&b_per, &i_per) - 3.0).abs() < 1e-9);
        assert!(model.transition_score(&Tag::Outside, &i_per).abs() < 1e-9);
    }

    #[test]
    fn test_well_formed_after_json_round_trip() {
        let mut model = CrfModel::new();
        model.set_emission("bias", &Tag::Outside, 1.0);
        let json = serde_json::to_string(&model).unwrap();
        let back: CrfModel = serde_json::from_str(&json).unwrap();
        assert!(back.is_well_formed());

        let broken = CrfModel {
            emission_weights: HashMap::new(),
            transition_weights: vec![vec![0.0; 2]; 2],
        };
        assert!(!broken.is_well_formed());
    }
}
