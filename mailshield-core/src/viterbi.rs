//! # Viterbi decoding
//!
//! Dynamic programming over the CRF lattice: the best path ending in tag `t`
//! at token `i` only depends on the best paths ending at token `i-1`, which
//! brings the search from `O(T^N)` down to `O(N × T²)`.
//!
//! ```text
//! init:      v[0][t] = emission(t, x_0)
//! recursion: v[i][t] = max_{t'} [v[i-1][t'] + transition(t', t)] + emission(t, x_i)
//! backtrack from argmax_t v[N-1][t]
//! ```

use crate::crf::{compute_emission_scores, CrfModel};
use crate::features::FeatureVector;
use crate::tagger::Tag;

/// Penalty added when the best predecessor breaks BIO (`O → I-X`).
const INVALID_TRANSITION_PENALTY: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct ViterbiResult {
    /// Best tag per token
    pub best_sequence: Vec<Tag>,
    /// Unnormalised score of the best path
    pub best_score: f64,
    /// Accumulated score per tag at each token, `[token][tag_index]`
    pub lattice: Vec<Vec<f64>>,
}

impl ViterbiResult {
    /// Softmax confidence of the chosen tag at each position.
    pub fn confidences(&self) -> Vec<f64> {
        self.lattice
            .iter()
            .zip(&self.best_sequence)
            .map(|(scores, tag)| {
                scores_to_probs(scores)
                    .get(tag.index())
                    .copied()
                    .unwrap_or(0.5)
            })
            .collect()
    }
}

pub fn viterbi_decode(model: &CrfModel, feature_vectors: &[FeatureVector]) -> ViterbiResult {
    if feature_vectors.is_empty() {
        return ViterbiResult {
            best_sequence: vec![],
            best_score: 0.0,
            lattice: vec![],
        };
    }

    let n_tokens = feature_vectors.len();
    let tags = Tag::all();
    let n_tags = tags.len();

    let emission = compute_emission_scores(model, feature_vectors);

    let mut viterbi: Vec<f64> = emission[0].clone();
    let mut backptr: Vec<Vec<usize>> = vec![vec![0usize; n_tags]; n_tokens];
    let mut lattice: Vec<Vec<f64>> = Vec::with_capacity(n_tokens);

    // An Inside tag cannot open the sequence
    for (t, tag) in tags.iter().enumerate() {
        if matches!(tag, Tag::Inside(_)) {
            viterbi[t] -= INVALID_TRANSITION_PENALTY;
        }
        backptr[0][t] = t;
    }
    lattice.push(viterbi.clone());

    for i in 1..n_tokens {
        let mut next = vec![f64::NEG_INFINITY; n_tags];

        for t in 0..n_tags {
            let mut best_prev_score = f64::NEG_INFINITY;
            let mut best_prev_tag = 0;

            for prev_t in 0..n_tags {
                let score = viterbi[prev_t] + model.transition_score(&tags[prev_t], &tags[t]);
                if score > best_prev_score {
                    best_prev_score = score;
                    best_prev_tag = prev_t;
                }
            }

            next[t] = best_prev_score + emission[i][t];
            if !Tag::is_valid_transition(&tags[best_prev_tag], &tags[t]) {
                next[t] -= INVALID_TRANSITION_PENALTY;
            }
            backptr[i][t] = best_prev_tag;
        }

        viterbi = next;
        lattice.push(viterbi.clone());
    }

    let (mut best_last, best_score) = best_in_slice(&viterbi);
    let mut best_sequence: Vec<Tag> = vec![Tag::Outside; n_tokens];
    best_sequence[n_tokens - 1] = tags[best_last].clone();

    for i in (0..n_tokens - 1).rev() {
        best_last = backptr[i + 1][best_last];
        best_sequence[i] = tags[best_last].clone();
    }

    ViterbiResult {
        best_sequence,
        best_score,
        lattice,
    }
}

/// (index, value) of the maximum
fn best_in_slice(scores: &[f64]) -> (usize, f64) {
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, &v)| (i, v))
        .unwrap_or((0, f64::NEG_INFINITY))
}

/// Softmax over raw scores
pub fn scores_to_probs(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return vec![];
    }
    let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max_score).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / scores.len() as f64; scores.len()];
    }
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    fn fv(capitalized: bool) -> FeatureVector {
        let mut fv = FeatureVector::new();
        fv.insert("bias", 1.0);
        if capitalized {
            fv.insert("is_capitalized", 1.0);
        }
        fv
    }

    fn person_model() -> CrfModel {
        let mut model = CrfModel::new();
        model.set_emission("is_capitalized", &Tag::Begin(EntityCategory::Person), 5.0);
        model.set_emission("is_capitalized", &Tag::Inside(EntityCategory::Person), 4.0);
        model.set_emission("is_capitalized", &Tag::Outside, -3.0);
        model.set_emission("bias", &Tag::Outside, 1.0);
        model.set_transition(
            &Tag::Begin(EntityCategory::Person),
            &Tag::Inside(EntityCategory::Person),
            3.0,
        );
        model
    }

    #[test]
    fn test_capitalized_pair_becomes_one_person() {
        let result = viterbi_decode(&person_model(), &[fv(false), fv(true), fv(true)]);
        assert_eq!(
            result.best_sequence,
            vec![
                Tag::Outside,
                Tag::Begin(EntityCategory::Person),
                Tag::Inside(EntityCategory::Person),
            ]
        );
    }

    #[test]
    fn test_sequence_never_opens_with_inside() {
        let result = viterbi_decode(&person_model(), &[fv(true)]);
        assert_eq!(result.best_sequence, vec![Tag::Begin(EntityCategory::Person)]);
    }

    #[test]
    fn test_viterbi_empty() {
        let result = viterbi_decode(&CrfModel::new(), &[]);
        assert!(result.best_sequence.is_empty());
        assert!(result.confidences().is_empty());
    }

    #[test]
    fn test_confidences_in_unit_interval() {
        let result = viterbi_decode(&person_model(), &[fv(true), fv(false)]);
        for c in result.confidences() {
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = scores_to_probs(&[1.0, 2.0, 3.0, 0.5, -1.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
