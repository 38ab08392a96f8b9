//! # TF-IDF vectorizer
//!
//! Bag-of-words features for the classifier.
//!
//! - Analyzer: lowercase, tokens are runs of two or more word characters,
//!   English stop words removed.
//! - Vocabulary: optionally capped to the `max_features` terms with the
//!   highest frequency over the corpus; columns are ordered alphabetically.
//! - Weights: `tf × idf` with the smoothed `idf = ln((1 + n) / (1 + df)) + 1`,
//!   then each row is scaled to unit L2 norm.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stop_words::is_stop_word;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

/// Sparse row: `(column, value)` sorted by column
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: Option<usize>,
    /// term → column
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

/// Lowercased terms of `text` in order of appearance, stop words removed.
pub fn analyze(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

impl TfidfVectorizer {
    /// Learns vocabulary and IDF weights from `documents`.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: Option<usize>) -> Result<Self> {
        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = analyze(doc.as_ref());
            let mut seen: Vec<&String> = Vec::with_capacity(terms.len());
            for term in &terms {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
                if !seen.contains(&term) {
                    seen.push(term);
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        if term_freq.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let mut terms: Vec<(String, usize)> = term_freq.into_iter().collect();
        if let Some(limit) = max_features {
            // Most frequent first; ties broken alphabetically
            terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            terms.truncate(limit);
        }

        let vocabulary: BTreeMap<String, usize> = {
            let mut names: Vec<String> = terms.into_iter().map(|(t, _)| t).collect();
            names.sort();
            names.into_iter().enumerate().map(|(i, t)| (t, i)).collect()
        };

        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &col) in &vocabulary {
            let df = doc_freq.get(term).copied().unwrap_or(0);
            idf[col] = ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0;
        }

        tracing::debug!(
            documents = n_docs,
            terms = vocabulary.len(),
            "Fitted TF-IDF vocabulary"
        );

        Ok(Self {
            max_features,
            vocabulary,
            idf,
        })
    }

    /// L2-normalised TF-IDF row for one document. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .collect();
        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut row {
                *v /= norm;
            }
        }
        row
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Vocabulary and IDF vector agree, and every column is in range.
    pub(crate) fn is_consistent(&self) -> bool {
        self.vocabulary.len() == self.idf.len()
            && self.vocabulary.values().all(|&c| c < self.idf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer() {
        assert_eq!(
            analyze("Please RESET my VPN password, a.b x 42!"),
            vec!["reset", "vpn", "password", "42"]
        );
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let vec = TfidfVectorizer::fit(&["zebra apple", "mango apple"], None).unwrap();
        assert_eq!(vec.column("apple"), Some(0));
        assert_eq!(vec.column("mango"), Some(1));
        assert_eq!(vec.column("zebra"), Some(2));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs = ["invoice invoice refund", "invoice laptop", "refund"];
        let vec = TfidfVectorizer::fit(&docs, Some(2)).unwrap();
        assert_eq!(vec.n_features(), 2);
        assert!(vec.column("invoice").is_some());
        assert!(vec.column("refund").is_some());
        assert!(vec.column("laptop").is_none());
    }

    #[test]
    fn test_smoothed_idf() {
        let vec = TfidfVectorizer::fit(&["invoice refund", "invoice"], None).unwrap();
        // df(invoice) = 2 → idf 1.0; df(refund) = 1 → ln(3/2) + 1
        let invoice = vec.idf[vec.column("invoice").unwrap()];
        let refund = vec.idf[vec.column("refund").unwrap()];
        assert!((invoice - 1.0).abs() < 1e-12);
        assert!((refund - (1.5f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_have_unit_norm() {
        let vec = TfidfVectorizer::fit(&["invoice refund refund", "laptop"], None).unwrap();
        let row = vec.transform("refund invoice refund unknownword");
        let norm: f64 = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(vec.transform("nothing known").is_empty());
    }

    #[test]
    fn test_only_stop_words_is_an_error() {
        let err = TfidfVectorizer::fit(&["the and of", "a"], None).unwrap_err();
        assert!(matches!(err, Error::EmptyVocabulary));
    }
}
