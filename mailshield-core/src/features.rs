//! # Feature extraction for the recognizer
//!
//! For each token we build a sparse vector of binary features that the CRF
//! weighs when scoring tags.
//!
//! ## Current token
//! - Lowercased word form, `bias`
//! - Capitalisation: capitalized, all caps, mixed case
//! - Prefixes and suffixes of 2, 3 and 4 chars
//! - Digits, hyphens, periods, punctuation
//! - Stop word membership (`is_stop_word`), lowercase content words
//!   (`is_lower`), salutation and subject-line nouns (`is_generic_word`)
//! - Sentence-initial capitalisation (`sentence_start_cap`), the main source of
//!   false positives in email openers ("Please", "Thanks", "Hi")
//! - Mask placeholders such as the `PHONE` in `[PHONE]`
//!
//! ## Context (window of 2)
//! - Previous and next words, their capitalisation, a bigram of neighbours
//!
//! ## Gazetteers
//! - First names, surnames, organizations, locations, misc names

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::stop_words::{is_generic_word, is_stop_word};
use crate::tokenizer::Token;

/// Placeholder names written by the masker; never entities themselves.
pub const PLACEHOLDER_NAMES: &[&str] = &["EMAIL", "PHONE", "PERSON", "ORG"];

/// Sparse feature vector for one token.
///
/// Most features are binary (1.0) but `f64` keeps the dot product general.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Active features, e.g. `{"is_capitalized": 1.0, "word=smith": 1.0}`.
    pub features: HashMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }
}

/// Known-name lists (lowercase) consulted by features and rules
#[derive(Debug, Clone, Default)]
pub struct Gazetteers {
    pub first_names: HashSet<String>,
    pub surnames: HashSet<String>,
    pub organizations: HashSet<String>,
    pub locations: HashSet<String>,
    pub misc: HashSet<String>,
}

impl Gazetteers {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builds feature vectors for every token; output index `i` matches token `i`.
pub fn extract_features(tokens: &[Token], gazetteers: &Gazetteers) -> Vec<FeatureVector> {
    (0..tokens.len())
        .map(|i| extract_for_token(tokens, i, gazetteers))
        .collect()
}

/// Whether token `i` is the inner word of a `[NAME]` placeholder.
pub fn is_placeholder(tokens: &[Token], i: usize) -> bool {
    i > 0
        && i + 1 < tokens.len()
        && tokens[i - 1].text == "["
        && tokens[i + 1].text == "]"
        && PLACEHOLDER_NAMES.contains(&tokens[i].text.as_str())
}

/// Whether token `i` opens a sentence: first token, or right after `.`, `!`,
/// `?` or `:`.
pub fn is_sentence_start(tokens: &[Token], i: usize) -> bool {
    i == 0 || matches!(tokens[i - 1].text.as_str(), "." | "!" | "?" | ":")
}

fn starts_upper(word: &str) -> bool {
    word.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// Features for a single token in context.
pub fn extract_for_token(tokens: &[Token], i: usize, gazetteers: &Gazetteers) -> FeatureVector {
    let mut fv = FeatureVector::new();
    let token = &tokens[i];
    let word = &token.text;
    let lower = word.to_lowercase();
    let bare = lower.trim_end_matches('.');

    fv.insert(format!("word={lower}"), 1.0);
    fv.insert("bias", 1.0);

    if is_placeholder(tokens, i) {
        fv.insert("is_placeholder", 1.0);
        return fv;
    }

    // Capitalisation
    let first_upper = starts_upper(word);
    let all_upper = word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic())
        && word.chars().any(char::is_alphabetic);
    let upper_in_middle = word.chars().skip(1).any(char::is_uppercase);

    if first_upper {
        fv.insert("is_capitalized", 1.0);
        if is_sentence_start(tokens, i) {
            fv.insert("sentence_start_cap", 1.0);
        }
    }
    if all_upper && word.chars().count() > 1 {
        fv.insert("is_all_caps", 1.0);
    }
    if upper_in_middle && !all_upper {
        fv.insert("is_mixed_case", 1.0);
    }

    // Prefixes and suffixes
    let chars: Vec<char> = lower.chars().collect();
    for n in 2..=4 {
        if chars.len() >= n {
            let prefix: String = chars[..n].iter().collect();
            let suffix: String = chars[chars.len() - n..].iter().collect();
            fv.insert(format!("prefix{n}={prefix}"), 1.0);
            fv.insert(format!("suffix{n}={suffix}"), 1.0);
        }
    }

    if word.chars().any(char::is_numeric) {
        fv.insert("has_digit", 1.0);
    }
    if word.chars().all(char::is_numeric) {
        fv.insert("is_digit", 1.0);
    }
    if word.contains('-') {
        fv.insert("has_hyphen", 1.0);
    }
    if word.contains('.') {
        fv.insert("has_period", 1.0);
    }
    if word.chars().count() == 1 && !word.chars().all(char::is_alphanumeric) {
        fv.insert("is_punctuation", 1.0);
    }
    let stop_word = is_stop_word(&lower);
    if stop_word {
        fv.insert("is_stop_word", 1.0);
    }
    if !stop_word && word.chars().next().is_some_and(|c| c.is_alphabetic() && c.is_lowercase()) {
        fv.insert("is_lower", 1.0);
    }
    if is_generic_word(bare) {
        fv.insert("is_generic_word", 1.0);
    }

    if i == 0 {
        fv.insert("is_first", 1.0);
    }
    if i == tokens.len() - 1 {
        fv.insert("is_last", 1.0);
    }

    // Context
    if i > 0 {
        let prev = &tokens[i - 1];
        let prev_lower = prev.text.to_lowercase();
        fv.insert(format!("prev_word={}", prev_lower.trim_end_matches('.')), 1.0);
        if starts_upper(&prev.text) {
            fv.insert("prev_is_capitalized", 1.0);
        }
    } else {
        fv.insert("BOS", 1.0);
    }

    if i > 1 {
        fv.insert(format!("prev2_word={}", tokens[i - 2].text.to_lowercase()), 1.0);
    }

    if i + 1 < tokens.len() {
        let next = &tokens[i + 1];
        fv.insert(format!("next_word={}", next.text.to_lowercase().trim_end_matches('.')), 1.0);
        if starts_upper(&next.text) {
            fv.insert("next_is_capitalized", 1.0);
        }
    } else {
        fv.insert("EOS", 1.0);
    }

    if i + 2 < tokens.len() {
        fv.insert(format!("next2_word={}", tokens[i + 2].text.to_lowercase()), 1.0);
    }

    if i > 0 && i + 1 < tokens.len() {
        fv.insert(
            format!(
                "bigram={}_{}",
                tokens[i - 1].text.to_lowercase(),
                tokens[i + 1].text.to_lowercase()
            ),
            1.0,
        );
    }

    // Gazetteers
    if gazetteers.first_names.contains(bare) {
        fv.insert("in_first_name_gazetteer", 1.0);
    }
    if gazetteers.surnames.contains(bare) {
        fv.insert("in_surname_gazetteer", 1.0);
    }
    if gazetteers.organizations.contains(bare) {
        fv.insert("in_org_gazetteer", 1.0);
    }
    if gazetteers.locations.contains(bare) {
        fv.insert("in_location_gazetteer", 1.0);
    }
    if gazetteers.misc.contains(bare) {
        fv.insert("in_misc_gazetteer", 1.0);
    }

    fv
}
