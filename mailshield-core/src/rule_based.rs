//! # Rule engine: gazetteers and surface patterns
//!
//! Rules complement the CRF with explicit knowledge. Where a rule fires in
//! hybrid mode its tag wins over the statistical decision.
//!
//! Rules, in priority order (a token claimed by an earlier rule is skipped):
//!
//! 1. `mask_placeholder`: the word inside `[EMAIL]`, `[PHONE]`, `[PERSON]`,
//!    `[ORG]` is forced to Outside so masked text is never re-masked.
//! 2. `org_gazetteer`: known organization names, possibly multi-word.
//! 3. `title_pattern`: `Mr.`/`Dr.`/... followed by capitalized words.
//! 4. `first_name_gazetteer`: a known first name plus following capitalized
//!    words (`name_continuation`).
//! 5. `surname_gazetteer`: a known surname, continuing a person or on its
//!    own away from the start of a sentence.
//! 6. `org_suffix_pattern`: capitalized words followed by `Inc`, `LLC`, ...
//! 7. `location_gazetteer`: known places.

use serde::{Deserialize, Serialize};

use crate::features::{is_placeholder, is_sentence_start};
use crate::stop_words::{is_generic_word, is_stop_word};
use crate::tagger::{EntityCategory, Tag};
use crate::tokenizer::Token;

/// Tag assigned to one token by a rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMatch {
    pub tag: Tag,
    pub rule_name: String,
    pub confidence: f64,
}

/// Longest run of capitalized words considered part of one name.
const MAX_NAME_RUN: usize = 3;

pub struct RuleEngine {
    first_names: Vec<String>,
    surnames: Vec<String>,
    /// Lowercased word sequences
    org_names: Vec<Vec<String>>,
    location_names: Vec<String>,
    person_titles: Vec<String>,
    org_suffixes: Vec<String>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            first_names: vec![],
            surnames: vec![],
            org_names: vec![],
            location_names: vec![],
            person_titles: [
                "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "professor", "sir",
                "madam", "dear", "rev", "attn",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            org_suffixes: [
                "inc", "llc", "ltd", "corp", "corporation", "co", "plc", "gmbh",
                "group", "holdings", "technologies", "solutions", "systems",
                "partners", "bank", "labs", "university", "foundation",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    pub fn add_first_name(&mut self, name: &str) {
        self.first_names.push(name.to_lowercase());
    }

    pub fn add_surname(&mut self, name: &str) {
        self.surnames.push(name.to_lowercase());
    }

    pub fn add_location(&mut self, name: &str) {
        self.location_names.push(name.to_lowercase());
    }

    pub fn add_org(&mut self, name: &str) {
        let parts: Vec<String> = name.split_whitespace().map(bare_lower).collect();
        if !parts.is_empty() {
            self.org_names.push(parts);
        }
    }

    /// Applies every rule; one slot per token, `None` where no rule fired.
    pub fn apply(&self, tokens: &[Token]) -> Vec<Option<RuleMatch>> {
        let mut result: Vec<Option<RuleMatch>> = vec![None; tokens.len()];

        // 1. Placeholders
        for i in 0..tokens.len() {
            if is_placeholder(tokens, i) {
                set(&mut result, i, Tag::Outside, "mask_placeholder", 1.0);
            }
        }

        // 2. Organization gazetteer (n-grams, longest first)
        'outer_org: for i in 0..tokens.len() {
            if result[i].is_some() || !is_capitalized(&tokens[i].text) {
                continue;
            }
            let mut best: Option<usize> = None;
            for org_parts in &self.org_names {
                let n = org_parts.len();
                if i + n > tokens.len() || best.map(|b| b >= n).unwrap_or(false) {
                    continue;
                }
                let matches = org_parts.iter().enumerate().all(|(j, part)| {
                    result[i + j].is_none() && bare_lower(&tokens[i + j].text) == *part
                });
                if matches {
                    best = Some(n);
                }
            }
            if let Some(n) = best {
                set(&mut result, i, Tag::Begin(EntityCategory::Org), "org_gazetteer", 0.93);
                for j in 1..n {
                    set(&mut result, i + j, Tag::Inside(EntityCategory::Org), "org_gazetteer", 0.93);
                }
                continue 'outer_org;
            }
        }

        // 3. Title pattern: "Dr. Anita Patel"
        for i in 0..tokens.len().saturating_sub(1) {
            if !self.person_titles.contains(&bare_lower(&tokens[i].text)) {
                continue;
            }
            let run = self.name_run(tokens, &result, i + 1);
            if run > 0 {
                set(&mut result, i + 1, Tag::Begin(EntityCategory::Person), "title_pattern", 0.85);
                for j in 1..run {
                    set(&mut result, i + 1 + j, Tag::Inside(EntityCategory::Person), "title_pattern", 0.85);
                }
            }
        }

        // 4. First names, extended over following capitalized words
        let mut i = 0;
        while i < tokens.len() {
            let text = &tokens[i].text;
            if result[i].is_none()
                && is_capitalized(text)
                && !is_stop_word(&text.to_lowercase())
                && self.first_names.contains(&bare_lower(text))
            {
                set(&mut result, i, Tag::Begin(EntityCategory::Person), "first_name_gazetteer", 0.92);
                let run = self.name_run(tokens, &result, i + 1).min(MAX_NAME_RUN - 1);
                for j in 1..=run {
                    set(&mut result, i + j, Tag::Inside(EntityCategory::Person), "name_continuation", 0.85);
                }
                i += run + 1;
            } else {
                i += 1;
            }
        }

        // 5. Known surnames: continue a person, or open one mid-sentence
        for i in 0..tokens.len() {
            if result[i].is_some()
                || !is_name_word(&tokens[i].text)
                || !self.surnames.contains(&bare_lower(&tokens[i].text))
            {
                continue;
            }
            let prev_is_person = i > 0
                && result[i - 1]
                    .as_ref()
                    .map(|r| r.tag.category() == Some(EntityCategory::Person))
                    .unwrap_or(false);
            if prev_is_person {
                set(&mut result, i, Tag::Inside(EntityCategory::Person), "surname_gazetteer", 0.9);
            } else if !is_sentence_start(tokens, i) {
                set(&mut result, i, Tag::Begin(EntityCategory::Person), "surname_gazetteer", 0.8);
            }
        }

        // 6. Corporate suffix: "Globex Corp."
        for i in 1..tokens.len() {
            if result[i].is_some() || !self.org_suffixes.contains(&bare_lower(&tokens[i].text)) {
                continue;
            }
            // Walk back over the capitalized words naming the company
            let mut first = i;
            while first > 0
                && i - first < MAX_NAME_RUN
                && result[first - 1].is_none()
                && is_name_word(&tokens[first - 1].text)
            {
                first -= 1;
            }
            if first < i {
                set(&mut result, first, Tag::Begin(EntityCategory::Org), "org_suffix_pattern", 0.85);
                for j in first + 1..=i {
                    set(&mut result, j, Tag::Inside(EntityCategory::Org), "org_suffix_pattern", 0.85);
                }
            }
        }

        // 7. Locations
        for (i, token) in tokens.iter().enumerate() {
            if result[i].is_none()
                && is_capitalized(&token.text)
                && self.location_names.contains(&bare_lower(&token.text))
            {
                set(&mut result, i, Tag::Begin(EntityCategory::Loc), "location_gazetteer", 0.9);
            }
        }

        result
    }

    /// Number of consecutive unclaimed name words starting at `start`.
    fn name_run(&self, tokens: &[Token], result: &[Option<RuleMatch>], start: usize) -> usize {
        let mut n = 0;
        while start + n < tokens.len()
            && n < MAX_NAME_RUN
            && result[start + n].is_none()
            && is_name_word(&tokens[start + n].text)
            && !self.org_suffixes.contains(&bare_lower(&tokens[start + n].text))
        {
            n += 1;
        }
        n
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn set(result: &mut [Option<RuleMatch>], i: usize, tag: Tag, rule_name: &str, confidence: f64) {
    result[i] = Some(RuleMatch {
        tag,
        rule_name: rule_name.to_string(),
        confidence,
    });
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// Capitalized, alphabetic, and neither a stop word ("The", "And") nor a
/// generic email noun ("Support", "Team")
fn is_name_word(word: &str) -> bool {
    is_capitalized(word)
        && word.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '-' || c == '.')
        && !is_stop_word(&word.to_lowercase())
        && !is_generic_word(&bare_lower(word))
}

/// Lowercase without a trailing abbreviation period
fn bare_lower(word: &str) -> String {
    word.to_lowercase().trim_end_matches('.').to_string()
}
