//! # BIO tags and entity categories
//!
//! Tokens are labelled with the **BIO** scheme (Begin-Inside-Outside):
//!
//! - `B-TAG`: first token of an entity
//! - `I-TAG`: following tokens of the same entity
//! - `O`: not part of any entity
//!
//! | Label  | Meaning      | Examples                      |
//! |--------|--------------|-------------------------------|
//! | PERSON | Person       | John Smith, Dr. Patel         |
//! | ORG    | Organization | Acme Corp, Globex, IBM        |
//! | LOC    | Location     | London, Texas                 |
//! | MISC   | Other names  | Windows, Outlook              |
//!
//! Only PERSON and ORG are masked; LOC and MISC are recognised so the
//! model does not force every capitalised place name into one of them.

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Entity categories produced by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityCategory {
    /// People: "John Smith", "Ms. Garcia".
    Person,
    /// Companies, institutions, teams: "Acme Corp", "HR Department".
    Org,
    /// Places: "London", "New York".
    Loc,
    /// Anything else with a proper name: products, events.
    Misc,
}

impl EntityCategory {
    /// Label used in tags and placeholders
    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::Person => "PERSON",
            EntityCategory::Org => "ORG",
            EntityCategory::Loc => "LOC",
            EntityCategory::Misc => "MISC",
        }
    }

    /// Parses a label ("PERSON" → Person)
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "PERSON" => Some(EntityCategory::Person),
            "ORG" => Some(EntityCategory::Org),
            "LOC" => Some(EntityCategory::Loc),
            "MISC" => Some(EntityCategory::Misc),
            _ => None,
        }
    }

    /// Whether spans of this category are replaced by the masker.
    pub fn is_masked(&self) -> bool {
        matches!(self, EntityCategory::Person | EntityCategory::Org)
    }
}

/// BIO tag for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Begin(EntityCategory),
    Inside(EntityCategory),
    Outside,
}

impl Tag {
    /// Text form ("B-PERSON", "I-ORG", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B-{}", cat.name()),
            Tag::Inside(cat) => format!("I-{}", cat.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Row/column index in the CRF transition matrix.
    pub fn index(&self) -> usize {
        match self {
            Tag::Outside => 0,
            Tag::Begin(EntityCategory::Person) => 1,
            Tag::Inside(EntityCategory::Person) => 2,
            Tag::Begin(EntityCategory::Org) => 3,
            Tag::Inside(EntityCategory::Org) => 4,
            Tag::Begin(EntityCategory::Loc) => 5,
            Tag::Inside(EntityCategory::Loc) => 6,
            Tag::Begin(EntityCategory::Misc) => 7,
            Tag::Inside(EntityCategory::Misc) => 8,
        }
    }

    pub const COUNT: usize = 9;

    /// All tags, ordered by [`Tag::index`]
    pub fn all() -> [Tag; 9] {
        [
            Tag::Outside,
            Tag::Begin(EntityCategory::Person),
            Tag::Inside(EntityCategory::Person),
            Tag::Begin(EntityCategory::Org),
            Tag::Inside(EntityCategory::Org),
            Tag::Begin(EntityCategory::Loc),
            Tag::Inside(EntityCategory::Loc),
            Tag::Begin(EntityCategory::Misc),
            Tag::Inside(EntityCategory::Misc),
        ]
    }

    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// Whether `prev → next` is allowed by BIO.
    ///
    /// `I-X` may only follow `B-X` or `I-X`; everything else is free.
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(cat) => match prev {
                Tag::Begin(prev_cat) | Tag::Inside(prev_cat) => prev_cat == cat,
                _ => false,
            },
            _ => true,
        }
    }

    /// Parses "B-PERSON" / "I-ORG" / "O"
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, name) = s.split_once('-')?;
        let cat = EntityCategory::from_name(name)?;
        match prefix {
            "B" => Some(Tag::Begin(cat)),
            "I" => Some(Tag::Inside(cat)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A token with its final tag and confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub tag: Tag,
    /// 0.0 to 1.0
    pub confidence: f64,
}

/// A recognised entity: byte range in the source text plus its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Entity text as it appears in the source ("John Smith")
    pub text: String,
    pub category: EntityCategory,
    /// Start byte offset in the source text
    pub start: usize,
    /// End byte offset in the source text (exclusive)
    pub end: usize,
    /// Mean confidence of the tokens in the span
    pub confidence: f64,
    /// Where the decision came from: a rule name or "crf"
    pub source: String,
}

/// Groups BIO-tagged tokens into entity spans.
///
/// A span opens on `B-X` and extends over consecutive `I-X` of the same
/// category. A stray `I-X` with no opening `B-X` is dropped.
///
/// `[B-PERSON, I-PERSON, O, B-ORG]` → `[PERSON span, ORG span]`
pub fn tokens_to_spans(tagged: &[TaggedToken], original_text: &str) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < tagged.len() {
        if let Tag::Begin(cat) = &tagged[i].tag {
            let cat = *cat;
            let start_byte = tagged[i].token.start;
            let mut end_byte = tagged[i].token.end;
            let mut conf_sum = tagged[i].confidence;
            let mut count = 1usize;

            let mut j = i + 1;
            while j < tagged.len() {
                match &tagged[j].tag {
                    Tag::Inside(next_cat) if *next_cat == cat => {
                        end_byte = tagged[j].token.end;
                        conf_sum += tagged[j].confidence;
                        count += 1;
                        j += 1;
                    }
                    _ => break,
                }
            }

            spans.push(EntitySpan {
                text: original_text[start_byte..end_byte].to_string(),
                category: cat,
                start: start_byte,
                end: end_byte,
                confidence: conf_sum / count as f64,
                source: "crf".to_string(),
            });

            i = j;
        } else {
            i += 1;
        }
    }

    spans
}
