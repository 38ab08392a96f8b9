//! # PII masking
//!
//! Two stages, always in this order:
//!
//! 1. [`PatternMatcher`]: emails → `[EMAIL]`, then phones → `[PHONE]`
//! 2. An [`EntityRecognizer`]: PERSON and ORG spans → `[PERSON]` / `[ORG]`
//!
//! ```rust
//! use mailshield_core::PiiMasker;
//!
//! let masker = PiiMasker::with_default_model().unwrap();
//! let masked = masker.mask_all("Please call John Smith at 555-0199");
//! assert_eq!(masked, "Please call [PERSON] at [PHONE]");
//! ```

use crate::error::Result;
use crate::patterns::PatternMatcher;
use crate::pipeline::NerPipeline;
use crate::tagger::EntitySpan;

/// Anything that finds entity spans in text.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<EntitySpan>;
}

impl EntityRecognizer for NerPipeline {
    fn recognize(&self, text: &str) -> Vec<EntitySpan> {
        self.analyze(text).1
    }
}

/// Replaces every PERSON/ORG span with its placeholder.
///
/// Spans are applied from the last start offset to the first, so earlier
/// offsets stay valid while the string changes. A span overlapping one
/// already replaced is skipped.
pub fn replace_entities(text: &str, spans: &[EntitySpan]) -> String {
    let mut masked: Vec<&EntitySpan> = spans
        .iter()
        .filter(|s| s.category.is_masked())
        .filter(|s| s.start < s.end && s.end <= text.len())
        .collect();
    masked.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = text.to_string();
    let mut boundary = text.len();
    for span in masked {
        if span.end > boundary {
            continue;
        }
        result.replace_range(span.start..span.end, &format!("[{}]", span.category.name()));
        boundary = span.start;
    }
    result
}

pub struct PiiMasker {
    patterns: PatternMatcher,
    recognizer: Box<dyn EntityRecognizer>,
}

impl PiiMasker {
    pub fn new(patterns: PatternMatcher, recognizer: impl EntityRecognizer + 'static) -> Self {
        Self {
            patterns,
            recognizer: Box::new(recognizer),
        }
    }

    /// Default patterns and the built-in recognizer in hybrid mode.
    pub fn with_default_model() -> Result<Self> {
        Ok(Self::new(PatternMatcher::new()?, NerPipeline::new()))
    }

    /// Regex stage only.
    pub fn mask_patterns(&self, text: &str) -> String {
        self.patterns.mask(text)
    }

    /// Recognizer stage only.
    pub fn mask_entities(&self, text: &str) -> String {
        let spans = self.recognizer.recognize(text);
        replace_entities(text, &spans)
    }

    /// Both stages: patterns, then entities.
    pub fn mask_all(&self, text: &str) -> String {
        let masked = self.mask_patterns(text);
        self.mask_entities(&masked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    fn span(text: &str, needle: &str, category: EntityCategory) -> EntitySpan {
        let start = text.find(needle).unwrap();
        EntitySpan {
            text: needle.to_string(),
            category,
            start,
            end: start + needle.len(),
            confidence: 1.0,
            source: "test".to_string(),
        }
    }

    /// Returns fixed spans, recomputed against whatever text it is given
    struct FixedRecognizer(Vec<(&'static str, EntityCategory)>);

    impl EntityRecognizer for FixedRecognizer {
        fn recognize(&self, text: &str) -> Vec<EntitySpan> {
            self.0
                .iter()
                .filter(|(needle, _)| text.contains(needle))
                .map(|(needle, cat)| span(text, needle, *cat))
                .collect()
        }
    }

    #[test]
    fn test_multiple_spans_replaced_right_to_left() {
        let text = "Anna Lee from Initech met Bob";
        let spans = vec![
            span(text, "Anna Lee", EntityCategory::Person),
            span(text, "Initech", EntityCategory::Org),
            span(text, "Bob", EntityCategory::Person),
        ];
        assert_eq!(replace_entities(text, &spans), "[PERSON] from [ORG] met [PERSON]");
    }

    #[test]
    fn test_loc_and_misc_untouched() {
        let text = "Sam in Paris uses Outlook";
        let spans = vec![
            span(text, "Sam", EntityCategory::Person),
            span(text, "Paris", EntityCategory::Loc),
            span(text, "Outlook", EntityCategory::Misc),
        ];
        assert_eq!(replace_entities(text, &spans), "[PERSON] in Paris uses Outlook");
    }

    #[test]
    fn test_overlapping_span_skipped() {
        let text = "Acme Corp Holdings";
        let spans = vec![
            span(text, "Acme Corp", EntityCategory::Org),
            span(text, "Corp Holdings", EntityCategory::Org),
        ];
        assert_eq!(replace_entities(text, &spans), "Acme [ORG]");
    }

    #[test]
    fn test_recognizer_sees_regex_output() {
        let masker = PiiMasker::new(
            PatternMatcher::new().unwrap(),
            FixedRecognizer(vec![("Globex", EntityCategory::Org)]),
        );
        let masked = masker.mask_all("Globex: ops@globex.com, 555-0199");
        assert_eq!(masked, "[ORG]: [EMAIL], [PHONE]");
    }

    #[test]
    fn test_required_example_default_model() {
        let masker = PiiMasker::with_default_model().unwrap();
        let masked = masker.mask_all("Please call John Smith at 555-0199");
        assert!(masked.contains("[PHONE]"));
        assert!(masked.contains("[PERSON]"));
        assert!(!masked.contains("John"));
        assert!(!masked.contains("0199"));
    }

    #[test]
    fn test_mask_all_is_stable() {
        let masker = PiiMasker::with_default_model().unwrap();
        let once = masker.mask_all("Hi Sarah, the invoice from Globex Corp. is attached.");
        assert_eq!(once, "Hi [PERSON], the invoice from [ORG] is attached.");
        assert_eq!(masker.mask_all(&once), once);
    }
}
