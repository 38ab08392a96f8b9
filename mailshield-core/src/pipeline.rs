//! # Recognizer pipeline
//!
//! Ties the stages together: tokenize, extract features, apply rules, decode
//! the CRF with Viterbi, fuse both decisions and group the BIO tags into
//! [`EntitySpan`]s.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::corpus::AnnotatedSentence;
use crate::features::extract_features;
use crate::model::NerModel;
use crate::tagger::{tokens_to_spans, EntitySpan, Tag, TaggedToken};
use crate::tokenizer::tokenize;
use crate::viterbi::viterbi_decode;

/// Which decision sources the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmMode {
    /// Rules where they fire, CRF everywhere else.
    #[default]
    Hybrid,
    /// Gazetteers and patterns only; unmatched tokens are Outside.
    RulesOnly,
    /// The statistical model alone.
    CrfOnly,
}

impl AlgorithmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmMode::Hybrid => "hybrid",
            AlgorithmMode::RulesOnly => "rules_only",
            AlgorithmMode::CrfOnly => "crf_only",
        }
    }
}

impl fmt::Display for AlgorithmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "hybrid" => Ok(AlgorithmMode::Hybrid),
            "rules_only" | "rules" => Ok(AlgorithmMode::RulesOnly),
            "crf_only" | "crf" => Ok(AlgorithmMode::CrfOnly),
            other => Err(format!(
                "unknown NER mode '{other}' (expected hybrid, rules_only or crf_only)"
            )),
        }
    }
}

/// Token-level agreement with an annotated corpus
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub tokens: usize,
    pub correct: usize,
    /// Gold entity tokens (B or I)
    pub entity_tokens: usize,
    pub entity_correct: usize,
}

impl Evaluation {
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.tokens)
    }

    /// Fraction of gold entity tokens that received exactly the gold tag
    pub fn entity_recall(&self) -> f64 {
        ratio(self.entity_correct, self.entity_tokens)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub struct NerPipeline {
    pub model: NerModel,
    pub mode: AlgorithmMode,
}

impl NerPipeline {
    /// Pipeline over the built-in model, in hybrid mode.
    pub fn new() -> Self {
        Self::with_model(NerModel::default(), AlgorithmMode::Hybrid)
    }

    pub fn with_model(model: NerModel, mode: AlgorithmMode) -> Self {
        Self { model, mode }
    }

    /// Tags `text` with the configured mode.
    pub fn analyze(&self, text: &str) -> (Vec<TaggedToken>, Vec<EntitySpan>) {
        self.analyze_with_mode(text, self.mode)
    }

    pub fn analyze_with_mode(
        &self,
        text: &str,
        mode: AlgorithmMode,
    ) -> (Vec<TaggedToken>, Vec<EntitySpan>) {
        let start = Instant::now();
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return (vec![], vec![]);
        }

        // Rules, unless the CRF runs alone
        let rule_tags = if mode == AlgorithmMode::CrfOnly {
            vec![None; tokens.len()]
        } else {
            self.model.rule_engine.apply(&tokens)
        };

        // Decision source per token: a rule name or "crf"
        let mut sources: Vec<String> = Vec::with_capacity(tokens.len());

        let tagged_tokens: Vec<TaggedToken> = if mode == AlgorithmMode::RulesOnly {
            tokens
                .iter()
                .zip(&rule_tags)
                .map(|(token, rule)| match rule {
                    Some(rm) => {
                        sources.push(rm.rule_name.clone());
                        TaggedToken {
                            token: token.clone(),
                            tag: rm.tag.clone(),
                            confidence: rm.confidence,
                        }
                    }
                    None => {
                        sources.push("no_rule".to_string());
                        TaggedToken {
                            token: token.clone(),
                            tag: Tag::Outside,
                            confidence: 1.0,
                        }
                    }
                })
                .collect()
        } else {
            let feature_vectors = extract_features(&tokens, self.model.gazetteers());
            let viterbi_result = viterbi_decode(&self.model.crf, &feature_vectors);
            let confidences = viterbi_result.confidences();

            tokens
                .iter()
                .enumerate()
                .map(|(i, token)| {
                    // Rules win where they fired
                    if let Some(rm) = &rule_tags[i] {
                        sources.push(rm.rule_name.clone());
                        return TaggedToken {
                            token: token.clone(),
                            tag: rm.tag.clone(),
                            confidence: rm.confidence,
                        };
                    }
                    sources.push("crf".to_string());
                    TaggedToken {
                        token: token.clone(),
                        tag: viterbi_result
                            .best_sequence
                            .get(i)
                            .cloned()
                            .unwrap_or(Tag::Outside),
                        confidence: confidences.get(i).copied().unwrap_or(0.5),
                    }
                })
                .collect()
        };

        let mut entities = tokens_to_spans(&tagged_tokens, text);
        for span in &mut entities {
            if let Some(i) = tagged_tokens.iter().position(|t| t.token.start == span.start) {
                span.source = sources[i].clone();
            }
        }

        tracing::debug!(
            mode = %mode,
            tokens = tagged_tokens.len(),
            entities = entities.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Recognized entities"
        );

        (tagged_tokens, entities)
    }

    /// Compares the configured mode's tags with the annotations of `corpus`.
    pub fn evaluate(&self, corpus: &[AnnotatedSentence]) -> Evaluation {
        let mut eval = Evaluation {
            tokens: 0,
            correct: 0,
            entity_tokens: 0,
            entity_correct: 0,
        };

        for sentence in corpus {
            let (tagged, _) = self.analyze(sentence.text);
            for (predicted, (_, label)) in tagged.iter().zip(sentence.annotations) {
                let gold = Tag::from_label(label).unwrap_or(Tag::Outside);
                let hit = predicted.tag == gold;
                eval.tokens += 1;
                eval.correct += usize::from(hit);
                if gold != Tag::Outside {
                    eval.entity_tokens += 1;
                    eval.entity_correct += usize::from(hit);
                }
            }
        }
        eval
    }
}

impl Default for NerPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::get_corpus;
    use crate::tagger::EntityCategory;

    #[test]
    fn test_required_example() {
        let pipeline = NerPipeline::new();
        let (_, entities) = pipeline.analyze("Please call John Smith at [PHONE]");

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "John Smith");
        assert_eq!(entities[0].category, EntityCategory::Person);
        assert_eq!(entities[0].source, "first_name_gazetteer");
    }

    #[test]
    fn test_sentence_opener_is_not_an_entity() {
        let pipeline = NerPipeline::new();
        for mode in [AlgorithmMode::Hybrid, AlgorithmMode::CrfOnly] {
            let (tagged, _) = pipeline.analyze_with_mode("Please reset my password.", mode);
            assert_eq!(tagged[0].tag, Tag::Outside, "{mode}");
        }
    }

    #[test]
    fn test_placeholders_never_recognized() {
        let pipeline = NerPipeline::new();
        let text = "[PERSON] from [ORG] wrote to [EMAIL] and [PHONE]";
        for mode in [AlgorithmMode::Hybrid, AlgorithmMode::RulesOnly, AlgorithmMode::CrfOnly] {
            let (_, entities) = pipeline.analyze_with_mode(text, mode);
            assert!(entities.is_empty(), "{mode}: {entities:?}");
        }
    }

    #[test]
    fn test_org_with_suffix() {
        let pipeline = NerPipeline::new();
        let (_, entities) = pipeline.analyze("We signed with Pied Piper LLC last week");
        let org = entities
            .iter()
            .find(|e| e.category == EntityCategory::Org)
            .expect("an ORG span");
        assert_eq!(org.text, "Pied Piper LLC");
    }

    #[test]
    fn test_rules_only_leaves_unknown_words() {
        let pipeline = NerPipeline::new();
        let (tagged, entities) =
            pipeline.analyze_with_mode("Zorblax approved it", AlgorithmMode::RulesOnly);
        assert!(entities.is_empty());
        assert!(tagged.iter().all(|t| t.tag == Tag::Outside));
    }

    #[test]
    fn test_unknown_name_stops_at_lowercase_words() {
        let pipeline = NerPipeline::new();
        for mode in [AlgorithmMode::Hybrid, AlgorithmMode::CrfOnly] {
            let (tagged, entities) =
                pipeline.analyze_with_mode("Tickets from Quuxly arrived broken", mode);
            assert_eq!(tagged[3].tag, Tag::Outside, "{mode}");
            assert_eq!(tagged[4].tag, Tag::Outside, "{mode}");
            assert!(entities.iter().all(|e| e.text == "Quuxly"), "{mode}: {entities:?}");
        }
    }

    #[test]
    fn test_generic_recipient_is_not_a_person() {
        let pipeline = NerPipeline::new();
        for text in ["Hi Team, thanks", "Dear Support, thanks", "Subject: VPN Issue"] {
            let (_, entities) = pipeline.analyze(text);
            assert!(entities.is_empty(), "{text}: {entities:?}");
        }
    }

    #[test]
    fn test_pipeline_empty() {
        let pipeline = NerPipeline::new();
        let (tagged, entities) = pipeline.analyze("");
        assert!(tagged.is_empty());
        assert!(entities.is_empty());
    }

    #[test]
    fn test_offsets_point_into_text() {
        let pipeline = NerPipeline::new();
        let text = "Thanks, Maria Garcia";
        let (_, entities) = pipeline.analyze(text);
        for e in &entities {
            assert_eq!(&text[e.start..e.end], e.text);
        }
        assert!(entities.iter().any(|e| e.text == "Maria Garcia"));
    }

    #[test]
    fn test_hybrid_on_corpus() {
        let pipeline = NerPipeline::new();
        let eval = pipeline.evaluate(&get_corpus());
        assert!(eval.tokens > 150);
        assert!(eval.accuracy() > 0.9, "accuracy {}", eval.accuracy());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("hybrid".parse::<AlgorithmMode>(), Ok(AlgorithmMode::Hybrid));
        assert_eq!("rules-only".parse::<AlgorithmMode>(), Ok(AlgorithmMode::RulesOnly));
        assert_eq!("CRF_ONLY".parse::<AlgorithmMode>(), Ok(AlgorithmMode::CrfOnly));
        assert!("neural".parse::<AlgorithmMode>().is_err());
        assert_eq!(AlgorithmMode::default().to_string(), "hybrid");
    }
}
