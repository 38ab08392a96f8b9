//! # mailshield-core: PII masking and email classification
//!
//! Email text flows through the crate in one direction:
//!
//! 1.  **Patterns** ([`patterns`]): addresses and phone numbers become
//!     `[EMAIL]` and `[PHONE]`.
//! 2.  **Entity recognition** ([`pipeline`]): a hybrid recognizer finds
//!     people and organizations.
//!     *   **Tokenization** ([`tokenizer`]) with byte offsets.
//!     *   **Features** ([`features`]) per token.
//!     *   **Rules and gazetteers** ([`rule_based`]).
//!     *   **CRF + Viterbi** ([`crf`], [`viterbi`]).
//! 3.  **Masking** ([`masking`]): PERSON and ORG spans become `[PERSON]` and
//!     `[ORG]`.
//! 4.  **Classification** ([`classifier`]): TF-IDF ([`vectorizer`]) and
//!     multinomial naive Bayes ([`naive_bayes`]) give a category and a
//!     confidence.
//!
//! Training ([`training`]) runs the same masking over a CSV dataset
//! ([`dataset`]) before fitting, and reports [`metrics`] on a held-out split.
//!
//! ## Example
//!
//! ```rust
//! use mailshield_core::{EmailClassifier, PiiMasker};
//!
//! let masker = PiiMasker::with_default_model().unwrap();
//! let masked = masker.mask_all("Please call John Smith at 555-0199");
//! assert!(masked.contains("[PERSON]") && masked.contains("[PHONE]"));
//!
//! let texts = ["laptop will not boot", "refund my invoice"];
//! let labels = vec!["support".to_string(), "billing".to_string()];
//! let classifier = EmailClassifier::fit(&texts, &labels, Some(5000), 1.0).unwrap();
//! let prediction = classifier.predict(&masked);
//! assert!((0.0..=1.0).contains(&prediction.confidence));
//! ```

pub mod classifier;
pub mod corpus;
pub mod crf;
pub mod dataset;
pub mod error;
pub mod features;
pub mod masking;
pub mod metrics;
pub mod model;
pub mod naive_bayes;
pub mod patterns;
pub mod pipeline;
pub mod rule_based;
pub mod stop_words;
pub mod tagger;
pub mod tokenizer;
pub mod training;
pub mod vectorizer;
pub mod viterbi;

pub use classifier::{EmailClassifier, Prediction};
pub use error::{Error, Result};
pub use masking::{EntityRecognizer, PiiMasker};
pub use model::NerModel;
pub use patterns::PatternMatcher;
pub use pipeline::{AlgorithmMode, NerPipeline};
pub use tagger::{EntityCategory, EntitySpan, Tag, TaggedToken};
pub use tokenizer::Token;
pub use training::{TrainingConfig, TrainingOutcome};
