//! Vigil Core - moderation pipeline for encrypted messaging.
//!
//! This crate scores user messages and decides what to do with them.
//! It handles:
//!
//! - Text normalization (lowercasing, URL/email stripping, punctuation runs)
//! - TF-IDF + multinomial logistic classification over benign/spam/toxic
//! - Fuzzy rule inference turning classifier output into allow/flag/block
//! - The send pipeline that seals every message with envelope encryption
//! - Trait seams for persistence and recipient notification
//!
//! # Example
//!
//! ```no_run
//! use vigil_core::{ModerationPipeline, PipelineConfig};
//!
//! let pipeline = ModerationPipeline::bootstrap(&PipelineConfig::default()).unwrap();
//!
//! let result = pipeline.submit("hello there").unwrap();
//! println!(
//!     "{} ({:.2}): {}",
//!     result.decision.action.name(),
//!     result.decision.score,
//!     result.classification.predicted.name(),
//! );
//! ```

pub mod classifier;
pub mod error;
pub mod fuzzy;
mod normalize;
mod pipeline;
pub mod service;

pub use classifier::{
    ClassificationResult, ClassifierConfig, ContentClassifier, Label, LabelDistribution,
    TrainingCorpus,
};
pub use error::{PipelineError, Result, StartupError};
pub use fuzzy::{Action, Decision, DecisionEngine, MembershipCatalog, Rule, RuleSet};
pub use normalize::TextNormalizer;
pub use pipeline::{
    ModerationPipeline, ModerationResult, PipelineConfig, RevealedContent,
};
pub use service::{
    ChannelNotifier, DecryptedMessage, MessageRecord, MessageService, MessageStore, ServiceError,
};
