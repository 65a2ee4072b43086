//! Content classification.
//!
//! Trained once at process start from static labeled corpora; immutable
//! thereafter. Produces a probability distribution over
//! {benign, spam, toxic} plus an entropy-derived confidence value that
//! feeds the fuzzy decision engine.

mod corpus;
mod features;
mod label;
mod model;

pub use corpus::{TrainingCorpus, BENIGN_FILE, SPAM_FILE, TOXIC_FILE};
pub use features::{FeatureConfig, Vectorizer};
pub use label::{ClassificationResult, Label, LabelDistribution};
pub use model::{ClassifierConfig, ContentClassifier};
