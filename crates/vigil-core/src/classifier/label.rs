//! Content labels and classification result types.

use serde::{Deserialize, Serialize};

/// Labels the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Ordinary, harmless content.
    Benign,
    /// Unsolicited promotional or scam content.
    Spam,
    /// Abusive or harassing content.
    Toxic,
}

impl Label {
    /// Returns all labels, in the order used throughout the crate.
    pub fn all() -> &'static [Label] {
        &[Label::Benign, Label::Spam, Label::Toxic]
    }

    /// Returns a human-readable name for this label.
    pub fn name(&self) -> &'static str {
        match self {
            Label::Benign => "Benign",
            Label::Spam => "Spam",
            Label::Toxic => "Toxic",
        }
    }

    /// Index of this label in [`Label::all`] order.
    pub(crate) fn index(&self) -> usize {
        match self {
            Label::Benign => 0,
            Label::Spam => 1,
            Label::Toxic => 2,
        }
    }
}

/// A probability assigned to each label. Entries sum to ~1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelDistribution {
    /// Probability of the benign label.
    pub benign: f64,
    /// Probability of the spam label.
    pub spam: f64,
    /// Probability of the toxic label.
    pub toxic: f64,
}

impl LabelDistribution {
    /// Builds a distribution from probabilities in [`Label::all`] order.
    pub(crate) fn from_probs(probs: [f64; 3]) -> Self {
        Self {
            benign: probs[0],
            spam: probs[1],
            toxic: probs[2],
        }
    }

    /// Returns the probability of `label`.
    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::Benign => self.benign,
            Label::Spam => self.spam,
            Label::Toxic => self.toxic,
        }
    }

    /// Returns the label with the highest probability.
    pub fn argmax(&self) -> Label {
        let mut best = Label::Benign;
        for &label in Label::all() {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }

    /// Probabilities in [`Label::all`] order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.benign, self.spam, self.toxic]
    }
}

/// Result of classifying one piece of text. Created per call, never
/// mutated; consumed by the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The arg-max label.
    pub predicted: Label,
    /// Full probability distribution over labels.
    pub probabilities: LabelDistribution,
    /// Entropy-derived confidence: 1 for one-hot, 0 for uniform.
    pub confidence: f64,
}

impl ClassificationResult {
    /// Fixed low-confidence benign-leaning default returned for input
    /// that is empty after normalization, which must never reach the
    /// trained model.
    pub fn empty_input_default() -> Self {
        Self {
            predicted: Label::Benign,
            probabilities: LabelDistribution {
                benign: 0.5,
                spam: 0.25,
                toxic: 0.25,
            },
            confidence: 0.5,
        }
    }
}
