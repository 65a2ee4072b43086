//! Trained multi-class content classifier.
//!
//! A linear softmax model over tf-idf features, trained once at startup
//! by full-batch gradient descent from zero-initialized weights. No
//! randomness anywhere: identical corpora and config produce an
//! identical model, and classification is a pure function thereafter.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::corpus::TrainingCorpus;
use super::features::{FeatureConfig, SparseVector, Vectorizer};
use super::{ClassificationResult, Label, LabelDistribution};
use crate::error::StartupError;
use crate::normalize::TextNormalizer;

const LABEL_COUNT: usize = 3;

/// Training settings for the content classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Feature extraction settings.
    pub features: FeatureConfig,
    /// Full-batch gradient descent epochs.
    pub epochs: usize,
    /// Gradient descent step size.
    pub learning_rate: f64,
    /// L2 regularization strength.
    pub l2_penalty: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            epochs: 400,
            learning_rate: 0.5,
            l2_penalty: 1e-4,
        }
    }
}

/// The trained classifier. Immutable after [`ContentClassifier::train`];
/// shared read-only across concurrent pipeline invocations.
#[derive(Debug)]
pub struct ContentClassifier {
    normalizer: TextNormalizer,
    vectorizer: Vectorizer,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl ContentClassifier {
    /// Trains a classifier from the given corpus.
    ///
    /// Fails if any label is left without usable examples once its lines
    /// are normalized.
    pub fn train(corpus: &TrainingCorpus, config: ClassifierConfig) -> Result<Self, StartupError> {
        let normalizer = TextNormalizer::new();

        let mut documents = Vec::new();
        let mut labels = Vec::new();
        for (line, label) in corpus.labeled_lines() {
            let normalized = normalizer.normalize(line);
            if !normalized.is_empty() {
                documents.push(normalized);
                labels.push(label);
            }
        }
        for &label in Label::all() {
            if !labels.contains(&label) {
                return Err(StartupError::CorpusEmpty(label));
            }
        }

        let vectorizer = Vectorizer::fit(&documents, config.features.clone());
        let vectors: Vec<SparseVector> = documents.iter().map(|d| vectorizer.transform(d)).collect();

        let feature_count = vectorizer.vocabulary_size();
        let mut weights = vec![vec![0.0; feature_count]; LABEL_COUNT];
        let mut bias = vec![0.0; LABEL_COUNT];

        let sample_count = vectors.len() as f64;
        for _ in 0..config.epochs {
            let mut weight_grad = vec![vec![0.0; feature_count]; LABEL_COUNT];
            let mut bias_grad = vec![0.0; LABEL_COUNT];

            for (vector, &label) in vectors.iter().zip(&labels) {
                let probs = softmax(&raw_scores(&weights, &bias, vector));
                for class in 0..LABEL_COUNT {
                    let error = probs[class] - if class == label.index() { 1.0 } else { 0.0 };
                    bias_grad[class] += error;
                    for &(index, value) in vector {
                        weight_grad[class][index] += error * value;
                    }
                }
            }

            for class in 0..LABEL_COUNT {
                for index in 0..feature_count {
                    let grad = weight_grad[class][index] / sample_count
                        + config.l2_penalty * weights[class][index];
                    weights[class][index] -= config.learning_rate * grad;
                }
                bias[class] -= config.learning_rate * bias_grad[class] / sample_count;
            }
        }

        info!(
            documents = documents.len(),
            features = feature_count,
            epochs = config.epochs,
            "content classifier trained"
        );

        Ok(Self {
            normalizer,
            vectorizer,
            weights,
            bias,
        })
    }

    /// Classifies `text` into a probability distribution over labels
    /// with an entropy-derived confidence.
    ///
    /// Input that is empty after normalization never reaches the model;
    /// it gets the fixed benign-leaning default instead.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let normalized = self.normalizer.normalize(text);
        if normalized.is_empty() {
            return ClassificationResult::empty_input_default();
        }

        let vector = self.vectorizer.transform(&normalized);
        let probs = softmax(&raw_scores(&self.weights, &self.bias, &vector));

        let probabilities = LabelDistribution::from_probs(probs);
        ClassificationResult {
            predicted: probabilities.argmax(),
            probabilities,
            confidence: entropy_confidence(&probs),
        }
    }

    /// Number of features the trained model scores.
    pub fn feature_count(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

fn raw_scores(weights: &[Vec<f64>], bias: &[f64], vector: &SparseVector) -> [f64; LABEL_COUNT] {
    let mut scores = [0.0; LABEL_COUNT];
    for class in 0..LABEL_COUNT {
        let mut score = bias[class];
        for &(index, value) in vector {
            score += weights[class][index] * value;
        }
        scores[class] = score;
    }
    scores
}

fn softmax(scores: &[f64; LABEL_COUNT]) -> [f64; LABEL_COUNT] {
    let max = scores.iter().cloned().fold(f64::MIN, f64::max);
    let mut exps = [0.0; LABEL_COUNT];
    let mut sum = 0.0;
    for (i, &score) in scores.iter().enumerate() {
        exps[i] = (score - max).exp();
        sum += exps[i];
    }
    for exp in &mut exps {
        *exp /= sum;
    }
    exps
}

/// `1 - H(p)/H_max`: 1 for a one-hot distribution, 0 for uniform.
fn entropy_confidence(probs: &[f64; LABEL_COUNT]) -> f64 {
    let entropy: f64 = probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum();
    let max_entropy = (LABEL_COUNT as f64).ln();
    (1.0 - entropy / max_entropy).clamp(0.0, 1.0)
}
