//! Term-frequency / inverse-document-frequency feature extraction.
//!
//! Unigram + bigram counts with sublinear tf scaling, smoothed idf, and
//! L2 normalization. The vocabulary is fixed by the training corpus and
//! sorted so feature indices are stable across runs.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A document as `(feature index, weight)` pairs, sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Feature extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Largest n-gram length (1 = unigrams only, 2 adds bigrams, ...).
    pub max_ngram: usize,
    /// Drop terms appearing in fewer documents than this.
    pub min_document_frequency: usize,
    /// Apply `1 + ln(tf)` scaling instead of raw counts.
    pub sublinear_tf: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_ngram: 2,
            min_document_frequency: 1,
            sublinear_tf: true,
        }
    }
}

/// Vocabulary and idf weights learned from the training corpus.
#[derive(Debug, Clone)]
pub struct Vectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    token_pattern: Regex,
    config: FeatureConfig,
}

impl Vectorizer {
    /// Learns the vocabulary and idf weights from normalized documents.
    pub fn fit(documents: &[String], config: FeatureConfig) -> Self {
        let token_pattern = token_pattern();

        // Document frequency per term.
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let mut seen: Vec<&String> = Vec::new();
            let terms = extract_terms(&token_pattern, doc, config.max_ngram);
            for term in &terms {
                if !seen.contains(&term) {
                    seen.push(term);
                }
            }
            for term in seen {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        // Sorted vocabulary for stable indices.
        let mut terms: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= config.min_document_frequency)
            .collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let total_docs = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (index, (term, df)) in terms.into_iter().enumerate() {
            vocabulary.insert(term, index);
            // Smoothed idf: ln((1 + n) / (1 + df)) + 1.
            idf.push(((1.0 + total_docs) / (1.0 + df as f64)).ln() + 1.0);
        }

        Self {
            vocabulary,
            idf,
            token_pattern,
            config,
        }
    }

    /// Maps normalized text to an L2-normalized tf-idf vector.
    /// Out-of-vocabulary terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        let terms = extract_terms(&self.token_pattern, text, self.config.max_ngram);

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                (index, tf * self.idf[index])
            })
            .collect();
        vector.sort_by_key(|(index, _)| *index);

        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut vector {
                *w /= norm;
            }
        }
        vector
    }

    /// Number of features in the learned vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

fn token_pattern() -> Regex {
    Regex::new(r"[a-z0-9']+").expect("valid token pattern")
}

fn extract_terms(pattern: &Regex, text: &str, max_ngram: usize) -> Vec<String> {
    let tokens: Vec<&str> = pattern.find_iter(text).map(|m| m.as_str()).collect();

    let mut terms = Vec::new();
    for n in 1..=max_ngram.max(1) {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn extracts_unigrams_and_bigrams() {
        let pattern = token_pattern();
        let terms = extract_terms(&pattern, "free money now", 2);
        assert_eq!(
            terms,
            vec!["free", "money", "now", "free money", "money now"]
        );
    }

    #[test]
    fn vocabulary_is_sorted_and_stable() {
        let documents = docs(&["b a", "c a"]);
        let first = Vectorizer::fit(&documents, FeatureConfig::default());
        let second = Vectorizer::fit(&documents, FeatureConfig::default());
        assert_eq!(first.vocabulary_size(), second.vocabulary_size());
        assert_eq!(first.transform("a b c"), second.transform("a b c"));
    }

    #[test]
    fn transform_is_l2_normalized() {
        let documents = docs(&["free money", "hello friend", "money talks"]);
        let vectorizer = Vectorizer::fit(&documents, FeatureConfig::default());
        let vector = vectorizer.transform("free money");
        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_vocabulary_terms_are_dropped() {
        let documents = docs(&["hello world"]);
        let vectorizer = Vectorizer::fit(&documents, FeatureConfig::default());
        assert!(vectorizer.transform("entirely unseen tokens").is_empty());
    }

    #[test]
    fn min_document_frequency_prunes_rare_terms() {
        let documents = docs(&["shared rare", "shared common", "shared common"]);
        let config = FeatureConfig {
            min_document_frequency: 2,
            ..Default::default()
        };
        let vectorizer = Vectorizer::fit(&documents, config);
        assert!(vectorizer.transform("rare").is_empty());
        assert!(!vectorizer.transform("shared").is_empty());
    }

    #[test]
    fn rarer_terms_carry_higher_idf_weight() {
        let documents = docs(&["common rare", "common", "common", "common"]);
        let vectorizer = Vectorizer::fit(&documents, FeatureConfig::default());
        // "common", "rare", and the "common rare" bigram are all in vocab.
        let vector = vectorizer.transform("common rare");
        assert_eq!(vector.len(), 3);
        let weights: Vec<f64> = vector.iter().map(|(_, w)| *w).collect();
        let max = weights.iter().cloned().fold(f64::MIN, f64::max);
        let min = weights.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max > min);
    }
}
