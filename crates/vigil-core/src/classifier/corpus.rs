//! Labeled training corpora loaded at startup.
//!
//! Three UTF-8 files, one example per line: `benign.txt`, `spam.txt`,
//! `toxic.txt`. A missing or empty file is fatal; the process must not
//! start serving without a trained model.

use std::fs;
use std::path::Path;

use tracing::info;

use super::Label;
use crate::error::StartupError;

/// File name of the benign examples corpus.
pub const BENIGN_FILE: &str = "benign.txt";
/// File name of the spam examples corpus.
pub const SPAM_FILE: &str = "spam.txt";
/// File name of the toxic examples corpus.
pub const TOXIC_FILE: &str = "toxic.txt";

/// The three labeled example sets the classifier trains on.
#[derive(Debug, Clone)]
pub struct TrainingCorpus {
    /// Benign example lines.
    pub benign: Vec<String>,
    /// Spam example lines.
    pub spam: Vec<String>,
    /// Toxic example lines.
    pub toxic: Vec<String>,
}

impl TrainingCorpus {
    /// Loads all three corpora from `dir`.
    pub fn load(dir: &Path) -> Result<Self, StartupError> {
        let benign = load_corpus_file(&dir.join(BENIGN_FILE), Label::Benign)?;
        let spam = load_corpus_file(&dir.join(SPAM_FILE), Label::Spam)?;
        let toxic = load_corpus_file(&dir.join(TOXIC_FILE), Label::Toxic)?;

        info!(
            benign = benign.len(),
            spam = spam.len(),
            toxic = toxic.len(),
            "loaded training corpora"
        );

        Ok(Self {
            benign,
            spam,
            toxic,
        })
    }

    /// Builds a corpus from in-memory examples. Intended for tests and
    /// embedders that manage their own corpora.
    pub fn from_examples(
        benign: Vec<String>,
        spam: Vec<String>,
        toxic: Vec<String>,
    ) -> Result<Self, StartupError> {
        for (label, set) in [
            (Label::Benign, &benign),
            (Label::Spam, &spam),
            (Label::Toxic, &toxic),
        ] {
            if set.iter().all(|line| line.trim().is_empty()) {
                return Err(StartupError::CorpusEmpty(label));
            }
        }
        Ok(Self {
            benign,
            spam,
            toxic,
        })
    }

    /// Total number of examples across all labels.
    pub fn len(&self) -> usize {
        self.benign.len() + self.spam.len() + self.toxic.len()
    }

    /// True if no label has any examples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates `(line, label)` pairs in a fixed order.
    pub fn labeled_lines(&self) -> impl Iterator<Item = (&str, Label)> {
        self.benign
            .iter()
            .map(|l| (l.as_str(), Label::Benign))
            .chain(self.spam.iter().map(|l| (l.as_str(), Label::Spam)))
            .chain(self.toxic.iter().map(|l| (l.as_str(), Label::Toxic)))
    }
}

fn load_corpus_file(path: &Path, label: Label) -> Result<Vec<String>, StartupError> {
    if !path.exists() {
        return Err(StartupError::CorpusMissing(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let lines: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if lines.is_empty() {
        return Err(StartupError::CorpusEmpty(label));
    }

    Ok(lines)
}
