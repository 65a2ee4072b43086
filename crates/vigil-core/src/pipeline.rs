//! The moderation pipeline: normalize, classify, decide, seal.
//!
//! One `submit` call runs the whole chain and always encrypts: the
//! decision is policy metadata recorded alongside the envelope, never a
//! gate in front of encryption. `reveal` is the matching read path.
//!
//! The pipeline holds only immutable shared state (trained classifier,
//! rule set, keypair), all established during a single-threaded startup
//! phase. Concurrent `submit`/`reveal` calls need no coordination.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vigil_crypto::{open, seal, Envelope, KeyPair};

use crate::classifier::{ClassificationResult, ClassifierConfig, ContentClassifier, TrainingCorpus};
use crate::error::{PipelineError, StartupError};
use crate::fuzzy::{Decision, DecisionEngine};

/// Startup configuration for [`ModerationPipeline::bootstrap`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding `benign.txt`, `spam.txt`, `toxic.txt`.
    pub corpus_dir: PathBuf,
    /// Directory holding (or receiving) the PEM keypair.
    pub key_dir: PathBuf,
    /// Classifier training settings.
    pub classifier: ClassifierConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            key_dir: PathBuf::from("keys"),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Everything one `submit` call produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResult {
    /// The policy decision with audit scores.
    pub decision: Decision,
    /// The classifier output the decision was made from.
    pub classification: ClassificationResult,
    /// The sealed message content.
    pub envelope: Envelope,
}

/// Outcome of a `reveal` call.
///
/// An explicit marker instead of an error, so bulk listings can carry
/// undecryptable entries without aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealedContent {
    /// The recovered plaintext.
    Plaintext(String),
    /// The envelope could not be opened with this pipeline's key.
    Undecryptable,
}

impl RevealedContent {
    /// Returns the plaintext, if recovered.
    pub fn as_plaintext(&self) -> Option<&str> {
        match self {
            RevealedContent::Plaintext(text) => Some(text),
            RevealedContent::Undecryptable => None,
        }
    }

    /// True when the envelope could not be opened.
    pub fn is_undecryptable(&self) -> bool {
        matches!(self, RevealedContent::Undecryptable)
    }
}

/// Composes normalizer, classifier, decision engine, and envelope
/// cipher into one synchronous, lock-free call chain.
///
/// All parts are explicitly constructed, immutable, shared-ownership
/// handles; nothing here is ambient process state. In particular, which
/// keypair the pipeline seals under is the caller's choice: hold one
/// pipeline per recipient for per-recipient encryption.
#[derive(Debug)]
pub struct ModerationPipeline {
    classifier: Arc<ContentClassifier>,
    engine: Arc<DecisionEngine>,
    keys: Arc<KeyPair>,
}

impl ModerationPipeline {
    /// Assembles a pipeline from already-built parts.
    pub fn new(
        classifier: Arc<ContentClassifier>,
        engine: Arc<DecisionEngine>,
        keys: Arc<KeyPair>,
    ) -> Self {
        Self {
            classifier,
            engine,
            keys,
        }
    }

    /// Single-threaded startup: load corpora, train the classifier, and
    /// load or generate the keypair. Any failure here is fatal; the
    /// process must not serve without a trained model and intact keys.
    pub fn bootstrap(config: &PipelineConfig) -> Result<Self, StartupError> {
        let corpus = TrainingCorpus::load(&config.corpus_dir)?;
        let classifier = ContentClassifier::train(&corpus, config.classifier.clone())?;
        let keys = KeyPair::load_or_generate(&config.key_dir)?;

        info!("moderation pipeline ready");
        Ok(Self::new(
            Arc::new(classifier),
            Arc::new(DecisionEngine::with_defaults()),
            Arc::new(keys),
        ))
    }

    /// Runs the full chain on one message.
    ///
    /// The decision never gates encryption: blocked content is sealed
    /// and returned like anything else, with the decision attached for
    /// the caller to act on.
    pub fn submit(&self, plaintext: &str) -> Result<ModerationResult, PipelineError> {
        let classification = self.classifier.classify(plaintext);
        let decision = self
            .engine
            .decide(&classification, plaintext.chars().count());
        let envelope = seal(plaintext, self.keys.public())?;

        Ok(ModerationResult {
            decision,
            classification,
            envelope,
        })
    }

    /// Opens a stored envelope with this pipeline's private key.
    pub fn reveal(&self, envelope: &Envelope) -> RevealedContent {
        match open(envelope, self.keys.private()) {
            Ok(plaintext) => RevealedContent::Plaintext(plaintext),
            Err(err) => {
                warn!(error = %err, "envelope could not be opened");
                RevealedContent::Undecryptable
            }
        }
    }

    /// The classifier this pipeline runs.
    pub fn classifier(&self) -> &Arc<ContentClassifier> {
        &self.classifier
    }

    /// The decision engine this pipeline runs.
    pub fn engine(&self) -> &Arc<DecisionEngine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Label;
    use crate::fuzzy::{Action, ACCEPT_THRESHOLD};
    use std::sync::OnceLock;

    fn workspace_data_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data"))
    }

    fn pipeline() -> &'static ModerationPipeline {
        static PIPELINE: OnceLock<ModerationPipeline> = OnceLock::new();
        PIPELINE.get_or_init(|| {
            let key_dir = tempfile::tempdir().unwrap();
            let config = PipelineConfig {
                corpus_dir: workspace_data_dir(),
                key_dir: key_dir.path().to_path_buf(),
                classifier: ClassifierConfig::default(),
            };
            ModerationPipeline::bootstrap(&config).unwrap()
        })
    }

    #[test]
    fn submit_reveal_round_trips() {
        let p = pipeline();
        let result = p.submit("Hey, want to grab lunch?").unwrap();
        let revealed = p.reveal(&result.envelope);
        assert_eq!(revealed.as_plaintext(), Some("Hey, want to grab lunch?"));
    }

    #[test]
    fn shouty_spam_scenario() {
        let p = pipeline();
        let result = p.submit("FREE MONEY CLICK NOW!!!").unwrap();

        assert_eq!(result.classification.predicted, Label::Spam);
        assert!(
            result.classification.confidence > 0.7,
            "confidence was {}",
            result.classification.confidence
        );
        // The decision follows the acceptance threshold; the spam block
        // rule only prevails when spam and confidence jointly sit on
        // their high shoulders.
        assert_ne!(result.decision.action, Action::Flagged);
        if result.decision.action == Action::Allowed {
            assert!(result.decision.scores.blocked < ACCEPT_THRESHOLD);
        }
        assert!(result.decision.scores.blocked > result.decision.scores.flagged);
        assert!(result.decision.scores.allowed < 1e-9);
    }

    #[test]
    fn friendly_message_scenario() {
        let p = pipeline();
        let result = p.submit("Hey, want to grab lunch?").unwrap();

        assert_eq!(result.classification.predicted, Label::Benign);
        assert_eq!(result.decision.action, Action::Allowed);
        assert!(result.decision.scores.allowed > 0.0);
        assert!(result.decision.scores.blocked < result.decision.scores.allowed);
    }

    #[test]
    fn empty_message_gets_classifier_default() {
        let p = pipeline();
        let result = p.submit("").unwrap();

        assert_eq!(
            result.classification,
            ClassificationResult::empty_input_default()
        );
        assert_eq!(result.decision.action, Action::Allowed);

        // Still encrypted: round-trips to the empty string.
        assert_eq!(p.reveal(&result.envelope).as_plaintext(), Some(""));
    }

    #[test]
    fn blocked_content_is_still_encrypted() {
        let p = pipeline();
        let result = p.submit("you are a worthless idiot and everyone hates you").unwrap();
        // Whatever the decision, the envelope must open.
        assert_eq!(
            p.reveal(&result.envelope).as_plaintext(),
            Some("you are a worthless idiot and everyone hates you")
        );
    }

    #[test]
    fn corrupted_envelope_reveals_as_undecryptable() {
        let p = pipeline();
        let mut result = p.submit("soon to be corrupted").unwrap();
        result.envelope.wrapped_key[5] ^= 0x01;
        assert!(p.reveal(&result.envelope).is_undecryptable());
    }

    #[test]
    fn missing_corpus_dir_fails_bootstrap() {
        let key_dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            corpus_dir: PathBuf::from("/nonexistent/corpora"),
            key_dir: key_dir.path().to_path_buf(),
            classifier: ClassifierConfig::default(),
        };
        let err = ModerationPipeline::bootstrap(&config).unwrap_err();
        assert!(matches!(err, StartupError::CorpusMissing(_)));
    }

    #[test]
    fn concurrent_submissions_share_the_pipeline() {
        let p = pipeline();
        std::thread::scope(|scope| {
            for text in ["hello there", "free money now", "you idiot", ""] {
                scope.spawn(move || {
                    let result = p.submit(text).unwrap();
                    assert_eq!(p.reveal(&result.envelope).as_plaintext(), Some(text));
                });
            }
        });
    }

    #[test]
    fn submissions_are_deterministic_apart_from_the_envelope() {
        let p = pipeline();
        let first = p.submit("is this message spam or not").unwrap();
        let second = p.submit("is this message spam or not").unwrap();
        assert_eq!(first.classification, second.classification);
        assert_eq!(first.decision, second.decision);
        // Fresh symmetric key and iv per seal.
        assert_ne!(first.envelope.ciphertext, second.envelope.ciphertext);
    }
}
