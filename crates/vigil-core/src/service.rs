//! Message send/history flows on top of the pipeline.
//!
//! Persistence and delivery live behind the [`MessageStore`] and
//! [`ChannelNotifier`] traits so the core stays free of any concrete
//! database or transport.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use vigil_crypto::Envelope;

use crate::fuzzy::Action;
use crate::pipeline::{ModerationPipeline, RevealedContent};
use crate::PipelineError;

/// Errors surfaced by the message service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The moderation pipeline failed on the message.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The backing store rejected the operation.
    #[error("message store error: {0}")]
    Store(#[source] anyhow::Error),
}

/// A stored message: sealed content plus moderation metadata. The
/// plaintext never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Unique message id.
    pub id: Uuid,
    /// Who sent the message.
    pub sender_id: String,
    /// Who it is addressed to.
    pub recipient_id: String,
    /// The sealed message content.
    pub envelope: Envelope,
    /// The moderation action taken.
    pub status: Action,
    /// Defuzzified score behind `status`.
    pub decision_score: f64,
    /// Classifier confidence at send time.
    pub classifier_confidence: f64,
    /// When the message was accepted.
    pub created_at: DateTime<Utc>,
}

/// A history entry with the content opened for the reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptedMessage {
    /// Unique message id.
    pub id: Uuid,
    /// Who sent the message.
    pub sender_id: String,
    /// Who it is addressed to.
    pub recipient_id: String,
    /// The recovered plaintext.
    pub content: String,
    /// The moderation action taken at send time.
    pub status: Action,
    /// When the message was accepted.
    pub created_at: DateTime<Utc>,
}

/// Persistence seam for message records.
pub trait MessageStore: Send + Sync {
    /// Persists one record.
    fn save(&self, record: &MessageRecord) -> anyhow::Result<()>;

    /// Returns the records exchanged between two users, oldest first.
    fn conversation(&self, user_id: &str, partner_id: &str) -> anyhow::Result<Vec<MessageRecord>>;
}

/// Delivery seam for notifying recipients of new messages.
///
/// Delivery is best-effort; implementations must not fail the send.
pub trait ChannelNotifier: Send + Sync {
    /// Announces a stored message to its recipient.
    fn notify(&self, recipient_id: &str, record: &MessageRecord);
}

/// Sends and lists messages: moderate, seal, persist, notify.
pub struct MessageService {
    pipeline: Arc<ModerationPipeline>,
    store: Arc<dyn MessageStore>,
    notifier: Arc<dyn ChannelNotifier>,
}

impl MessageService {
    /// Builds a service over the given pipeline and seams.
    pub fn new(
        pipeline: Arc<ModerationPipeline>,
        store: Arc<dyn MessageStore>,
        notifier: Arc<dyn ChannelNotifier>,
    ) -> Self {
        Self {
            pipeline,
            store,
            notifier,
        }
    }

    /// Accepts one message: runs the pipeline, persists the sealed
    /// record with its moderation metadata, then notifies the
    /// recipient. Every message is stored, whatever the decision;
    /// the status tells readers how to treat it.
    pub fn send(
        &self,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
    ) -> Result<MessageRecord, ServiceError> {
        let result = self.pipeline.submit(content)?;
        let record = MessageRecord {
            id: Uuid::new_v4(),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            envelope: result.envelope,
            status: result.decision.action,
            decision_score: result.decision.score,
            classifier_confidence: result.classification.confidence,
            created_at: Utc::now(),
        };

        self.store.save(&record).map_err(ServiceError::Store)?;
        self.notifier.notify(recipient_id, &record);

        info!(
            id = %record.id,
            status = record.status.name(),
            score = record.decision_score,
            "message accepted"
        );
        Ok(record)
    }

    /// Returns the conversation between two users with each envelope
    /// opened. Records that no longer decrypt are skipped rather than
    /// failing the whole listing.
    pub fn history(
        &self,
        user_id: &str,
        partner_id: &str,
    ) -> Result<Vec<DecryptedMessage>, ServiceError> {
        let records = self
            .store
            .conversation(user_id, partner_id)
            .map_err(ServiceError::Store)?;

        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            match self.pipeline.reveal(&record.envelope) {
                RevealedContent::Plaintext(content) => messages.push(DecryptedMessage {
                    id: record.id,
                    sender_id: record.sender_id,
                    recipient_id: record.recipient_id,
                    content,
                    status: record.status,
                    created_at: record.created_at,
                }),
                RevealedContent::Undecryptable => {
                    warn!(id = %record.id, "skipping undecryptable message");
                }
            }
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierConfig, ContentClassifier, TrainingCorpus};
    use crate::fuzzy::DecisionEngine;
    use std::path::Path;
    use std::sync::Mutex;
    use vigil_crypto::KeyPair;

    #[derive(Default)]
    struct InMemoryStore {
        records: Mutex<Vec<MessageRecord>>,
    }

    impl MessageStore for InMemoryStore {
        fn save(&self, record: &MessageRecord) -> anyhow::Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn conversation(
            &self,
            user_id: &str,
            partner_id: &str,
        ) -> anyhow::Result<Vec<MessageRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| {
                    (r.sender_id == user_id && r.recipient_id == partner_id)
                        || (r.sender_id == partner_id && r.recipient_id == user_id)
                })
                .cloned()
                .collect())
        }
    }

    struct FailingStore;

    impl MessageStore for FailingStore {
        fn save(&self, _record: &MessageRecord) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }

        fn conversation(&self, _: &str, _: &str) -> anyhow::Result<Vec<MessageRecord>> {
            anyhow::bail!("disk full")
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        deliveries: Mutex<Vec<(String, Uuid)>>,
    }

    impl ChannelNotifier for RecordingNotifier {
        fn notify(&self, recipient_id: &str, record: &MessageRecord) {
            self.deliveries
                .lock()
                .unwrap()
                .push((recipient_id.to_string(), record.id));
        }
    }

    fn pipeline() -> Arc<ModerationPipeline> {
        let corpus = TrainingCorpus::load(Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../data"
        )))
        .unwrap();
        let classifier =
            ContentClassifier::train(&corpus, ClassifierConfig::default()).unwrap();
        Arc::new(ModerationPipeline::new(
            Arc::new(classifier),
            Arc::new(DecisionEngine::with_defaults()),
            Arc::new(KeyPair::generate().unwrap()),
        ))
    }

    fn service_with(
        store: Arc<dyn MessageStore>,
        notifier: Arc<dyn ChannelNotifier>,
    ) -> MessageService {
        MessageService::new(pipeline(), store, notifier)
    }

    #[test]
    fn send_persists_and_notifies() {
        let store = Arc::new(InMemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = service_with(store.clone(), notifier.clone());

        let record = service.send("alice", "bob", "see you at the match tonight").unwrap();

        let stored = store.records.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, record.id);
        assert_eq!(stored[0].sender_id, "alice");

        let delivered = notifier.deliveries.lock().unwrap();
        assert_eq!(delivered.as_slice(), &[("bob".to_string(), record.id)]);
    }

    #[test]
    fn stored_record_carries_no_plaintext() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone(), Arc::new(RecordingNotifier::default()));

        service.send("alice", "bob", "a private remark").unwrap();

        let stored = store.records.lock().unwrap();
        let json = serde_json::to_string(&stored[0]).unwrap();
        assert!(!json.contains("a private remark"));
    }

    #[test]
    fn history_returns_decrypted_conversation() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone(), Arc::new(RecordingNotifier::default()));

        service.send("alice", "bob", "first").unwrap();
        service.send("bob", "alice", "second").unwrap();
        service.send("alice", "carol", "unrelated").unwrap();

        let history = service.history("alice", "bob").unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[test]
    fn history_skips_undecryptable_records() {
        let store = Arc::new(InMemoryStore::default());
        let service = service_with(store.clone(), Arc::new(RecordingNotifier::default()));

        service.send("alice", "bob", "keep me").unwrap();
        service.send("alice", "bob", "corrupt me").unwrap();

        // Flip a ciphertext byte in the second record.
        store.records.lock().unwrap()[1].envelope.ciphertext[0] ^= 0x01;

        let history = service.history("alice", "bob").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "keep me");
    }

    #[test]
    fn store_failure_surfaces_as_service_error() {
        let service = service_with(Arc::new(FailingStore), Arc::new(RecordingNotifier::default()));

        let err = service.send("alice", "bob", "hi").unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));

        let err = service.history("alice", "bob").unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }
}
