//! The conversational engine: classifier + extractor + dialogue state
//! machine + response assembler behind one entry point. Callers hand in a
//! user id and raw text and get back at most one [`DialogueOutcome`];
//! `None` means "no answer here, fall back to your other strategies". The
//! engine never errors out of a turn.

mod assembler;
mod context;
mod dialogue;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use wayfarer_core::{normalize_text, ClassificationResult, ConversationContext, DialogueOutcome, Role};
use wayfarer_knowledge::{IntentCorpus, KnowledgeBase};
use wayfarer_ml::{IntentClassifier, TfidfClassifier, UntrainedClassifier};
use wayfarer_observability::{EngineMetrics, MetricsSnapshot};

pub use context::ContextStore;

pub const TRAINING_FILE: &str = "training_data.json";
pub const KNOWLEDGE_FILE: &str = "knowledge_base.json";

pub struct Brain {
    classifier: Arc<dyn IntentClassifier>,
    corpus: Arc<IntentCorpus>,
    kb: Arc<KnowledgeBase>,
    contexts: ContextStore,
    metrics: Arc<EngineMetrics>,
    rng: Mutex<StdRng>,
}

impl Brain {
    /// Train the classifier and assemble the engine. Training failure is
    /// logged and degrades every future classification to "no answer"
    /// instead of failing construction.
    pub fn new(corpus: IntentCorpus, kb: KnowledgeBase) -> Self {
        Self::build(corpus, kb, StdRng::from_os_rng())
    }

    /// Deterministic template and fact selection, for reproducible tests.
    pub fn with_rng_seed(corpus: IntentCorpus, kb: KnowledgeBase, seed: u64) -> Self {
        Self::build(corpus, kb, StdRng::seed_from_u64(seed))
    }

    /// Load both corpora from a data directory, degrading on any failure.
    pub fn from_kb_dir(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        let corpus = IntentCorpus::from_path(path.join(TRAINING_FILE)).unwrap_or_else(|err| {
            error!(%err, "training corpus unavailable, classifier will stay untrained");
            IntentCorpus::default()
        });

        let kb = KnowledgeBase::from_path(path.join(KNOWLEDGE_FILE)).unwrap_or_else(|err| {
            warn!(%err, "knowledge base unavailable, continuing without facts");
            KnowledgeBase::empty()
        });

        Self::new(corpus, kb)
    }

    fn build(corpus: IntentCorpus, kb: KnowledgeBase, rng: StdRng) -> Self {
        let classifier: Arc<dyn IntentClassifier> = match TfidfClassifier::train(&corpus) {
            Ok(model) => Arc::new(model),
            Err(err) => {
                error!(%err, "classifier training failed, degrading to untrained");
                Arc::new(UntrainedClassifier)
            }
        };

        Self {
            classifier,
            corpus: Arc::new(corpus),
            kb: Arc::new(kb),
            contexts: ContextStore::new(),
            metrics: EngineMetrics::shared(),
            rng: Mutex::new(rng),
        }
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text)
    }

    /// Handle one user turn. Runs to completion; no I/O.
    pub fn generate_response(&self, user_id: &str, text: &str) -> Option<DialogueOutcome> {
        let started = Instant::now();
        self.metrics.inc_turn();

        let normalized = normalize_text(text);
        let cls = self.classifier.classify(&normalized);
        info!(
            user_id,
            intent = cls.intent.as_deref().unwrap_or("-"),
            confidence = cls.confidence,
            "utterance classified"
        );

        self.contexts
            .record_turn(user_id, Role::User, &normalized, cls.intent.clone());

        let outcome = self
            .contexts
            .with(user_id, |ctx| dialogue::drive(ctx, &cls, &normalized))
            .or_else(|| {
                let destination = self
                    .contexts
                    .with(user_id, |ctx| ctx.slots.destination.clone());
                let mut rng = self.rng.lock();
                assembler::assemble(
                    &cls,
                    &normalized,
                    &self.corpus,
                    &self.kb,
                    destination.as_deref(),
                    &mut rng,
                )
                .map(DialogueOutcome::text)
            });

        match &outcome {
            Some(reply) => {
                if reply.is_action() {
                    self.metrics.inc_dialogue_action();
                }
                self.contexts
                    .record_turn(user_id, Role::Bot, reply.reply_text(), None);
            }
            None => self.metrics.inc_no_response(),
        }

        self.metrics.observe_latency(started.elapsed());
        outcome
    }

    /// Read-only copy of one user's dialogue state, for callers that
    /// surface it (dashboards, tests).
    pub fn context_snapshot(&self, user_id: &str) -> Option<ConversationContext> {
        self.contexts.snapshot(user_id)
    }

    pub fn active_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Evict contexts idle longer than `max_age`; returns how many.
    pub fn purge_idle(&self, max_age: chrono::Duration) -> usize {
        self.contexts.purge_idle(max_age)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wayfarer_core::IntentDefinition;

    fn brain() -> Brain {
        let corpus = IntentCorpus::from_definitions(vec![
            IntentDefinition {
                tag: "greeting".to_string(),
                patterns: vec!["hello".to_string(), "hey there".to_string()],
                responses: vec!["Hello! Ready to travel?".to_string()],
            },
            IntentDefinition {
                tag: "plan_trip".to_string(),
                patterns: vec!["plan a trip".to_string(), "organize my vacation".to_string()],
                responses: vec!["Let's plan something.".to_string()],
            },
        ])
        .unwrap();

        let kb = serde_json::from_value(json!({
            "travel_hacks": ["Carry an empty water bottle through security."],
            "packing_suggestions": {}
        }))
        .unwrap();

        Brain::with_rng_seed(corpus, kb, 42)
    }

    #[test]
    fn degraded_engine_stays_silent_but_alive() {
        let brain = Brain::from_kb_dir("definitely/not/a/real/dir");

        assert_eq!(brain.classify("hello"), ClassificationResult::none());
        assert!(brain.generate_response("u1", "plan a trip").is_none());
        assert_eq!(brain.metrics().no_response_total, 1);
    }

    #[test]
    fn turns_are_recorded_for_user_and_bot() {
        let brain = brain();
        let reply = brain.generate_response("u1", "plan a trip");
        assert!(reply.is_some());

        let ctx = brain.context_snapshot("u1").unwrap();
        assert_eq!(ctx.history.len(), 2);
        assert_eq!(ctx.history[0].role, Role::User);
        assert_eq!(ctx.history[1].role, Role::Bot);
    }

    #[test]
    fn metrics_count_actions_and_fallbacks() {
        let brain = brain();
        brain.generate_response("u1", "plan a trip");
        brain.generate_response("u1", "to Goa");
        let finale = brain.generate_response("u1", "for 5 days").unwrap();
        assert!(finale.is_action());

        let snapshot = brain.metrics();
        assert_eq!(snapshot.turns_total, 3);
        assert_eq!(snapshot.dialogue_actions_total, 1);
    }

    #[test]
    fn purge_leaves_fresh_contexts_alone() {
        let brain = brain();
        brain.generate_response("u1", "hello");
        assert_eq!(brain.active_contexts(), 1);
        assert_eq!(brain.purge_idle(chrono::Duration::hours(1)), 0);
        assert_eq!(brain.active_contexts(), 1);
    }
}
