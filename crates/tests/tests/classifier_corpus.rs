use std::path::PathBuf;

use wayfarer_knowledge::IntentCorpus;
use wayfarer_ml::{IntentClassifier, TfidfClassifier};

fn corpus() -> IntentCorpus {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../kb/training_data.json");
    IntentCorpus::from_path(path).expect("corpus loads")
}

#[test]
fn every_training_pattern_recalls_its_own_tag() {
    let corpus = corpus();
    let clf = TfidfClassifier::train(&corpus).expect("training succeeds");

    for (pattern, tag) in corpus.labeled_examples() {
        let result = clf.classify(pattern);
        assert_eq!(
            result.intent.as_deref(),
            Some(tag),
            "pattern misclassified: {pattern}"
        );
        assert!(
            result.confidence >= 0.25,
            "confidence floor broken for: {pattern} ({})",
            result.confidence
        );
    }
}

#[test]
fn dialogue_gates_are_met_on_canonical_utterances() {
    let clf = TfidfClassifier::train(&corpus()).expect("training succeeds");

    // restart gate: an explicit plan request must clear 0.8
    let plan = clf.classify("Plan a trip to Paris");
    assert_eq!(plan.intent.as_deref(), Some("plan_trip"));
    assert!(plan.confidence > 0.8, "got {}", plan.confidence);

    // interruption gate: a topic change must clear 0.6
    let weather = clf.classify("What is the weather like?");
    assert_eq!(weather.intent.as_deref(), Some("weather_check"));
    assert!(weather.confidence > 0.6, "got {}", weather.confidence);
}

#[test]
fn slot_answers_stay_unclassified() {
    // short mid-flow answers are mostly out-of-vocabulary and must not be
    // mistaken for a confident topic change
    let clf = TfidfClassifier::train(&corpus()).expect("training succeeds");

    for answer in ["to Goa", "for 5 days", "Goa", "$500"] {
        let result = clf.classify(answer);
        assert_eq!(result.intent, None, "answer: {answer}");
        assert_eq!(result.confidence, 0.0);
    }
}
