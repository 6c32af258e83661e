use std::path::PathBuf;

use wayfarer_core::{DialogueOutcome, DialogueState, HISTORY_CAP};
use wayfarer_engine::Brain;
use wayfarer_knowledge::{IntentCorpus, KnowledgeBase};

fn kb_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../kb")
}

fn brain() -> Brain {
    let corpus =
        IntentCorpus::from_path(kb_root().join("training_data.json")).expect("corpus loads");
    let kb =
        KnowledgeBase::from_path(kb_root().join("knowledge_base.json")).expect("kb loads");
    Brain::with_rng_seed(corpus, kb, 1)
}

#[test]
fn end_to_end_planning_flow() {
    let brain = brain();

    let first = brain.generate_response("u1", "plan a trip").unwrap();
    assert_eq!(first.reply_text(), "Where are you planning to go?");

    let second = brain.generate_response("u1", "to Goa").unwrap();
    assert!(second.reply_text().contains("Goa"));
    assert!(second.reply_text().contains("How long"));

    let third = brain.generate_response("u1", "for 5 days").unwrap();
    match third {
        DialogueOutcome::Action { params, .. } => {
            assert_eq!(params.trip_name, "Goa");
            assert_eq!(params.duration, "5 days");
        }
        DialogueOutcome::Text { .. } => panic!("expected a create_trip action"),
    }

    // flow reset: slots cleared, state back to idle
    let ctx = brain.context_snapshot("u1").unwrap();
    assert_eq!(ctx.state, DialogueState::Idle);
    assert!(ctx.slots.is_empty());
}

#[test]
fn restart_replaces_earlier_destination() {
    let brain = brain();

    let opening = brain.generate_response("u2", "Plan a trip to Goa").unwrap();
    assert!(opening.reply_text().contains("Goa"));

    // an explicit, confidently classified plan request restarts the flow
    let restart = brain
        .generate_response("u2", "plan a trip to Paris")
        .unwrap();
    assert!(restart.reply_text().contains("Paris"));

    let ctx = brain.context_snapshot("u2").unwrap();
    assert_eq!(ctx.slots.destination.as_deref(), Some("Paris"));
}

#[test]
fn interruption_defers_to_intent_handling_same_turn() {
    let brain = brain();

    brain.generate_response("u3", "Plan a trip to London").unwrap();

    // mid-flow topic change: the dialogue yields, the assembler answers,
    // and the earlier destination slot still flavors the reply
    let reply = brain
        .generate_response("u3", "What is the weather like?")
        .unwrap();
    assert!(reply.reply_text().contains("**London**"));
    assert!(!reply.reply_text().contains("How long"));

    let ctx = brain.context_snapshot("u3").unwrap();
    assert_eq!(ctx.state, DialogueState::Idle);
}

#[test]
fn low_confidence_turn_yields_no_response() {
    let brain = brain();
    assert!(brain
        .generate_response("u4", "qwerty zxcvb mnbvc")
        .is_none());
}

#[test]
fn tip_keyword_surfaces_a_travel_hack() {
    let brain = brain();
    let reply = brain
        .generate_response("u5", "what should i pack, any tips")
        .unwrap();
    assert!(reply.reply_text().starts_with("Travel hack:"));
}

#[test]
fn packing_query_appends_theme_essentials() {
    let brain = brain();
    let reply = brain
        .generate_response("u6", "What should I pack for my beach holiday")
        .unwrap();
    assert!(reply.reply_text().contains("**Beach essentials:**"));
}

#[test]
fn history_never_exceeds_the_cap() {
    let brain = brain();
    for i in 0..15 {
        brain.generate_response("u7", &format!("hello again number {i}"));
    }

    let ctx = brain.context_snapshot("u7").unwrap();
    assert!(ctx.history.len() <= HISTORY_CAP);
}
