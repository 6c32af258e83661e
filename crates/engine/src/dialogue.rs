//! The slot-filling state machine for the trip-planning flow. Evaluated
//! once per turn after classification; mutates the caller-supplied context
//! and either produces an outcome or yields `None` so generic intent
//! handling can take the turn.

use wayfarer_core::{
    title_case, word_count, ActionKind, ActionParams, ClassificationResult, ConversationContext,
    DialogueOutcome, DialogueState, Slots, INTERRUPT_INTENTS, PLAN_TRIP,
};

/// A repeated `plan_trip` above this confidence restarts the flow.
const RESTART_CONFIDENCE: f32 = 0.8;
/// A recognized non-planning intent above this confidence aborts the flow.
const INTERRUPT_CONFIDENCE: f32 = 0.6;
/// Replies this short are accepted verbatim as a destination when one was
/// just asked for.
const LOOSE_DESTINATION_MAX_WORDS: usize = 4;

pub(crate) fn drive(
    ctx: &mut ConversationContext,
    cls: &ClassificationResult,
    text: &str,
) -> Option<DialogueOutcome> {
    // Opportunistic slot filling: users may volunteer any slot before
    // being asked for it.
    let extracted = wayfarer_extract::extract_slots(text);
    apply(&mut ctx.slots, &extracted);

    let is_plan = cls.intent_is(PLAN_TRIP);
    if !is_plan && ctx.state != DialogueState::Planning {
        return None;
    }

    let fresh_start = ctx.state == DialogueState::Idle && is_plan;
    let restart =
        ctx.state == DialogueState::Planning && is_plan && cls.confidence > RESTART_CONFIDENCE;

    if fresh_start || restart {
        // An explicit (re)start wipes whatever the aborted flow had
        // accumulated; only this turn's extractions survive.
        ctx.slots.clear();
        apply(&mut ctx.slots, &extracted);
    } else if ctx.state == DialogueState::Planning
        && !is_plan
        && cls.confidence > INTERRUPT_CONFIDENCE
        && cls
            .intent
            .as_deref()
            .is_some_and(|tag| INTERRUPT_INTENTS.contains(&tag))
    {
        // The user changed topic mid-flow; hand the turn back so the
        // caller's intent handling can answer it. Slots survive so
        // follow-up questions stay contextual.
        ctx.state = DialogueState::Idle;
        return None;
    }

    ctx.state = DialogueState::Planning;

    if ctx.slots.destination.is_none() {
        if is_plan {
            return Some(DialogueOutcome::text("Where are you planning to go?"));
        }

        // We just asked for a destination, so a short reply is taken
        // verbatim even when no pattern matched. This misfires on short
        // off-topic replies; kept as-is, characterized by regression test.
        if extracted.destination.is_none() && word_count(text) <= LOOSE_DESTINATION_MAX_WORDS {
            let loose = title_case(text.trim());
            if !loose.is_empty() {
                ctx.slots.destination = Some(loose);
            }
        }

        return Some(match &ctx.slots.destination {
            Some(dest) => prompt_for_duration(dest),
            None => DialogueOutcome::text(
                "I didn't quite catch the destination. Where are you planning to go? (e.g., 'To Paris')",
            ),
        });
    }

    if ctx.slots.duration.is_none() {
        let dest = ctx.slots.destination.clone().unwrap_or_default();
        return Some(prompt_for_duration(&dest));
    }

    Some(complete(ctx))
}

fn apply(slots: &mut Slots, extracted: &Slots) {
    if let Some(dest) = &extracted.destination {
        slots.destination = Some(dest.clone());
    }
    if let Some(duration) = &extracted.duration {
        slots.duration = Some(duration.clone());
    }
    if let Some(budget) = &extracted.budget {
        slots.budget = Some(budget.clone());
    }
}

fn prompt_for_duration(dest: &str) -> DialogueOutcome {
    DialogueOutcome::text(format!(
        "Great! A trip to **{dest}**. How long are you planning to stay?"
    ))
}

/// Destination and duration are both known: emit the single completion
/// action and reset the flow.
fn complete(ctx: &mut ConversationContext) -> DialogueOutcome {
    let destination = ctx.slots.destination.clone().unwrap_or_default();
    let duration = ctx.slots.duration.clone().unwrap_or_default();

    let mut text = format!("I've noted that down: a {duration} trip to **{destination}**.");
    if let Some(budget) = &ctx.slots.budget {
        text.push_str(&format!(" With a budget of {budget}."));
    }
    text.push_str("\n\nI have enough info to create this trip.");

    ctx.state = DialogueState::Idle;
    ctx.slots.clear();

    DialogueOutcome::Action {
        text,
        action: ActionKind::CreateTrip,
        params: ActionParams {
            trip_name: destination,
            duration,
        },
    }
}
