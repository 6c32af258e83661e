//! Final reply composition for turns the dialogue flow did not claim:
//! confidence gating, keyword overrides, templated replies with contextual
//! augmentation from slots and the knowledge base.

use rand::rngs::StdRng;
use rand::Rng;
use wayfarer_core::{title_case, ClassificationResult};
use wayfarer_knowledge::{IntentCorpus, KnowledgeBase};

/// Below this the engine stays silent and lets the caller fall back to
/// other strategies.
const CONFIDENCE_FLOOR: f32 = 0.25;

/// Intent tags with slot-aware reply variants.
const WEATHER_CHECK: &str = "weather_check";
const BUDGET_HELP: &str = "budget_help";
const PACKING_HELP: &str = "packing_help";

pub(crate) fn assemble(
    cls: &ClassificationResult,
    text: &str,
    corpus: &IntentCorpus,
    kb: &KnowledgeBase,
    destination: Option<&str>,
    rng: &mut StdRng,
) -> Option<String> {
    if cls.confidence < CONFIDENCE_FLOOR {
        return None;
    }

    let lower = text.to_lowercase();

    // Keyword override: tips and hacks beat whatever the classifier said.
    if lower.contains("tip") || lower.contains("hack") {
        let hacks = kb.travel_hacks();
        if hacks.is_empty() {
            return None;
        }
        return Some(format!("Travel hack: {}", choose(rng, hacks)));
    }

    let tag = cls.intent.as_deref()?;
    let templates = &corpus.get(tag)?.responses;
    if templates.is_empty() {
        return None;
    }
    let base = choose(rng, templates).to_string();

    if tag == WEATHER_CHECK {
        if let Some(dest) = destination {
            return Some(format!(
                "I can't check real-time weather yet, but for **{dest}**, you should definitely pack layers!"
            ));
        }
    }

    if tag == BUDGET_HELP {
        if let Some(dest) = destination {
            return Some(format!("Planning a budget for **{dest}**? Smart move! {base}"));
        }
    }

    if tag == PACKING_HELP {
        if let Some(theme) = kb.match_packing_theme(&lower) {
            let items = kb
                .packing_for(theme)
                .unwrap_or_default()
                .iter()
                .take(5)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            return Some(format!(
                "{base}\n\n**{} essentials:** {items}, etc.",
                title_case(theme)
            ));
        }
        if let Some(dest) = destination {
            return Some(format!(
                "{base}\nFor **{dest}**, don't forget your travel documents!"
            ));
        }
    }

    Some(base)
}

fn choose<'a>(rng: &mut StdRng, items: &'a [String]) -> &'a str {
    &items[rng.random_range(0..items.len())]
}
