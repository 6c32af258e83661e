//! Pattern-driven slot extraction. Every function is pure and independently
//! callable on raw utterance text; the engine runs all of them on every turn
//! regardless of dialogue state (opportunistic slot filling).

use once_cell::sync::Lazy;
use regex::Regex;
use wayfarer_core::{title_case, Slots};

/// Prepositions that introduce a destination span.
const DESTINATION_TRIGGERS: &[&str] = &["to", "in", "visit", "at"];

/// Words that terminate a destination span.
const DESTINATION_STOPS: &[&str] = &["for", "with", "on", "from", "at", "to", "in"];

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:for\s+)?(\d+\s+(?:day|week|month)s?|weekend|fortnight)")
        .expect("valid duration pattern")
});

static BUDGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([$₹€£]\s*\d+(?:,\d+)?|\d+(?:,\d+)?\s*(?:dollars|rupees|usd|inr))")
        .expect("valid budget pattern")
});

/// Pull a destination out of free text.
///
/// Primary heuristic: the run of alphabetic words after the last
/// destination preposition, stopping before a following preposition or end
/// of string, title-cased. Fallback: a short utterance (at most two words)
/// that starts with an uppercase letter is taken verbatim, on the theory
/// that "Goa" typed alone is an answer, not a sentence.
pub fn destination(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    let trigger = words
        .iter()
        .enumerate()
        .rev()
        .find(|(idx, word)| {
            DESTINATION_TRIGGERS.contains(&word.to_lowercase().as_str()) && idx + 1 < words.len()
        })
        .map(|(idx, _)| idx);

    if let Some(idx) = trigger {
        let span: Vec<&str> = words[idx + 1..]
            .iter()
            .take_while(|word| {
                word.chars().all(|c| c.is_ascii_alphabetic())
                    && !DESTINATION_STOPS.contains(&word.to_lowercase().as_str())
            })
            .copied()
            .collect();

        if !span.is_empty() {
            return Some(title_case(&span.join(" ")));
        }
    }

    // A bare proper noun like "Goa" as the whole reply.
    let trimmed = text.trim();
    if words.len() <= 2
        && trimmed
            .chars()
            .next()
            .is_some_and(|first| first.is_uppercase())
    {
        return Some(trimmed.to_string());
    }

    None
}

/// Match a stay length: "for 5 days", "2 weeks", "weekend", "fortnight".
/// Returns the matched substring verbatim (without the leading "for").
pub fn duration(text: &str) -> Option<String> {
    DURATION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Match a budget: currency symbol plus digits, or digits plus a currency
/// word. Returns the matched substring verbatim.
pub fn budget(text: &str) -> Option<String> {
    BUDGET_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Run every extractor over one utterance.
pub fn extract_slots(text: &str) -> Slots {
    Slots {
        destination: destination(text),
        duration: duration(text),
        budget: budget(text),
    }
}
