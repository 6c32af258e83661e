use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Intent tag that opens (or restarts) the trip-planning flow.
pub const PLAN_TRIP: &str = "plan_trip";

/// Recognized non-planning intents that may interrupt an active planning
/// flow when classified with sufficient confidence.
pub const INTERRUPT_INTENTS: &[&str] = &[
    "packing_help",
    "budget_help",
    "weather_check",
    "food_suggestion",
    "bot_identity",
];

/// One intent entry of the training corpus: example utterances plus the
/// canned reply templates the assembler picks from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub tag: String,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Idle,
    Planning,
}

/// Trip attributes accumulated across turns. Budget is optional and never
/// gates flow completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slots {
    pub destination: Option<String>,
    pub duration: Option<String>,
    pub budget: Option<String>,
}

impl Slots {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.destination.is_none() && self.duration.is_none() && self.budget.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub at: DateTime<Utc>,
    pub role: Role,
    pub text: String,
    pub intent: Option<String>,
}

/// Bound on per-user rolling history; oldest turns are evicted first.
pub const HISTORY_CAP: usize = 10;

/// Per-user dialogue state. Created lazily on a user's first turn and kept
/// for the process lifetime unless explicitly purged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    pub state: DialogueState,
    pub slots: Slots,
    pub last_intent: Option<String>,
    pub history: VecDeque<TurnRecord>,
}

impl ConversationContext {
    pub fn push_turn(&mut self, role: Role, text: &str, intent: Option<String>) {
        if role == Role::User {
            if let Some(tag) = &intent {
                self.last_intent = Some(tag.clone());
            }
        }

        self.history.push_back(TurnRecord {
            at: Utc::now(),
            role,
            text: text.to_string(),
            intent,
        });

        while self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
    }

    pub fn last_turn_at(&self) -> Option<DateTime<Utc>> {
        self.history.back().map(|turn| turn.at)
    }
}

/// Top-ranked intent and its posterior probability. `intent: None` with
/// confidence 0.0 is the universal "no answer" degradation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Option<String>,
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn none() -> Self {
        Self {
            intent: None,
            confidence: 0.0,
        }
    }

    pub fn intent_is(&self, tag: &str) -> bool {
        self.intent.as_deref() == Some(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateTrip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParams {
    pub trip_name: String,
    pub duration: String,
}

/// What a handled turn resolves to. The engine returns at most one of
/// these per turn; callers must match exhaustively and execute `Action`
/// payloads against their own systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogueOutcome {
    Text {
        text: String,
    },
    Action {
        text: String,
        action: ActionKind,
        params: ActionParams,
    },
}

impl DialogueOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn reply_text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Action { text, .. } => text,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action { .. })
    }
}
