use std::collections::HashMap;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use wayfarer_core::{ConversationContext, Role};

/// Owns every per-user conversation context. Entries are created lazily on
/// a user's first turn and live until explicitly purged. The lock makes
/// interleaved turns from different users safe; turns for the same user
/// must still be serialized by the caller for a coherent dialogue.
#[derive(Default)]
pub struct ContextStore {
    inner: RwLock<HashMap<String, ConversationContext>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, user_id: &str, f: impl FnOnce(&mut ConversationContext) -> R) -> R {
        let mut map = self.inner.write();
        let ctx = map.entry(user_id.to_string()).or_default();
        f(ctx)
    }

    pub fn record_turn(&self, user_id: &str, role: Role, text: &str, intent: Option<String>) {
        self.with(user_id, |ctx| ctx.push_turn(role, text, intent));
    }

    pub fn snapshot(&self, user_id: &str) -> Option<ConversationContext> {
        self.inner.read().get(user_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drop contexts whose most recent turn is older than `max_age`.
    /// Returns the number of contexts removed.
    pub fn purge_idle(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut map = self.inner.write();
        let before = map.len();
        map.retain(|_, ctx| ctx.last_turn_at().is_some_and(|at| at > cutoff));
        before - map.len()
    }
}
