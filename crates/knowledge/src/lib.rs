//! Static corpora for the engine: the intent training corpus and the
//! topical knowledge base. Both load once at startup from JSON files and
//! are read-only afterwards.

pub mod fuzzy;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use wayfarer_core::IntentDefinition;

pub use fuzzy::{closest_match, similarity};

/// Knowledge-base category holding the travel-hack facts.
pub const TRAVEL_HACKS: &str = "travel_hacks";

/// Cutoff for fuzzy packing-theme matching.
pub const THEME_MATCH_CUTOFF: f32 = 0.7;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("corpus defines no intents with training patterns")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CorpusFile {
    intents: Vec<IntentDefinition>,
}

/// The intent corpus: tag -> example utterances -> reply templates.
#[derive(Debug, Clone, Default)]
pub struct IntentCorpus {
    intents: Vec<IntentDefinition>,
    by_tag: HashMap<String, usize>,
}

impl IntentCorpus {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file: CorpusFile =
            serde_json::from_str(&raw).map_err(|source| CorpusError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let corpus = Self::from_definitions(file.intents)?;
        info!(
            intents = corpus.len(),
            examples = corpus.labeled_examples().count(),
            "intent corpus loaded"
        );
        Ok(corpus)
    }

    pub fn from_definitions(intents: Vec<IntentDefinition>) -> Result<Self, CorpusError> {
        if intents.iter().all(|def| def.patterns.is_empty()) {
            return Err(CorpusError::Empty);
        }

        let by_tag = intents
            .iter()
            .enumerate()
            .map(|(idx, def)| (def.tag.clone(), idx))
            .collect();

        Ok(Self { intents, by_tag })
    }

    pub fn get(&self, tag: &str) -> Option<&IntentDefinition> {
        self.by_tag.get(tag).map(|idx| &self.intents[*idx])
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentDefinition> {
        self.intents.iter()
    }

    /// Every (pattern, tag) pair, in corpus order.
    pub fn labeled_examples(&self) -> impl Iterator<Item = (&str, &str)> {
        self.intents.iter().flat_map(|def| {
            def.patterns
                .iter()
                .map(move |pattern| (pattern.as_str(), def.tag.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Topical facts and tips: a flat travel-hacks list plus packing
/// suggestions keyed by theme. Unknown categories are carried opaquely so
/// a richer knowledge file stays loadable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    travel_hacks: Vec<String>,
    #[serde(default)]
    packing_suggestions: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl KnowledgeBase {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let kb: Self = serde_json::from_str(&raw).map_err(|source| CorpusError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            hacks = kb.travel_hacks.len(),
            packing_themes = kb.packing_suggestions.len(),
            "knowledge base loaded"
        );
        Ok(kb)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn travel_hacks(&self) -> &[String] {
        &self.travel_hacks
    }

    pub fn packing_themes(&self) -> impl Iterator<Item = &str> {
        self.packing_suggestions.keys().map(String::as_str)
    }

    pub fn packing_for(&self, theme: &str) -> Option<&[String]> {
        self.packing_suggestions
            .get(theme)
            .map(Vec::as_slice)
    }

    /// Resolve a packing theme mentioned in an utterance: exact substring
    /// match first, then the closest fuzzy match over individual words.
    pub fn match_packing_theme(&self, text_lower: &str) -> Option<&str> {
        if let Some(theme) = self
            .packing_themes()
            .find(|theme| text_lower.contains(*theme))
        {
            return Some(theme);
        }

        text_lower.split_whitespace().find_map(|word| {
            closest_match(word, self.packing_themes(), THEME_MATCH_CUTOFF)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_kb() -> KnowledgeBase {
        serde_json::from_value(json!({
            "travel_hacks": ["Roll your clothes to save space."],
            "packing_suggestions": {
                "beach": ["sunscreen", "swimsuit", "flip-flops", "hat", "towel", "shades"],
                "ski": ["thermals", "goggles", "gloves"]
            },
            "visa_notes": {"india": "e-visa available"}
        }))
        .unwrap()
    }

    #[test]
    fn exact_theme_wins_over_fuzzy() {
        let kb = sample_kb();
        assert_eq!(
            kb.match_packing_theme("what to pack for the beach"),
            Some("beach")
        );
    }

    #[test]
    fn fuzzy_theme_match_catches_typos() {
        let kb = sample_kb();
        assert_eq!(
            kb.match_packing_theme("packing for a beech holiday"),
            Some("beach")
        );
        assert_eq!(kb.match_packing_theme("going to the moon"), None);
    }

    #[test]
    fn unknown_categories_are_preserved() {
        let kb = sample_kb();
        assert!(kb.extra.contains_key("visa_notes"));
    }

    #[test]
    fn corpus_rejects_patternless_definitions() {
        let result = IntentCorpus::from_definitions(vec![IntentDefinition {
            tag: "greeting".to_string(),
            patterns: vec![],
            responses: vec!["hi".to_string()],
        }]);
        assert!(matches!(result, Err(CorpusError::Empty)));
    }

    #[test]
    fn corpus_lookup_by_tag() {
        let corpus = IntentCorpus::from_definitions(vec![IntentDefinition {
            tag: "greeting".to_string(),
            patterns: vec!["hello".to_string()],
            responses: vec!["Hi!".to_string()],
        }])
        .unwrap();

        assert!(corpus.contains("greeting"));
        assert_eq!(corpus.labeled_examples().count(), 1);
        assert!(corpus.get("weather_check").is_none());
    }
}
