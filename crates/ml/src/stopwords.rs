use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Common English function words carrying no intent signal. Deliberately
/// compact: the corpus is small and over-aggressive filtering would strip
/// whole patterns down to nothing.
const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get",
    "had", "has", "have", "he", "her", "here", "him", "his", "how", "if", "in", "into", "is",
    "it", "its", "just", "let", "like", "me", "my", "no", "not", "of", "on", "or", "our", "out",
    "over", "she", "should", "so", "some", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "to", "up", "us", "was", "we", "were", "what", "when",
    "where", "which", "will", "with", "would", "you", "your",
];

static STOP_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(token: &str) -> bool {
    STOP_SET.contains(token)
}
