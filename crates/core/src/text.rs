use unicode_segmentation::UnicodeSegmentation;

/// Collapse runs of whitespace into single spaces.
pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Lowercased word tokens, punctuation stripped. Single-character tokens
/// carry no signal for the classifier and are dropped.
pub fn tokenize(input: &str) -> Vec<String> {
    input
        .unicode_words()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > 1)
        .collect()
}

pub fn word_count(input: &str) -> usize {
    input.split_whitespace().count()
}

/// Uppercase the first letter of each word, lowercase the rest.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
