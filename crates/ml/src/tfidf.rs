use std::collections::HashMap;

use thiserror::Error;
use tracing::info;
use wayfarer_core::{tokenize, ClassificationResult};
use wayfarer_knowledge::IntentCorpus;

use crate::stopwords::is_stop_word;
use crate::IntentClassifier;

// Unigram features with weak regularization: the corpus is tens of
// examples per intent, so n-grams would be hopelessly sparse.
const EPOCHS: usize = 600;
const LEARNING_RATE: f32 = 0.5;
const L2_PENALTY: f32 = 1e-4;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("no training examples with usable tokens")]
    NoExamples,
    #[error("need at least two intent classes, got {0}")]
    TooFewClasses(usize),
}

/// TF-IDF bag-of-terms feeding a softmax linear classifier. `classify`
/// returns the argmax tag and its posterior probability.
pub struct TfidfClassifier {
    vocab: HashMap<String, usize>,
    idf: Vec<f32>,
    labels: Vec<String>,
    // one row per label: vocab weights, bias last
    weights: Vec<Vec<f32>>,
}

impl TfidfClassifier {
    pub fn train(corpus: &IntentCorpus) -> Result<Self, TrainError> {
        let mut labels: Vec<String> = Vec::new();
        let mut docs: Vec<(Vec<String>, usize)> = Vec::new();

        for (pattern, tag) in corpus.labeled_examples() {
            let tokens = features(pattern);
            if tokens.is_empty() {
                continue;
            }

            let label_idx = match labels.iter().position(|label| label == tag) {
                Some(idx) => idx,
                None => {
                    labels.push(tag.to_string());
                    labels.len() - 1
                }
            };
            docs.push((tokens, label_idx));
        }

        if docs.is_empty() {
            return Err(TrainError::NoExamples);
        }
        if labels.len() < 2 {
            return Err(TrainError::TooFewClasses(labels.len()));
        }

        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();
        for (tokens, _) in &docs {
            let mut seen: Vec<usize> = Vec::new();
            for token in tokens {
                let idx = *vocab.entry(token.clone()).or_insert_with(|| {
                    doc_freq.push(0);
                    doc_freq.len() - 1
                });
                if !seen.contains(&idx) {
                    seen.push(idx);
                    doc_freq[idx] += 1;
                }
            }
        }

        let n_docs = docs.len() as f32;
        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|df| ((1.0 + n_docs) / (1.0 + *df as f32)).ln() + 1.0)
            .collect();

        let rows: Vec<(Vec<(usize, f32)>, usize)> = docs
            .iter()
            .map(|(tokens, label)| (vectorize_tokens(tokens, &vocab, &idf), *label))
            .collect();

        let weights = fit_softmax(&rows, labels.len(), vocab.len());

        info!(
            examples = rows.len(),
            intents = labels.len(),
            vocabulary = vocab.len(),
            "intent classifier trained"
        );

        Ok(Self {
            vocab,
            idf,
            labels,
            weights,
        })
    }

    fn vectorize(&self, text: &str) -> Vec<(usize, f32)> {
        vectorize_tokens(&features(text), &self.vocab, &self.idf)
    }
}

impl IntentClassifier for TfidfClassifier {
    fn classify(&self, text: &str) -> ClassificationResult {
        let row = self.vectorize(text);
        if row.is_empty() {
            // nothing in vocabulary, no posterior to speak of
            return ClassificationResult::none();
        }

        let probs = softmax(&logits(&self.weights, &row));
        if probs.iter().any(|p| !p.is_finite()) {
            return ClassificationResult::none();
        }

        let (best, confidence) = probs
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |(bi, bp), (i, p)| {
                if *p > bp {
                    (i, *p)
                } else {
                    (bi, bp)
                }
            });

        ClassificationResult {
            intent: Some(self.labels[best].clone()),
            confidence,
        }
    }
}

fn features(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|token| !is_stop_word(token))
        .collect()
}

/// Sparse TF-IDF row, L2-normalized. Out-of-vocabulary tokens are dropped.
fn vectorize_tokens(
    tokens: &[String],
    vocab: &HashMap<String, usize>,
    idf: &[f32],
) -> Vec<(usize, f32)> {
    let mut counts: HashMap<usize, f32> = HashMap::new();
    for token in tokens {
        if let Some(idx) = vocab.get(token) {
            *counts.entry(*idx).or_insert(0.0) += 1.0;
        }
    }

    let mut row: Vec<(usize, f32)> = counts
        .into_iter()
        .map(|(idx, tf)| (idx, tf * idf[idx]))
        .collect();
    row.sort_by_key(|(idx, _)| *idx);

    let norm = row.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, value) in &mut row {
            *value /= norm;
        }
    }
    row
}

/// Full-batch gradient descent on multinomial cross-entropy with a small
/// L2 penalty (bias term excluded from the penalty).
fn fit_softmax(
    rows: &[(Vec<(usize, f32)>, usize)],
    n_labels: usize,
    n_features: usize,
) -> Vec<Vec<f32>> {
    let mut weights = vec![vec![0.0_f32; n_features + 1]; n_labels];
    let n = rows.len() as f32;

    for _ in 0..EPOCHS {
        let mut grads = vec![vec![0.0_f32; n_features + 1]; n_labels];

        for (row, label) in rows {
            let probs = softmax(&logits(&weights, row));
            for (class, prob) in probs.iter().enumerate() {
                let residual = prob - if class == *label { 1.0 } else { 0.0 };
                for (idx, value) in row {
                    grads[class][*idx] += residual * value;
                }
                grads[class][n_features] += residual;
            }
        }

        for (class, grad) in grads.iter().enumerate() {
            for (idx, g) in grad.iter().enumerate() {
                let penalty = if idx < n_features {
                    L2_PENALTY * weights[class][idx]
                } else {
                    0.0
                };
                weights[class][idx] -= LEARNING_RATE * (g / n + penalty);
            }
        }
    }

    weights
}

fn logits(weights: &[Vec<f32>], row: &[(usize, f32)]) -> Vec<f32> {
    weights
        .iter()
        .map(|w| {
            let bias = w[w.len() - 1];
            row.iter().map(|(idx, value)| w[*idx] * value).sum::<f32>() + bias
        })
        .collect()
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::MIN, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::IntentDefinition;

    fn tiny_corpus() -> IntentCorpus {
        let defs = vec![
            IntentDefinition {
                tag: "greeting".to_string(),
                patterns: vec![
                    "hello".to_string(),
                    "hey there".to_string(),
                    "hello bot".to_string(),
                ],
                responses: vec!["Hi!".to_string()],
            },
            IntentDefinition {
                tag: "weather_check".to_string(),
                patterns: vec![
                    "how is the weather".to_string(),
                    "weather forecast please".to_string(),
                    "will it rain".to_string(),
                ],
                responses: vec!["No idea.".to_string()],
            },
        ];
        IntentCorpus::from_definitions(defs).unwrap()
    }

    #[test]
    fn recalls_training_patterns() {
        let corpus = tiny_corpus();
        let clf = TfidfClassifier::train(&corpus).unwrap();
        for (pattern, tag) in corpus.labeled_examples() {
            let result = clf.classify(pattern);
            assert_eq!(result.intent.as_deref(), Some(tag), "pattern: {pattern}");
            assert!(result.confidence >= 0.25, "pattern: {pattern}");
        }
    }

    #[test]
    fn out_of_vocabulary_text_degrades_to_none() {
        let clf = TfidfClassifier::train(&tiny_corpus()).unwrap();
        assert_eq!(clf.classify("zyzzx qwerty"), ClassificationResult::none());
        assert_eq!(clf.classify(""), ClassificationResult::none());
        assert_eq!(clf.classify("   "), ClassificationResult::none());
    }

    #[test]
    fn single_class_corpus_is_rejected() {
        let corpus = IntentCorpus::from_definitions(vec![IntentDefinition {
            tag: "greeting".to_string(),
            patterns: vec!["hello".to_string()],
            responses: vec![],
        }])
        .unwrap();

        assert!(matches!(
            TfidfClassifier::train(&corpus),
            Err(TrainError::TooFewClasses(1))
        ));
    }
}
