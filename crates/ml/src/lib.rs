//! Intent classification. The engine only sees the [`IntentClassifier`]
//! trait; any model with probabilistic output can sit behind it. The
//! default implementation is TF-IDF features over a multinomial logistic
//! regression, trained once at startup.

mod stopwords;
mod tfidf;

use wayfarer_core::ClassificationResult;

pub use stopwords::is_stop_word;
pub use tfidf::{TfidfClassifier, TrainError};

pub trait IntentClassifier: Send + Sync {
    /// Never fails: any internal problem degrades to `(None, 0.0)`.
    fn classify(&self, text: &str) -> ClassificationResult;
}

/// Installed when the corpus could not be loaded or trained. Keeps the
/// engine alive with every classification degraded to "no answer".
#[derive(Debug, Default)]
pub struct UntrainedClassifier;

impl IntentClassifier for UntrainedClassifier {
    fn classify(&self, _text: &str) -> ClassificationResult {
        ClassificationResult::none()
    }
}
