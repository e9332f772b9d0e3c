use rust_stemmers::Stemmer;
use unicode_normalization::UnicodeNormalization;

use crate::language::Language;

/// Snowball stemmer for one language.
///
/// Stemming is a pure function of its input: no buffer is shared between
/// calls, so a single instance can be used from anywhere without locking.
pub struct WordStemmer {
    language: Language,
    inner: Stemmer,
}

impl WordStemmer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            inner: Stemmer::create(language.stemming_algorithm()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Reduces a surface form to its root. Best effort: always returns
    /// something, possibly the input unchanged.
    pub fn stem(&self, word: &str) -> String {
        let normalized: String = word.nfc().collect();
        self.inner.stem(&normalized).into_owned()
    }
}

impl std::fmt::Debug for WordStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordStemmer").field("language", &self.language).finish()
    }
}
