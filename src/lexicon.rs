//! Sentiment lexicon: word -> polarity, loaded once from a TSV resource.
//!
//! Row format: `word \t isNegative \t isNeutral \t isPositive`, flags `0|1`.
//! The first flag set to `1` (negative, then neutral, then positive) decides
//! the polarity. Malformed rows are logged and skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::language::Language;
use crate::models::Word;
use crate::polarity::Polarity;
use crate::stemmer::WordStemmer;

const FLAG_ORDER: [Polarity; 3] = [Polarity::Negative, Polarity::Neutral, Polarity::Positive];

#[derive(Debug)]
pub struct SentimentLexicon {
    entries: HashMap<String, Polarity>,
    stemmer: WordStemmer,
}

impl SentimentLexicon {
    pub fn load(path: impl AsRef<Path>, language: Language) -> Result<Self> {
        let path = path.as_ref();
        let start = std::time::Instant::now();
        let file = File::open(path)
            .map_err(|e| Error::extraction(format!("opening lexicon {}", path.display()), e))?;

        let lexicon = Self::from_reader(BufReader::new(file), language)?;
        info!(
            "Lexicon loaded - path={}, language={}, entries={}, duration={:.2}s",
            path.display(),
            language,
            lexicon.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(lexicon)
    }

    pub fn from_reader<R: BufRead>(reader: R, language: Language) -> Result<Self> {
        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::extraction(format!("reading lexicon line {}", idx + 1), e))?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line) {
                Some((word, polarity)) => {
                    entries.insert(word, polarity);
                }
                None => skipped += 1,
            }
        }

        debug!("Lexicon rows parsed - entries={}, skipped={}", entries.len(), skipped);
        Ok(Self {
            entries,
            stemmer: WordStemmer::new(language),
        })
    }

    pub fn language(&self) -> Language {
        self.stemmer.language()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-match lookup of a surface form.
    pub fn lookup(&self, text: &str) -> Option<Polarity> {
        let key: String = text.nfc().collect();
        self.entries.get(&key).copied()
    }

    /// Looks up the stem of `word` first, then its raw text.
    pub fn stem_and_lookup(&self, word: &Word) -> Option<Polarity> {
        let stem = self.stemmer.stem(word.text());
        self.lookup(&stem).or_else(|| self.lookup(word.text()))
    }
}

fn parse_row(line: &str) -> Option<(String, Polarity)> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 4 {
        warn!("Malformed lexicon entry - fields={}, line={:?}", fields.len(), line);
        return None;
    }

    let word = fields[0].trim();
    if word.is_empty() {
        warn!("Malformed lexicon entry - empty word, line={:?}", line);
        return None;
    }

    for (flag, polarity) in fields[1..].iter().zip(FLAG_ORDER) {
        match flag.trim().parse::<u8>() {
            Ok(1) => return Some((word.nfc().collect(), polarity)),
            Ok(_) => {}
            Err(_) => {
                warn!("Malformed lexicon entry - bad flag {:?} for {}", flag, word);
                return None;
            }
        }
    }

    warn!("Inconsistent lexicon entry - no flag set for {}", word);
    None
}
