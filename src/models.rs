use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::polarity::Polarity;

pub type ArticleId = u32;

/// A token of a parsed sentence: surface text, 1-based position, POS tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Word {
    text: String,
    id: u32,
    pos_tag: String,
}

impl Word {
    pub fn new(text: impl Into<String>, id: u32, pos_tag: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let pos_tag = pos_tag.into();
        if text.is_empty() || pos_tag.is_empty() {
            return Err(Error::validation("word text and POS tag may not be empty"));
        }
        if id == 0 {
            return Err(Error::validation(format!("word '{text}' has id 0, ids must be strictly positive")));
        }
        Ok(Self { text, id, pos_tag })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn pos_tag(&self) -> &str {
        &self.pos_tag
    }

    /// Same surface text at the same sentence position, regardless of tag.
    pub fn same_token(&self, other: &Word) -> bool {
        self.id == other.id && self.text == other.text
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Directed labeled edge `governor -> dependent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Dependency {
    relation: String,
    governor: Word,
    dependent: Word,
}

impl Dependency {
    pub fn new(relation: impl Into<String>, governor: Word, dependent: Word) -> Result<Self> {
        let relation = relation.into();
        if relation.is_empty() {
            return Err(Error::validation("dependency relation may not be empty"));
        }
        Ok(Self {
            relation,
            governor,
            dependent,
        })
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn governor(&self) -> &Word {
        &self.governor
    }

    pub fn dependent(&self) -> &Word {
        &self.dependent
    }
}

/// Canonical form: `relation(gov-govId,dep-depId)`.
impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}-{},{}-{})",
            self.relation, self.governor.text, self.governor.id, self.dependent.text, self.dependent.id
        )
    }
}

static DEPENDENCY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^()]+)\((.+)-(\d+)-([^,()\-]+),(.+)-(\d+)-([^,()\-]+)\)$")
        .expect("dependency pattern is valid")
});

/// Parses the tagged textual form `relation(gov-govId-govPos,dep-depId-depPos)`.
impl FromStr for Dependency {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let caps = DEPENDENCY_PATTERN
            .captures(raw.trim())
            .ok_or_else(|| Error::validation(format!("malformed dependency '{raw}'")))?;
        let id = |i: usize| -> Result<u32> {
            caps[i]
                .parse()
                .map_err(|_| Error::validation(format!("word id out of range in '{raw}'")))
        };
        let governor = Word::new(&caps[2], id(3)?, &caps[4])?;
        let dependent = Word::new(&caps[5], id(6)?, &caps[7])?;
        Dependency::new(&caps[1], governor, dependent)
    }
}

/// Weighted keyword cluster produced by the upstream topic model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    line_id: u32,
    weight: f64,
    keys: Vec<String>,
}

impl Topic {
    pub fn new(line_id: u32, weight: f64, keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::validation(format!("topic {line_id} has no keys")));
        }
        if keys.iter().any(|k| k.is_empty()) {
            return Err(Error::validation(format!("topic {line_id} has an empty key")));
        }
        Ok(Self { line_id, weight, keys })
    }

    pub fn line_id(&self) -> u32 {
        self.line_id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn has_key(&self, text: &str) -> bool {
        self.keys.iter().any(|k| k == text)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}/{}}}[{}]", self.line_id, self.weight, self.keys.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSentence {
    pub words: Vec<Word>,
    pub dependencies: Vec<Dependency>,
}

/// One article as delivered by the upstream parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedArticle {
    id: ArticleId,
    sentences: Vec<ParsedSentence>,
    nouns: Vec<String>,
}

impl ParsedArticle {
    pub fn new(id: ArticleId, sentences: Vec<ParsedSentence>, nouns: Vec<String>) -> Result<Self> {
        if sentences.is_empty() {
            return Err(Error::validation(format!("article {id} has no parsed sentences")));
        }
        Ok(Self { id, sentences, nouns })
    }

    pub fn id(&self) -> ArticleId {
        self.id
    }

    pub fn sentences(&self) -> &[ParsedSentence] {
        &self.sentences
    }

    pub fn nouns(&self) -> &[String] {
        &self.nouns
    }
}

/// A (topic word, polar word, polarity) triple anchored to a topic.
///
/// Equality, hashing and ordering ignore `topic`: the same word pair found
/// under two topics is a single opinion.
#[derive(Debug, Clone, Serialize)]
pub struct Opinion {
    topic: Topic,
    topic_word: Word,
    polar_word: Word,
    polarity: Polarity,
}

impl Opinion {
    pub fn new(topic: Topic, topic_word: Word, polar_word: Word, polarity: Polarity) -> Self {
        Self {
            topic,
            topic_word,
            polar_word,
            polarity,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn topic_word(&self) -> &Word {
        &self.topic_word
    }

    pub fn polar_word(&self) -> &Word {
        &self.polar_word
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    fn key(&self) -> (&Word, &Word, Polarity) {
        (&self.topic_word, &self.polar_word, self.polarity)
    }
}

impl PartialEq for Opinion {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Opinion {}

impl Hash for Opinion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Opinion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Opinion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Opinion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}-{},{}-{})",
            self.polarity, self.topic_word.text, self.topic_word.id, self.polar_word.text, self.polar_word.id
        )
    }
}
