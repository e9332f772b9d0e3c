use clap::ValueEnum;
use rust_stemmers::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the pipeline knows how to stem and tag.
///
/// Selected once at startup; everything language-dependent (stemming
/// algorithm, POS families) is dispatched through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[value(name = "fr")]
    French,
    #[value(name = "en")]
    English,
}

// French Treebank tagset
const VERBS_FR: &[&str] = &["V", "VINF", "VIMP", "VPP", "VPR", "VS"];
const NOUNS_FR: &[&str] = &["N", "NC", "NPP"];

// Penn Treebank tagset
const VERBS_EN: &[&str] = &["VB", "VBD", "VBG", "VBN", "VBP", "VBZ"];
const NOUNS_EN: &[&str] = &["NN", "NNS", "NNP", "NNPS"];

impl Language {
    pub fn short_name(self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }

    pub(crate) fn stemming_algorithm(self) -> Algorithm {
        match self {
            Language::French => Algorithm::French,
            Language::English => Algorithm::English,
        }
    }

    pub fn is_verb_tag(self, pos_tag: &str) -> bool {
        match self {
            Language::French => VERBS_FR.contains(&pos_tag),
            Language::English => VERBS_EN.contains(&pos_tag),
        }
    }

    pub fn is_noun_tag(self, pos_tag: &str) -> bool {
        match self {
            Language::French => NOUNS_FR.contains(&pos_tag),
            Language::English => NOUNS_EN.contains(&pos_tag),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::French => write!(f, "French"),
            Language::English => write!(f, "English"),
        }
    }
}
