//! Topic-anchored opinion extraction over parsed sentences.

use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::chain::{all_chains_from_first, Chain};
use crate::error::{Error, Result};
use crate::lexicon::SentimentLexicon;
use crate::models::{Dependency, Opinion, ParsedArticle, ParsedSentence, Topic};
use crate::resolver::resolve_polarity;

/// Extracts opinions using a lexicon built once at startup.
///
/// Extraction is a pure function of the article and the topics; the
/// extractor only borrows the lexicon.
#[derive(Debug, Clone, Copy)]
pub struct OpinionExtractor<'a> {
    lexicon: &'a SentimentLexicon,
}

impl<'a> OpinionExtractor<'a> {
    pub fn new(lexicon: &'a SentimentLexicon) -> Self {
        Self { lexicon }
    }

    pub fn extract_opinions(&self, article: &ParsedArticle, topics: &[Topic]) -> Result<BTreeSet<Opinion>> {
        if topics.is_empty() {
            return Err(Error::validation("topics are needed to extract opinions"));
        }

        let mut opinions = BTreeSet::new();
        for sentence in article.sentences() {
            opinions.extend(self.extract_from_sentence(sentence, topics));
        }

        debug!(
            "Opinions extracted - article={}, sentences={}, opinions={}",
            article.id(),
            article.sentences().len(),
            opinions.len()
        );
        Ok(opinions)
    }

    fn extract_from_sentence(&self, sentence: &ParsedSentence, topics: &[Topic]) -> BTreeSet<Opinion> {
        let mut opinions = BTreeSet::new();
        for dep in &sentence.dependencies {
            for topic in topics {
                self.analyze_dependency(dep, &sentence.dependencies, topic, &mut opinions);
            }
        }
        opinions
    }

    fn analyze_dependency(
        &self,
        dep: &Dependency,
        all_deps: &[Dependency],
        topic: &Topic,
        opinions: &mut BTreeSet<Opinion>,
    ) {
        let (topic_word, other_word) = if topic.has_key(dep.governor().text()) {
            (dep.governor(), dep.dependent())
        } else if topic.has_key(dep.dependent().text()) {
            (dep.dependent(), dep.governor())
        } else {
            return;
        };

        // chains are only explored from dependencies that are themselves polar
        let Some(raw) = self.lexicon.stem_and_lookup(other_word) else {
            return;
        };

        if topic_word != other_word {
            let polarity = resolve_polarity(self.lexicon, other_word, raw, topic_word);
            trace!("Direct opinion - dep={}, topic={}, polarity={}", dep, topic.line_id(), polarity);
            opinions.insert(Opinion::new(topic.clone(), topic_word.clone(), other_word.clone(), polarity));
        }

        for chain in all_chains_from_first(dep, all_deps) {
            if let Some(opinion) = self.analyze_chain(&chain, topic) {
                opinions.insert(opinion);
            }
        }
    }

    /// Treats the chain as one long edge from its first governor to its last
    /// dependent. The raw lexicon polarity is used as is.
    fn analyze_chain(&self, chain: &Chain, topic: &Topic) -> Option<Opinion> {
        let topic_word = chain.first().governor();
        let polar_word = chain.last().dependent();
        if topic_word == polar_word {
            return None;
        }

        let polarity = self.lexicon.stem_and_lookup(polar_word)?;
        trace!(
            "Chain opinion - chain={}, type={}, edges={}, polarity={}",
            chain,
            chain.chain_type(),
            chain.len(),
            polarity
        );
        Some(Opinion::new(topic.clone(), topic_word.clone(), polar_word.clone(), polarity))
    }
}
