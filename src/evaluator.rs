//! Batch statistics over per-article opinion sets.

use once_cell::unsync::OnceCell;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ArticleId, Opinion};

/// Accumulates `(article, opinions)` pairs before freezing them into an
/// [`Evaluator`].
#[derive(Debug, Default)]
pub struct EvaluatorBuilder {
    opinions: BTreeMap<ArticleId, BTreeSet<Opinion>>,
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a possibly empty opinion set; a second call for the same
    /// article replaces the first.
    pub fn add_opinions(&mut self, article: ArticleId, opinions: BTreeSet<Opinion>) -> &mut Self {
        self.opinions.insert(article, opinions);
        self
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.opinions.len()
    }

    pub fn build(self) -> Result<Evaluator> {
        Evaluator::new(self.opinions)
    }
}

/// Frozen per-article opinion sets with precomputed scores. Extremes and the
/// average are computed on first access and memoized.
#[derive(Debug)]
pub struct Evaluator {
    opinions: BTreeMap<ArticleId, BTreeSet<Opinion>>,
    scores: BTreeMap<ArticleId, i32>,
    first: ArticleId,
    least_positive: OnceCell<ArticleId>,
    most_positive: OnceCell<ArticleId>,
    biggest_opinion_count: OnceCell<ArticleId>,
    average_opinion_count: OnceCell<f64>,
}

impl Evaluator {
    fn new(opinions: BTreeMap<ArticleId, BTreeSet<Opinion>>) -> Result<Self> {
        let first = *opinions
            .keys()
            .next()
            .ok_or_else(|| Error::Statistics("add articles and their opinions before building".into()))?;

        let scores: BTreeMap<ArticleId, i32> = opinions
            .iter()
            .map(|(id, set)| (*id, opinion_set_score(set)))
            .collect();
        debug!("Evaluator built - articles={}", opinions.len());

        Ok(Self {
            opinions,
            scores,
            first,
            least_positive: OnceCell::new(),
            most_positive: OnceCell::new(),
            biggest_opinion_count: OnceCell::new(),
            average_opinion_count: OnceCell::new(),
        })
    }

    pub fn articles(&self) -> impl Iterator<Item = ArticleId> + '_ {
        self.opinions.keys().copied()
    }

    pub fn opinions(&self, article: ArticleId) -> Result<&BTreeSet<Opinion>> {
        self.opinions.get(&article).ok_or(Error::UnknownArticle(article))
    }

    /// Sum of the polarity scores of the article's opinions.
    pub fn article_score(&self, article: ArticleId) -> Result<i32> {
        self.scores.get(&article).copied().ok_or(Error::UnknownArticle(article))
    }

    pub fn opinion_count(&self, article: ArticleId) -> Result<usize> {
        self.opinions(article).map(BTreeSet::len)
    }

    pub fn least_positive_article(&self) -> ArticleId {
        *self.least_positive.get_or_init(|| {
            pick(self.scores.iter().map(|(id, s)| (*id, *s)), Ordering::Less).unwrap_or(self.first)
        })
    }

    pub fn most_positive_article(&self) -> ArticleId {
        *self.most_positive.get_or_init(|| {
            pick(self.scores.iter().map(|(id, s)| (*id, *s)), Ordering::Greater).unwrap_or(self.first)
        })
    }

    pub fn biggest_opinion_count(&self) -> ArticleId {
        *self.biggest_opinion_count.get_or_init(|| {
            pick(self.opinions.iter().map(|(id, set)| (*id, set.len())), Ordering::Greater).unwrap_or(self.first)
        })
    }

    pub fn average_opinion_count(&self) -> f64 {
        *self
            .average_opinion_count
            .get_or_init(|| mean_opinion_count(&self.opinions))
    }
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let least = self.least_positive_article();
        let most = self.most_positive_article();
        let biggest = self.biggest_opinion_count();

        writeln!(f, "========= Statistics for this batch =========")?;
        writeln!(f, "Least positive article:\t{} ({})", least, self.scores[&least])?;
        writeln!(f, "Most positive article:\t{} ({})", most, self.scores[&most])?;
        writeln!(f, "Biggest amount of opinions:\t{} ({})", biggest, self.opinions[&biggest].len())?;
        writeln!(f, "Average number of extracted opinions:\t{:.2}", self.average_opinion_count())
    }
}

pub fn opinion_set_score(opinions: &BTreeSet<Opinion>) -> i32 {
    opinions.iter().map(|o| o.polarity().score()).sum()
}

/// Mean opinion-set cardinality; NaN when nothing was registered.
pub fn mean_opinion_count(opinions: &BTreeMap<ArticleId, BTreeSet<Opinion>>) -> f64 {
    if opinions.is_empty() {
        return f64::NAN;
    }
    let total: usize = opinions.values().map(BTreeSet::len).sum();
    total as f64 / opinions.len() as f64
}

/// First entry whose value compares `prefer` against every earlier best;
/// ties keep the earlier entry.
fn pick<V: Ord>(entries: impl Iterator<Item = (ArticleId, V)>, prefer: Ordering) -> Option<ArticleId> {
    entries
        .reduce(|best, cand| if cand.1.cmp(&best.1) == prefer { cand } else { best })
        .map(|(id, _)| id)
}
