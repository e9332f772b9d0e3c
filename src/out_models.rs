use serde::{Deserialize, Serialize};

use crate::evaluator::Evaluator;
use crate::language::Language;
use crate::models::{ArticleId, Opinion};
use crate::polarity::Polarity;

/// Contents of `opinions.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOpinions {
    pub generated_at: String, // RFC 3339
    pub language: Language,
    pub summary: BatchSummary,
    pub articles: Vec<ArticleOpinions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub least_positive: ArticleStat,
    pub most_positive: ArticleStat,
    pub biggest_opinion_count: ArticleStat,
    pub average_opinion_count: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArticleStat {
    pub article_id: ArticleId,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleOpinions {
    pub article_id: ArticleId,
    pub score: i32,
    /// Empty when no topic composition was supplied for the article.
    #[serde(default)]
    pub prominent_topics: Vec<u32>,
    pub opinions: Vec<OpinionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpinionRecord {
    pub topic_line_id: u32,
    pub topic_word: String,
    pub topic_word_id: u32,
    pub polar_word: String,
    pub polar_word_id: u32,
    pub polar_word_pos: String,
    pub polarity: Polarity,
}

impl From<&Opinion> for OpinionRecord {
    fn from(o: &Opinion) -> Self {
        Self {
            topic_line_id: o.topic().line_id(),
            topic_word: o.topic_word().text().to_string(),
            topic_word_id: o.topic_word().id(),
            polar_word: o.polar_word().text().to_string(),
            polar_word_id: o.polar_word().id(),
            polar_word_pos: o.polar_word().pos_tag().to_string(),
            polarity: o.polarity(),
        }
    }
}

impl BatchSummary {
    pub fn from_evaluator(eval: &Evaluator) -> crate::error::Result<Self> {
        let least = eval.least_positive_article();
        let most = eval.most_positive_article();
        let biggest = eval.biggest_opinion_count();
        Ok(Self {
            least_positive: ArticleStat {
                article_id: least,
                value: eval.article_score(least)? as i64,
            },
            most_positive: ArticleStat {
                article_id: most,
                value: eval.article_score(most)? as i64,
            },
            biggest_opinion_count: ArticleStat {
                article_id: biggest,
                value: eval.opinion_count(biggest)? as i64,
            },
            average_opinion_count: eval.average_opinion_count(),
        })
    }
}

impl ArticleOpinions {
    pub fn from_evaluator(
        eval: &Evaluator,
        article: ArticleId,
        prominent_topics: Vec<u32>,
    ) -> crate::error::Result<Self> {
        Ok(Self {
            article_id: article,
            score: eval.article_score(article)?,
            prominent_topics,
            opinions: eval.opinions(article)?.iter().map(OpinionRecord::from).collect(),
        })
    }
}
