//! Error types shared by the opinion-mining core.
//!
//! Dictionary misses are not errors: lookups return `Option` and a miss simply
//! drives a skip in the extractor.

use thiserror::Error;

use crate::models::ArticleId;

/// Result alias for the opinion-mining core.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed upstream failure carried by [`Error::Extraction`].
pub type UpstreamError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be constructed because one of its invariants does not hold.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Failure coming from an upstream collaborator (I/O, parser output, topic model output).
    #[error("extraction failed while {what}: {source}")]
    Extraction {
        what: String,
        #[source]
        source: UpstreamError,
    },

    /// Aggregate statistics requested before anything was accumulated.
    #[error("statistics unavailable: {0}")]
    Statistics(String),

    /// Per-article statistic requested for an article that was never registered.
    #[error("article {0} was never registered with the evaluator")]
    UnknownArticle(ArticleId),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn extraction(what: impl Into<String>, source: impl Into<UpstreamError>) -> Self {
        Error::Extraction {
            what: what.into(),
            source: source.into(),
        }
    }
}
