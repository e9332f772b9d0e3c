mod chain;
mod conll;
mod error;
mod evaluator;
mod extractor;
mod language;
mod lexicon;
mod models;
mod orchestrator;
mod out_models;
mod polarity;
mod render;
mod resolver;
mod stemmer;
mod topics;

use anyhow::Result;
use clap::Parser;
use language::Language;
use models::ArticleId;
use orchestrator::{run_batch, BatchConfig};
use std::path::PathBuf;
use tracing::{debug, info};

/// Article Opinions - topic-anchored opinion mining over parsed news articles
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Article ids to process (default: every article in the parsed dir)
    article_ids: Vec<ArticleId>,

    /// Sentiment lexicon TSV (overrides OPINIONS_LEXICON)
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Topic-model keys file (overrides OPINIONS_TOPICS)
    #[arg(long)]
    topics: Option<PathBuf>,

    /// Directory of CoNLL parser output, one `<id>.conll` per article (overrides OPINIONS_PARSED_DIR)
    #[arg(long)]
    parsed_dir: Option<PathBuf>,

    /// Language of the articles and the lexicon
    #[arg(short, long, value_enum, default_value_t = Language::French)]
    language: Language,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Also write the nouns of each article here, for topic modelling
    #[arg(long)]
    nouns_dir: Option<PathBuf>,

    /// Topic-model document compositions, to report each article's prominent topics
    /// (overrides OPINIONS_COMPOSITIONS)
    #[arg(long)]
    compositions: Option<PathBuf>,
}

/// CLI flag > environment variable > default layout under the working directory.
fn resolve_path(flag: Option<PathBuf>, env_key: &str, default: impl Into<PathBuf>) -> PathBuf {
    if let Some(p) = flag {
        debug!("Using {} from command line: {}", env_key, p.display());
        return p;
    }
    if let Ok(p) = std::env::var(env_key) {
        debug!("Using {} from environment: {}", env_key, p);
        return PathBuf::from(p);
    }
    let p = default.into();
    debug!("Using default {}: {}", env_key, p.display());
    p
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting article_opinions");

    let args = Args::parse();
    let cfg = BatchConfig {
        lexicon_path: resolve_path(
            args.lexicon,
            "OPINIONS_LEXICON",
            format!("lib/sentiment_dic_{}.txt", args.language.short_name()),
        ),
        topics_path: resolve_path(args.topics, "OPINIONS_TOPICS", "topics/keys.txt"),
        parsed_dir: resolve_path(args.parsed_dir, "OPINIONS_PARSED_DIR", "parsed/conll"),
        article_ids: args.article_ids,
        language: args.language,
        output_dir: args.output_dir,
        nouns_dir: args.nouns_dir,
        compositions_path: args
            .compositions
            .or_else(|| std::env::var_os("OPINIONS_COMPOSITIONS").map(PathBuf::from)),
    };

    let required = [&cfg.lexicon_path, &cfg.topics_path, &cfg.parsed_dir];
    for path in required.into_iter().chain(cfg.compositions_path.as_ref()) {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "{} not found\n\
                 Use --lexicon, --topics and --parsed-dir, or set OPINIONS_LEXICON, \
                 OPINIONS_TOPICS and OPINIONS_PARSED_DIR.",
                path.display()
            ));
        }
    }

    let eval = run_batch(&cfg)?;
    println!("{eval}");
    Ok(())
}
