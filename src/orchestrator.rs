use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::conll::{list_article_files, read_article};
use crate::evaluator::{opinion_set_score, Evaluator, EvaluatorBuilder};
use crate::extractor::OpinionExtractor;
use crate::language::Language;
use crate::lexicon::SentimentLexicon;
use crate::models::{ArticleId, ParsedArticle};
use crate::out_models::{ArticleOpinions, BatchOpinions, BatchSummary};
use crate::render::render_report_markdown;
use crate::topics::{load_prominent_topics, load_topics};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub lexicon_path: PathBuf,
    pub topics_path: PathBuf,
    pub parsed_dir: PathBuf,
    /// Empty means every article file found in `parsed_dir`.
    pub article_ids: Vec<ArticleId>,
    pub language: Language,
    pub output_dir: PathBuf,
    pub nouns_dir: Option<PathBuf>,
    /// Topic-model document compositions, for per-article prominent topics.
    pub compositions_path: Option<PathBuf>,
}

pub fn run_batch(cfg: &BatchConfig) -> Result<Evaluator> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Batch started - language={}, parsed_dir={}, output_dir={}",
        cfg.language,
        cfg.parsed_dir.display(),
        cfg.output_dir.display()
    );

    // 1) shared read-only resources
    let lexicon = SentimentLexicon::load(&cfg.lexicon_path, cfg.language)
        .with_context(|| format!("loading lexicon {}", cfg.lexicon_path.display()))?;
    if lexicon.is_empty() {
        warn!("Lexicon is empty - no opinion will be found");
    }
    let topics = load_topics(&cfg.topics_path)
        .with_context(|| format!("loading topics {}", cfg.topics_path.display()))?;
    if topics.is_empty() {
        bail!("No topics found in {}", cfg.topics_path.display());
    }

    // 2) parsed articles, read in parallel
    let load_start = std::time::Instant::now();
    let files = select_article_files(cfg)?;
    if files.is_empty() {
        error!("No parsed articles - dir={}", cfg.parsed_dir.display());
        bail!("No parsed articles available in {}", cfg.parsed_dir.display());
    }
    let mut articles: Vec<ParsedArticle> = files
        .par_iter()
        .map(|(id, path)| {
            read_article(path, *id, cfg.language).with_context(|| format!("reading article {}", path.display()))
        })
        .collect::<Result<_>>()?;
    articles.sort_by_key(ParsedArticle::id);
    info!(
        "Articles loaded - count={}, duration={:.2}s",
        articles.len(),
        load_start.elapsed().as_secs_f32()
    );

    // 3) nouns for the external topic model
    if let Some(dir) = &cfg.nouns_dir {
        write_nouns(dir, &articles)?;
    }

    // 3b) prominent topics from the topic model, when available
    let prominent = match &cfg.compositions_path {
        Some(path) => load_prominent_topics(path)
            .with_context(|| format!("loading compositions {}", path.display()))?,
        None => BTreeMap::new(),
    };
    for article in &articles {
        match prominent.get(&article.id()) {
            Some(ids) => info!("Prominent topics - article={}, topics={:?}", article.id(), ids),
            None if cfg.compositions_path.is_some() => {
                warn!("No topic composition for article {}", article.id())
            }
            None => {}
        }
    }

    // 4) extraction, one article at a time
    let extract_start = std::time::Instant::now();
    let extractor = OpinionExtractor::new(&lexicon);
    let mut builder = EvaluatorBuilder::new();
    for article in &articles {
        let opinions = extractor
            .extract_opinions(article, &topics)
            .with_context(|| format!("extracting opinions from article {}", article.id()))?;
        info!(
            "Article processed - id={}, opinions={}, score={}",
            article.id(),
            opinions.len(),
            opinion_set_score(&opinions)
        );
        for o in &opinions {
            debug!("Opinion - article={}, {}", article.id(), o);
        }
        builder.add_opinions(article.id(), opinions);
    }
    info!(
        "Extraction completed - articles={}, duration={:.2}s",
        builder.len(),
        extract_start.elapsed().as_secs_f32()
    );

    // 5) statistics + persistence
    let eval = builder.build()?;
    persist(cfg, &eval, &prominent)?;

    info!(
        "Batch completed successfully - total_duration={:.2}s, articles={}",
        pipeline_start.elapsed().as_secs_f32(),
        articles.len()
    );
    Ok(eval)
}

fn select_article_files(cfg: &BatchConfig) -> Result<Vec<(ArticleId, PathBuf)>> {
    let all = list_article_files(&cfg.parsed_dir)
        .with_context(|| format!("listing parsed articles in {}", cfg.parsed_dir.display()))?;
    debug!("Article files found - count={}", all.len());
    if cfg.article_ids.is_empty() {
        return Ok(all);
    }

    let mut selected = Vec::with_capacity(cfg.article_ids.len());
    for id in &cfg.article_ids {
        match all.iter().find(|(found, _)| found == id) {
            Some(entry) => selected.push(entry.clone()),
            None => bail!("No parsed file for article {} in {}", id, cfg.parsed_dir.display()),
        }
    }
    Ok(selected)
}

/// The topic model reads the whole directory, so noun files from earlier
/// batches are removed first.
fn write_nouns(dir: &Path, articles: &[ParsedArticle]) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut removed = 0usize;
    for entry in std::fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            std::fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("Stale noun files removed - dir={}, count={}", dir.display(), removed);
    }
    for article in articles {
        let path = dir.join(format!("{}.txt", article.id()));
        let mut body = article.nouns().join("\n");
        body.push('\n');
        std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    }
    debug!("Nouns exported - dir={}, articles={}", dir.display(), articles.len());
    Ok(())
}

fn persist(cfg: &BatchConfig, eval: &Evaluator, prominent: &BTreeMap<ArticleId, Vec<u32>>) -> Result<()> {
    let persist_start = std::time::Instant::now();
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("create {}", cfg.output_dir.display()))?;

    let generated_at = chrono::Utc::now().to_rfc3339();
    let batch = BatchOpinions {
        generated_at: generated_at.clone(),
        language: cfg.language,
        summary: BatchSummary::from_evaluator(eval)?,
        articles: eval
            .articles()
            .map(|id| {
                let topics = prominent.get(&id).cloned().unwrap_or_default();
                ArticleOpinions::from_evaluator(eval, id, topics)
            })
            .collect::<crate::error::Result<_>>()?,
    };
    std::fs::write(cfg.output_dir.join("opinions.json"), serde_json::to_vec_pretty(&batch)?)?;
    debug!("Wrote opinions.json");

    let report = render_report_markdown(eval, prominent, cfg.language, &generated_at)?;
    std::fs::write(cfg.output_dir.join("report.md"), report.as_bytes())?;
    debug!("Wrote report.md");

    info!(
        "Output persisted - duration={:.2}s, directory={}",
        persist_start.elapsed().as_secs_f32(),
        cfg.output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LEXICON: &str = "maladie\t1\t0\t0\ntue\t1\t0\t0\ngrave\t1\t0\t0\nexcellent\t0\t0\t1\n";
    const TOPICS: &str = "0\t0.6\tmaladie santé\n1\t0.4\trésultat\n";

    // "Le médicament tue la maladie grave."
    const ARTICLE_1: &str = "\
1\tLe\tle\tD\tDET\t_\t2\tdet\t_\t_
2\tmédicament\tmédicament\tN\tNC\t_\t3\tsuj\t_\t_
3\ttue\ttuer\tV\tV\t_\t0\troot\t_\t_
4\tla\tle\tD\tDET\t_\t5\tdet\t_\t_
5\tmaladie\tmaladie\tN\tNC\t_\t3\tobj\t_\t_
6\tgrave\tgrave\tA\tADJ\t_\t5\tmod\t_\t_
7\t.\t.\tPONCT\tPONCT\t_\t3\tponct\t_\t_
";

    // "Un résultat excellent."
    const ARTICLE_2: &str = "\
1\tUn\tun\tD\tDET\t_\t2\tdet\t_\t_
2\trésultat\trésultat\tN\tNC\t_\t0\troot\t_\t_
3\texcellent\texcellent\tA\tADJ\t_\t2\tmod\t_\t_
";

    fn fixture() -> (tempfile::TempDir, BatchConfig) {
        let dir = tempfile::tempdir().unwrap();
        let parsed = dir.path().join("parsed");
        fs::create_dir_all(&parsed).unwrap();
        fs::write(dir.path().join("lexicon.tsv"), LEXICON).unwrap();
        fs::write(dir.path().join("keys.txt"), TOPICS).unwrap();
        fs::write(parsed.join("1.conll"), ARTICLE_1).unwrap();
        fs::write(parsed.join("2.conll"), ARTICLE_2).unwrap();

        let cfg = BatchConfig {
            lexicon_path: dir.path().join("lexicon.tsv"),
            topics_path: dir.path().join("keys.txt"),
            parsed_dir: parsed,
            article_ids: vec![],
            language: Language::French,
            output_dir: dir.path().join("out"),
            nouns_dir: Some(dir.path().join("nouns")),
            compositions_path: None,
        };
        (dir, cfg)
    }

    #[test]
    fn batch_runs_end_to_end() -> Result<()> {
        let (_dir, cfg) = fixture();
        let eval = run_batch(&cfg)?;

        // article 1: tue/maladie resolved to +1, maladie/grave -1, chain tue..grave -1
        assert_eq!(eval.opinion_count(1)?, 3);
        assert_eq!(eval.article_score(1)?, -1);
        assert_eq!(eval.article_score(2)?, 1);
        assert_eq!(eval.most_positive_article(), 2);
        assert_eq!(eval.least_positive_article(), 1);
        assert_eq!(eval.biggest_opinion_count(), 1);
        assert_eq!(eval.average_opinion_count(), 2.0);

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(cfg.output_dir.join("opinions.json"))?)?;
        assert_eq!(json["articles"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["summary"]["most_positive"]["article_id"], 2);

        let report = fs::read_to_string(cfg.output_dir.join("report.md"))?;
        assert!(report.contains("### Article 1"));

        let nouns = fs::read_to_string(cfg.nouns_dir.as_ref().unwrap().join("1.txt"))?;
        assert_eq!(nouns, "médicament\nmaladie\n");
        Ok(())
    }

    #[test]
    fn explicit_article_selection() -> Result<()> {
        let (_dir, mut cfg) = fixture();
        cfg.article_ids = vec![2];
        let eval = run_batch(&cfg)?;
        assert_eq!(eval.articles().collect::<Vec<_>>(), vec![2]);

        cfg.article_ids = vec![42];
        assert!(run_batch(&cfg).is_err());
        Ok(())
    }

    #[test]
    fn missing_lexicon_aborts() {
        let (_dir, mut cfg) = fixture();
        cfg.lexicon_path = cfg.lexicon_path.with_file_name("absent.tsv");
        let err = run_batch(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("loading lexicon"));
    }

    #[test]
    fn stale_noun_files_are_replaced() -> Result<()> {
        let (_dir, mut cfg) = fixture();
        let nouns_dir = cfg.nouns_dir.clone().unwrap();
        fs::create_dir_all(&nouns_dir)?;
        fs::write(nouns_dir.join("99.txt"), "ancien\n")?;
        fs::write(nouns_dir.join("README"), "kept")?;

        cfg.article_ids = vec![1];
        run_batch(&cfg)?;

        let mut names: Vec<String> = fs::read_dir(&nouns_dir)?
            .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<_>>()?;
        names.sort();
        assert_eq!(names, vec!["1.txt", "README"]);
        Ok(())
    }

    #[test]
    fn prominent_topics_reach_the_outputs() -> Result<()> {
        let (dir, mut cfg) = fixture();
        let compo = dir.path().join("compo.txt");
        fs::write(
            &compo,
            "#doc source topic proportion ...\n\
             0 nouns/1.txt 0 0.7 1 0.3\n\
             1 nouns/2.txt 1 0.05 0 0.02\n",
        )?;
        cfg.compositions_path = Some(compo);
        run_batch(&cfg)?;

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(cfg.output_dir.join("opinions.json"))?)?;
        assert_eq!(json["articles"][0]["prominent_topics"], serde_json::json!([0, 1]));
        assert_eq!(json["articles"][1]["prominent_topics"], serde_json::json!([1]));

        let report = fs::read_to_string(cfg.output_dir.join("report.md"))?;
        assert!(report.contains("Prominent topics: 0, 1"));
        Ok(())
    }
}
