// src/render.rs
use itertools::Itertools;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::language::Language;
use crate::models::ArticleId;

pub fn render_report_markdown(
    eval: &Evaluator,
    prominent: &BTreeMap<ArticleId, Vec<u32>>,
    language: Language,
    generated_at: &str,
) -> Result<String> {
    let mut md = String::new();
    md.push_str("# Opinion Mining Report\n\n");
    md.push_str(&format!("Generated {} ({} lexicon)\n\n", generated_at, language));

    let least = eval.least_positive_article();
    let most = eval.most_positive_article();
    let biggest = eval.biggest_opinion_count();

    md.push_str("## Batch Statistics\n");
    md.push_str(&format!("- **Least positive article**: {} (score {})\n", least, eval.article_score(least)?));
    md.push_str(&format!("- **Most positive article**: {} (score {})\n", most, eval.article_score(most)?));
    md.push_str(&format!(
        "- **Biggest amount of opinions**: {} ({} opinions)\n",
        biggest,
        eval.opinion_count(biggest)?
    ));
    md.push_str(&format!(
        "- **Average number of extracted opinions**: {:.2}\n\n",
        eval.average_opinion_count()
    ));

    md.push_str("## Articles\n\n");
    md.push_str("| Article | Score | Opinions |\n|---|---|---|\n");
    for id in eval.articles() {
        md.push_str(&format!("| {} | {} | {} |\n", id, eval.article_score(id)?, eval.opinion_count(id)?));
    }
    md.push('\n');

    for id in eval.articles() {
        let opinions = eval.opinions(id)?;
        md.push_str(&format!("### Article {}\n", id));
        if let Some(topics) = prominent.get(&id) {
            md.push_str(&format!("Prominent topics: {}\n\n", topics.iter().join(", ")));
        }
        if opinions.is_empty() {
            md.push_str("_No opinions extracted._\n\n");
            continue;
        }
        for o in opinions {
            md.push_str(&format!("- {} (topic {})\n", o, o.topic().line_id()));
        }
        md.push('\n');
    }

    Ok(md)
}
