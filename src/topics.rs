//! Readers for topic-model output.
//!
//! Keys file: `<lineId> <weight> <key1> <key2> ...`.
//! Composition file: `<docIdx> <path/to/<articleId>.txt> <topic> <proportion> ...`,
//! pairs sorted by decreasing proportion, `#` header lines.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{ArticleId, Topic};

/// Topics at or above this share of an article count as prominent.
pub const PROMINENCE_THRESHOLD: f64 = 0.1;

pub fn load_topics(path: &Path) -> Result<Vec<Topic>> {
    let file = File::open(path).map_err(|e| Error::extraction(format!("opening topics {}", path.display()), e))?;
    let topics = parse_topics(BufReader::new(file))?;
    info!("Topics loaded - path={}, topics={}", path.display(), topics.len());
    Ok(topics)
}

pub fn parse_topics<R: BufRead>(reader: R) -> Result<Vec<Topic>> {
    let mut topics = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| Error::extraction(format!("reading topics line {line_no}"), e))?;
        let mut fields = line.split_whitespace();

        let Some(raw_id) = fields.next() else {
            continue;
        };
        let line_id: u32 = raw_id
            .parse()
            .map_err(|_| Error::extraction(format!("parsing topics line {line_no}"), format!("bad topic id {raw_id:?}")))?;
        let raw_weight = fields.next().unwrap_or_default();
        let weight: f64 = raw_weight.parse().map_err(|_| {
            Error::extraction(format!("parsing topics line {line_no}"), format!("bad weight {raw_weight:?}"))
        })?;
        let keys: Vec<String> = fields.map(str::to_string).collect();

        let topic = Topic::new(line_id, weight, keys)?;
        debug!("Topic - {}", topic);
        topics.push(topic);
    }
    Ok(topics)
}

pub fn load_prominent_topics(path: &Path) -> Result<BTreeMap<ArticleId, Vec<u32>>> {
    let file =
        File::open(path).map_err(|e| Error::extraction(format!("opening compositions {}", path.display()), e))?;
    let prominent = parse_prominent_topics(BufReader::new(file))?;
    info!("Topic compositions loaded - path={}, articles={}", path.display(), prominent.len());
    Ok(prominent)
}

/// Leading topics of each article whose proportion reaches
/// [`PROMINENCE_THRESHOLD`]; the top topic alone when none does.
pub fn parse_prominent_topics<R: BufRead>(reader: R) -> Result<BTreeMap<ArticleId, Vec<u32>>> {
    let mut prominent = BTreeMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| Error::extraction(format!("reading compositions line {line_no}"), e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let bad = |reason: String| Error::extraction(format!("parsing compositions line {line_no}"), reason);
        let source = fields.get(1).copied().unwrap_or_default();
        let article: ArticleId = Path::new(source)
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| bad(format!("no article id in {source:?}")))?;

        let mut pairs = Vec::with_capacity(fields.len().saturating_sub(2) / 2);
        for pair in fields.get(2..).unwrap_or_default().chunks(2) {
            let [topic, proportion] = pair else {
                return Err(bad(format!("topic {:?} has no proportion", pair[0])));
            };
            let topic: u32 = topic.parse().map_err(|_| bad(format!("bad topic id {topic:?}")))?;
            let proportion: f64 =
                proportion.parse().map_err(|_| bad(format!("bad proportion {proportion:?}")))?;
            pairs.push((topic, proportion));
        }

        let Some(&(top, _)) = pairs.first() else {
            warn!("Article without topic proportions - article={}, line={}", article, line_no);
            continue;
        };
        let mut ids: Vec<u32> = pairs
            .iter()
            .take_while(|(_, proportion)| *proportion >= PROMINENCE_THRESHOLD)
            .map(|(topic, _)| *topic)
            .collect();
        if ids.is_empty() {
            ids.push(top);
        }
        debug!("Prominent topics - article={}, topics={:?}", article, ids);
        prominent.insert(article, ids);
    }
    Ok(prominent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_mallet_keys() -> Result<()> {
        let data = "0\t0.25\tsanté maladie hôpital\n\n1 0.1 économie crise\n";
        let topics = parse_topics(Cursor::new(data))?;

        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].line_id(), 0);
        assert_eq!(topics[0].weight(), 0.25);
        assert_eq!(topics[0].keys(), &["santé", "maladie", "hôpital"]);
        assert_eq!(topics[1].keys(), &["économie", "crise"]);
        Ok(())
    }

    #[test]
    fn bad_numbers_are_extraction_failures() {
        assert!(matches!(parse_topics(Cursor::new("x 0.1 a")), Err(Error::Extraction { .. })));
        assert!(matches!(parse_topics(Cursor::new("-1 0.1 a")), Err(Error::Extraction { .. })));
        assert!(matches!(parse_topics(Cursor::new("0 abc a")), Err(Error::Extraction { .. })));
        assert!(matches!(parse_topics(Cursor::new("0")), Err(Error::Extraction { .. })));
    }

    #[test]
    fn topic_without_keys_is_invalid() {
        assert!(matches!(parse_topics(Cursor::new("3 0.5\n")), Err(Error::Validation(_))));
    }

    const COMPOSITIONS: &str = "\
#doc source topic proportion ...
0 file:/data/nouns/12.txt 3 0.52 0 0.21 4 0.09 1 0.18
1 file:/data/nouns/7.txt 2 0.08 1 0.05
";

    #[test]
    fn prominent_topics_stop_at_first_minor_share() -> Result<()> {
        let prominent = parse_prominent_topics(Cursor::new(COMPOSITIONS))?;
        // topic 1 is above the threshold but comes after a minor one
        assert_eq!(prominent[&12], vec![3, 0]);
        assert_eq!(prominent.len(), 2);
        Ok(())
    }

    #[test]
    fn top_topic_is_kept_when_nothing_is_prominent() -> Result<()> {
        let prominent = parse_prominent_topics(Cursor::new(COMPOSITIONS))?;
        assert_eq!(prominent[&7], vec![2]);
        Ok(())
    }

    #[test]
    fn malformed_compositions_are_extraction_failures() {
        let cases = ["0 notes.txt 1 0.5", "0 3.txt 1", "0 3.txt x 0.5", "0 3.txt 1 lots"];
        for case in cases {
            assert!(
                matches!(parse_prominent_topics(Cursor::new(case)), Err(Error::Extraction { .. })),
                "{case}"
            );
        }
    }

    #[test]
    fn articles_without_pairs_are_skipped() -> Result<()> {
        let prominent = parse_prominent_topics(Cursor::new("0 5.txt\n"))?;
        assert!(prominent.is_empty());
        Ok(())
    }
}
