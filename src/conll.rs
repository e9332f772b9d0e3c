//! Reader for upstream dependency-parser output in CoNLL-X layout.
//!
//! `ID FORM LEMMA CPOSTAG POSTAG FEATS HEAD DEPREL ...`, tab separated, one
//! token per line, sentences separated by blank lines.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::language::Language;
use crate::models::{ArticleId, Dependency, ParsedArticle, ParsedSentence, Word};

/// Tokens that start with something other than a letter (quotes, digits,
/// stray punctuation) never take part in a dependency.
static NOT_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}+.*$").expect("junk pattern is valid"));

const SKIPPED_RELATIONS: &[&str] = &["ponct", "root"];
const MIN_COLUMNS: usize = 8;

struct Token {
    id: u32,
    form: String,
    pos_tag: String,
    head: u32,
    relation: String,
}

pub fn is_junk(text: &str) -> bool {
    !NOT_JUNK.is_match(text)
}

/// Article files in `dir` named `<articleId>.<ext>`, sorted by id.
pub fn list_article_files(dir: &Path) -> Result<Vec<(ArticleId, PathBuf)>> {
    let entries =
        fs::read_dir(dir).map_err(|e| Error::extraction(format!("listing {}", dir.display()), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| Error::extraction(format!("listing {}", dir.display()), e))?
            .path();
        if !path.is_file() {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()).and_then(|s| s.parse::<ArticleId>().ok()) {
            Some(id) => files.push((id, path)),
            None => debug!("Ignoring non-article file - {}", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_article(path: &Path, id: ArticleId, language: Language) -> Result<ParsedArticle> {
    let start = std::time::Instant::now();
    let file = File::open(path).map_err(|e| Error::extraction(format!("opening {}", path.display()), e))?;
    let article = parse_article(BufReader::new(file), id, language, &path.display().to_string())?;

    info!(
        "Article loaded - id={}, sentences={}, nouns={}, duration={:.2}s",
        id,
        article.sentences().len(),
        article.nouns().len(),
        start.elapsed().as_secs_f32()
    );
    Ok(article)
}

pub fn parse_article<R: BufRead>(reader: R, id: ArticleId, language: Language, source: &str) -> Result<ParsedArticle> {
    let mut sentences = Vec::new();
    let mut nouns = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| Error::extraction(format!("reading {source} line {line_no}"), e))?;
        let line = line.trim();

        if line.is_empty() {
            if !tokens.is_empty() {
                let tokens = std::mem::take(&mut tokens);
                sentences.push(build_sentence(tokens, language, &mut nouns, source)?);
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if let Some(token) = parse_token(line, line_no, source)? {
            tokens.push(token);
        }
    }
    if !tokens.is_empty() {
        sentences.push(build_sentence(tokens, language, &mut nouns, source)?);
    }

    debug!("Parsed {} - sentences={}", source, sentences.len());
    ParsedArticle::new(id, sentences, nouns)
}

fn parse_token(line: &str, line_no: usize, source: &str) -> Result<Option<Token>> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < MIN_COLUMNS {
        return Err(malformed(source, line_no, format!("expected at least {MIN_COLUMNS} columns, found {}", cols.len())));
    }

    // multiword ranges (3-4) and empty nodes (5.1)
    if cols[0].contains(['-', '.']) {
        return Ok(None);
    }

    let id: u32 = cols[0]
        .parse()
        .map_err(|_| malformed(source, line_no, format!("bad token id {:?}", cols[0])))?;
    let head: u32 = cols[6]
        .parse()
        .map_err(|_| malformed(source, line_no, format!("bad head {:?}", cols[6])))?;

    Ok(Some(Token {
        id,
        form: cols[1].to_string(),
        pos_tag: cols[4].to_string(),
        head,
        relation: cols[7].to_string(),
    }))
}

fn build_sentence(
    tokens: Vec<Token>,
    language: Language,
    nouns: &mut Vec<String>,
    source: &str,
) -> Result<ParsedSentence> {
    let mut by_id: BTreeMap<u32, Word> = BTreeMap::new();
    for t in &tokens {
        let word = Word::new(t.form.clone(), t.id, t.pos_tag.clone())?;
        if by_id.insert(t.id, word).is_some() {
            return Err(Error::extraction(format!("reading {source}"), format!("duplicate token id {}", t.id)));
        }
    }

    let mut dependencies = Vec::new();
    let mut skipped = 0usize;
    for t in &tokens {
        if t.head == 0 || SKIPPED_RELATIONS.contains(&t.relation.as_str()) {
            continue;
        }
        let governor = by_id.get(&t.head).ok_or_else(|| {
            Error::extraction(
                format!("reading {source}"),
                format!("token {} points at missing head {}", t.id, t.head),
            )
        })?;
        let dependent = &by_id[&t.id];

        if is_junk(governor.text()) || is_junk(dependent.text()) {
            skipped += 1;
            continue;
        }
        dependencies.push(Dependency::new(t.relation.clone(), governor.clone(), dependent.clone())?);
    }
    if skipped > 0 {
        debug!("Skipped junk dependencies - count={}", skipped);
    }

    let words: Vec<Word> = by_id.into_values().collect();
    nouns.extend(
        words
            .iter()
            .filter(|w| language.is_noun_tag(w.pos_tag()) && !is_junk(w.text()))
            .map(|w| w.text().to_string()),
    );
    if dependencies.is_empty() {
        warn!("Sentence without usable dependencies in {} - tokens={}", source, words.len());
    }

    Ok(ParsedSentence { words, dependencies })
}

fn malformed(source: &str, line_no: usize, reason: String) -> Error {
    Error::extraction(format!("parsing {source} line {line_no}"), reason)
}
