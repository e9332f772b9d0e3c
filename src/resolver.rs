use tracing::trace;

use crate::lexicon::SentimentLexicon;
use crate::models::Word;
use crate::polarity::Polarity;

/// Disambiguates the raw polarity `raw` of `polar_word` against the polarity
/// the topic word carries on its own.
///
/// Only applied to direct (single-edge) opinions. Rules, first match wins:
/// 1. topic word not polar, or neutral: keep `raw`
/// 2. negative verb as polar word flips a negative topic ("kill disease")
/// 3. negative verb as topic word flips symmetrically
/// 4. any other +/- mismatch resolves to negative ("rapid cancer")
pub fn resolve_polarity(
    lexicon: &SentimentLexicon,
    polar_word: &Word,
    raw: Polarity,
    topic_word: &Word,
) -> Polarity {
    let topic_polarity = match lexicon.stem_and_lookup(topic_word) {
        None | Some(Polarity::Neutral) => return raw,
        Some(p) => p,
    };
    let language = lexicon.language();

    let resolved = if raw == Polarity::Negative && language.is_verb_tag(polar_word.pos_tag()) {
        flip_if_negative(topic_polarity)
    } else if topic_polarity == Polarity::Negative && language.is_verb_tag(topic_word.pos_tag()) {
        flip_if_negative(raw)
    } else if raw != topic_polarity && raw != Polarity::Neutral {
        Polarity::Negative
    } else {
        raw
    };

    if resolved != raw {
        trace!(
            "Polarity resolved - topic={}({}), polar={}({}), raw={}, resolved={}",
            topic_word, topic_polarity, polar_word, polar_word.pos_tag(), raw, resolved
        );
    }
    resolved
}

fn flip_if_negative(p: Polarity) -> Polarity {
    if p == Polarity::Negative {
        Polarity::Positive
    } else {
        Polarity::Negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use std::io::Cursor;

    fn lexicon() -> SentimentLexicon {
        let data = "maladie\t1\t0\t0\n\
                    tuer\t1\t0\t0\n\
                    détruire\t1\t0\t0\n\
                    santé\t0\t0\t1\n\
                    rapide\t0\t0\t1\n\
                    cancer\t1\t0\t0\n\
                    table\t0\t1\t0\n";
        SentimentLexicon::from_reader(Cursor::new(data), Language::French).unwrap()
    }

    fn w(text: &str, id: u32, pos: &str) -> Word {
        Word::new(text, id, pos).unwrap()
    }

    #[test]
    fn negative_verb_flips_negative_topic() {
        let lex = lexicon();
        let got = resolve_polarity(&lex, &w("tuer", 1, "VINF"), Polarity::Negative, &w("maladie", 2, "NC"));
        assert_eq!(got, Polarity::Positive);
    }

    #[test]
    fn negative_verb_on_positive_topic_stays_negative() {
        let lex = lexicon();
        let got = resolve_polarity(&lex, &w("détruire", 1, "VINF"), Polarity::Negative, &w("santé", 2, "NC"));
        assert_eq!(got, Polarity::Negative);
    }

    #[test]
    fn negative_verb_topic_flips_symmetrically() {
        let lex = lexicon();
        let topic = w("tuer", 3, "V");
        assert_eq!(
            resolve_polarity(&lex, &w("santé", 4, "NC"), Polarity::Positive, &topic),
            Polarity::Negative
        );
    }

    #[test]
    fn negative_non_verb_polar_with_negative_verb_topic_flips() {
        // rule 2 does not apply (polar word is a noun), rule 3 does
        let lex = lexicon();
        let got = resolve_polarity(&lex, &w("maladie", 4, "NC"), Polarity::Negative, &w("tuer", 3, "VINF"));
        assert_eq!(got, Polarity::Positive);
    }

    #[test]
    fn mismatch_defaults_to_negative() {
        let lex = lexicon();
        let got = resolve_polarity(&lex, &w("rapide", 1, "ADJ"), Polarity::Positive, &w("cancer", 2, "NC"));
        assert_eq!(got, Polarity::Negative);
    }

    #[test]
    fn agreement_is_kept() {
        let lex = lexicon();
        let got = resolve_polarity(&lex, &w("rapide", 1, "ADJ"), Polarity::Positive, &w("santé", 2, "NC"));
        assert_eq!(got, Polarity::Positive);
    }

    #[test]
    fn neutral_or_unknown_topic_keeps_raw() {
        let lex = lexicon();
        let polar = w("tuer", 1, "VINF");
        assert_eq!(
            resolve_polarity(&lex, &polar, Polarity::Negative, &w("table", 2, "NC")),
            Polarity::Negative
        );
        assert_eq!(
            resolve_polarity(&lex, &polar, Polarity::Negative, &w("voiture", 2, "NC")),
            Polarity::Negative
        );
    }

    #[test]
    fn neutral_polar_word_keeps_raw() {
        let lex = lexicon();
        let got = resolve_polarity(&lex, &w("table", 1, "NC"), Polarity::Neutral, &w("cancer", 2, "NC"));
        assert_eq!(got, Polarity::Neutral);
    }
}
