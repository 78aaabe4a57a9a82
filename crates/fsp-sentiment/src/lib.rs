//! Lexicon-based sentiment scoring.
//!
//! `score` is a pure function from text to a (label, polarity, subjectivity)
//! triple. Each lexicon entry carries a polarity in [-1, 1] and a
//! subjectivity in [0, 1]; the text's scores are the averages over matched
//! words. A negator directly before a matched word flips that word's polarity
//! at half strength. Text with no lexicon hits scores (0, 0) and is labeled
//! Neutral; blank text short-circuits to No Sentiment without touching the
//! lexicon.

use fsp_core::{SentimentLabel, SentimentScore};

pub const CRATE_NAME: &str = "fsp-sentiment";

const NEGATORS: &[&str] = &["not", "no", "never", "cannot", "nor", "without"];

// (word, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("beautiful", 0.85, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("brilliant", 0.9, 0.9),
    ("cool", 0.35, 0.65),
    ("easy", 0.45, 0.85),
    ("enjoy", 0.4, 0.5),
    ("excellent", 1.0, 1.0),
    ("excited", 0.4, 0.75),
    ("fantastic", 0.4, 0.9),
    ("favorite", 0.5, 0.6),
    ("fun", 0.3, 0.2),
    ("glad", 0.5, 1.0),
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("happy", 0.8, 1.0),
    ("helpful", 0.35, 0.35),
    ("impressive", 1.0, 1.0),
    ("interesting", 0.5, 0.5),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("nice", 0.6, 1.0),
    ("perfect", 1.0, 1.0),
    ("proud", 0.8, 1.0),
    ("recommend", 0.4, 0.4),
    ("solid", 0.55, 0.6),
    ("useful", 0.3, 0.3),
    ("wonderful", 1.0, 1.0),
    ("angry", -0.5, 1.0),
    ("annoying", -0.6, 0.9),
    ("awful", -1.0, 1.0),
    ("bad", -0.7, 0.65),
    ("boring", -1.0, 1.0),
    ("broken", -0.4, 0.6),
    ("buggy", -0.5, 0.7),
    ("crash", -0.4, 0.4),
    ("difficult", -0.5, 1.0),
    ("disappointing", -0.6, 0.75),
    ("fail", -0.5, 0.5),
    ("failed", -0.5, 0.5),
    ("hate", -0.8, 0.9),
    ("horrible", -1.0, 1.0),
    ("mess", -0.4, 0.6),
    ("poor", -0.4, 0.6),
    ("sad", -0.5, 1.0),
    ("scam", -0.8, 0.9),
    ("slow", -0.3, 0.4),
    ("stupid", -0.8, 0.9),
    ("terrible", -1.0, 1.0),
    ("ugly", -0.7, 1.0),
    ("useless", -0.5, 0.6),
    ("waste", -0.5, 0.6),
    ("worse", -0.5, 0.6),
    ("worst", -1.0, 1.0),
    ("wrong", -0.5, 0.5),
];

fn lookup(word: &str) -> Option<(f64, f64)> {
    LEXICON
        .iter()
        .find(|(w, _, _)| *w == word)
        .map(|(_, p, s)| (*p, *s))
}

/// Score a piece of text. Blank input never invokes the lexicon and yields
/// the No Sentiment triple.
pub fn score(text: &str) -> SentimentScore {
    if text.trim().is_empty() {
        return SentimentScore::none();
    }

    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut polarity_sum = 0.0;
    let mut subjectivity_sum = 0.0;
    let mut hits = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let Some((mut polarity, subjectivity)) = lookup(token) else {
            continue;
        };
        let negated = i > 0
            && (NEGATORS.contains(&tokens[i - 1].as_str()) || tokens[i - 1].ends_with("n't"));
        if negated {
            polarity *= -0.5;
        }
        polarity_sum += polarity;
        subjectivity_sum += subjectivity;
        hits += 1;
    }

    if hits == 0 {
        return SentimentScore {
            label: SentimentLabel::Neutral,
            polarity: 0.0,
            subjectivity: 0.0,
        };
    }

    let polarity = (polarity_sum / hits as f64).clamp(-1.0, 1.0);
    let subjectivity = (subjectivity_sum / hits as f64).clamp(0.0, 1.0);
    SentimentScore {
        label: SentimentLabel::from_polarity(polarity),
        polarity,
        subjectivity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_short_circuits_to_no_sentiment() {
        assert_eq!(score("").label, SentimentLabel::NoSentiment);
        assert_eq!(score("   \t\n").label, SentimentLabel::NoSentiment);
        let s = score("");
        assert_eq!(s.polarity, 0.0);
        assert_eq!(s.subjectivity, 0.0);
    }

    #[test]
    fn unmatched_text_is_neutral_zero() {
        let s = score("hello world");
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert_eq!(s.polarity, 0.0);
        assert_eq!(s.subjectivity, 0.0);
    }

    #[test]
    fn positive_and_negative_words_set_the_sign() {
        let pos = score("This release is really great");
        assert_eq!(pos.label, SentimentLabel::Positive);
        assert!(pos.polarity > 0.0);

        let neg = score("what a terrible, buggy mess");
        assert_eq!(neg.label, SentimentLabel::Negative);
        assert!(neg.polarity < 0.0);
    }

    #[test]
    fn negation_flips_polarity_at_half_strength() {
        let plain = score("good");
        let negated = score("not good");
        assert_eq!(negated.polarity, plain.polarity * -0.5);
        assert_eq!(negated.label, SentimentLabel::Negative);

        let contraction = score("isn't good");
        assert_eq!(contraction.polarity, plain.polarity * -0.5);
    }

    #[test]
    fn scores_stay_in_range() {
        let s = score("awesome excellent perfect wonderful impressive best");
        assert!(s.polarity <= 1.0);
        assert!(s.subjectivity <= 1.0);
        let n = score("terrible awful horrible worst boring");
        assert!(n.polarity >= -1.0);
        assert!(n.subjectivity >= 0.0);
    }

    #[test]
    fn punctuation_and_case_do_not_matter() {
        let a = score("GOOD!");
        let b = score("good");
        assert_eq!(a.polarity, b.polarity);
        assert_eq!(a.subjectivity, b.subjectivity);
    }
}
