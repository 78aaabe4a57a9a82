//! Core domain model for the forum sentiment pipeline.

use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "fsp-core";

/// Stored in place of an absent or whitespace-only post body.
pub const NO_BODY_SENTINEL: &str = "No description available";

/// One item as handed over by a source adapter, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub title: String,
    pub body: Option<String>,
}

/// One harvested row of the `raw_posts` table.
///
/// `(channel, title)` is the natural key; `body` is nullable at the SQL level
/// even though the harvest loop always writes a sentinel for empty bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: i32,
    pub channel: String,
    pub title: String,
    pub body: Option<String>,
}

/// Sentiment classification for a single piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// Input text was empty or missing; the scorer was never invoked.
    NoSentiment,
}

impl SentimentLabel {
    /// Label for a computed polarity: strictly positive, strictly negative,
    /// or exactly zero.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Self::Positive
        } else if polarity < 0.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::NoSentiment => "No Sentiment",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score triple produced for one piece of text.
///
/// Polarity lies in [-1, 1], subjectivity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    pub polarity: f64,
    pub subjectivity: f64,
}

impl SentimentScore {
    /// Score for empty or missing input text.
    pub fn none() -> Self {
        Self {
            label: SentimentLabel::NoSentiment,
            polarity: 0.0,
            subjectivity: 0.0,
        }
    }
}

/// One scored row bound for the `enriched_posts` table, derived 1:1 from a
/// [`RawPost`]. Channel, title and body are denormalized copies so the
/// downstream reader never needs a join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub post_id: i32,
    pub channel: String,
    pub title: String,
    pub body: String,
    pub title_score: SentimentScore,
    pub body_score: SentimentScore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_sign_maps_to_label() {
        assert_eq!(SentimentLabel::from_polarity(0.3), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(-0.3), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn tiny_but_nonzero_polarity_is_not_neutral() {
        assert_eq!(
            SentimentLabel::from_polarity(f64::EPSILON),
            SentimentLabel::Positive
        );
        assert_eq!(
            SentimentLabel::from_polarity(-f64::EPSILON),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn no_sentiment_renders_with_space() {
        assert_eq!(SentimentLabel::NoSentiment.to_string(), "No Sentiment");
        let score = SentimentScore::none();
        assert_eq!(score.polarity, 0.0);
        assert_eq!(score.subjectivity, 0.0);
    }
}
