//! News sentiment aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

const POSITIVE_THRESHOLD: f64 = 0.2;
const NEGATIVE_THRESHOLD: f64 = -0.2;

/// A scored news item. Extra fields in the source JSON are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    pub sentiment_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            Self::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReport {
    pub overall_sentiment: SentimentLabel,
    pub sentiment_score: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total_count: usize,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
}

impl SentimentReport {
    fn neutral_default() -> Self {
        Self {
            overall_sentiment: SentimentLabel::Neutral,
            sentiment_score: 0.0,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            total_count: 0,
            positive_ratio: 0.0,
            negative_ratio: 0.0,
            neutral_ratio: 0.0,
        }
    }
}

/// Average score, per-item label counts and their ratios.
///
/// Items with a non-finite score are skipped. No scored items → Neutral with
/// zero score and zero ratios.
pub fn analyze_market_sentiment(items: &[NewsItem]) -> SentimentReport {
    let scores: Vec<f64> = items
        .iter()
        .map(|item| item.sentiment_score)
        .filter(|s| s.is_finite())
        .collect();
    if scores.is_empty() {
        return SentimentReport::neutral_default();
    }

    let total = scores.len();
    let avg = scores.iter().sum::<f64>() / total as f64;

    let mut positive = 0;
    let mut negative = 0;
    for &score in &scores {
        match SentimentLabel::from_score(score) {
            SentimentLabel::Positive => positive += 1,
            SentimentLabel::Negative => negative += 1,
            SentimentLabel::Neutral => {}
        }
    }
    let neutral = total - positive - negative;
    let ratio = |count: usize| count as f64 / total as f64;

    SentimentReport {
        overall_sentiment: SentimentLabel::from_score(avg),
        sentiment_score: avg,
        positive_count: positive,
        negative_count: negative,
        neutral_count: neutral,
        total_count: total,
        positive_ratio: ratio(positive),
        negative_ratio: ratio(negative),
        neutral_ratio: ratio(neutral),
    }
}
