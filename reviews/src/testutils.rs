use crate::sentiment::{ScorerError, SentimentScorer};
use crate::types::{SentimentScores, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Scores known texts with a fixed compound value and everything else as neutral.
pub struct FixedScorer {
    compounds: HashMap<String, f64>,
}

impl FixedScorer {
    pub fn new<I, S>(compounds: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        FixedScorer {
            compounds: compounds
                .into_iter()
                .map(|(text, compound)| (text.into(), compound))
                .collect(),
        }
    }
}

impl SentimentScorer for FixedScorer {
    fn polarity_scores(&self, text: &str) -> Result<SentimentScores, ScorerError> {
        let compound = self.compounds.get(text).copied().unwrap_or_default();
        Ok(SentimentScores {
            neg: if compound < 0.0 { 1.0 } else { 0.0 },
            neu: if compound == 0.0 { 1.0 } else { 0.0 },
            pos: if compound > 0.0 { 1.0 } else { 0.0 },
            compound,
        })
    }
}

pub struct FailingScorer;

impl SentimentScorer for FailingScorer {
    fn polarity_scores(&self, _text: &str) -> Result<SentimentScores, ScorerError> {
        Err(ScorerError::Failed("scorer unavailable".into()))
    }
}

pub fn timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).expect("valid test timestamp")
}
