use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type ReviewId = String;

/// Wire and display format of review timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored review. Sentiment is never part of the stored record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "ReviewId")]
    pub id: ReviewId,
    #[serde(rename = "ReviewBody")]
    pub body: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Timestamp", with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
}

impl Review {
    pub fn new<I, B, L>(id: I, body: B, location: L, timestamp: NaiveDateTime) -> Self
    where
        I: Into<ReviewId>,
        B: Into<String>,
        L: Into<String>,
    {
        Review {
            id: id.into(),
            body: body.into(),
            location: location.into(),
            timestamp,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// A review copied out of the store together with its freshly computed sentiment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotatedReview {
    #[serde(flatten)]
    pub review: Review,
    pub sentiment: SentimentScores,
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
