//! Sentiment labels and per-label counts

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Sentiment assigned to one review
///
/// `Unknown` marks a review the provider gave no usable answer for;
/// `Other` keeps an unexpected label verbatim so it is counted separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unknown,
    Other(String),
}

impl SentimentLabel {
    /// Case-insensitive mapping of an already-trimmed token
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token.is_empty() {
            return SentimentLabel::Unknown;
        }
        match token.to_ascii_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            "neutral" => SentimentLabel::Neutral,
            "unknown" => SentimentLabel::Unknown,
            _ => SentimentLabel::Other(token.to_string()),
        }
    }

    /// Positive and Negative reviews are eligible for insight extraction
    pub fn is_polar(&self) -> bool {
        matches!(self, SentimentLabel::Positive | SentimentLabel::Negative)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Unknown => "Unknown",
            SentimentLabel::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(value: String) -> Self {
        SentimentLabel::parse(&value)
    }
}

impl From<SentimentLabel> for String {
    fn from(value: SentimentLabel) -> Self {
        value.as_str().to_string()
    }
}

/// Review count per label, keys in first-seen order
///
/// Serializes as a JSON object (`{"Positive": 3, "Neutral": 1}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentCounts {
    entries: Vec<(SentimentLabel, usize)>,
}

impl SentimentCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more review with `label`
    pub fn record(&mut self, label: &SentimentLabel) {
        match self.entries.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label.clone(), 1)),
        }
    }

    pub fn get(&self, label: &SentimentLabel) -> usize {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Sum of all counts (number of classified reviews)
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SentimentLabel, usize)> {
        self.entries.iter().map(|(label, count)| (label, *count))
    }
}

impl Serialize for SentimentCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label.as_str(), count)?;
        }
        map.end()
    }
}
