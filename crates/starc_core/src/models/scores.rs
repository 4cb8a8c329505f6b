//! Score payloads and the normalized [`ScoreSet`].

use crate::constants::SCORE_MAX;
use serde::{Deserialize, Serialize};

/// The four derived tone metrics for a document, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub overall: f64,
    pub optimism: f64,
    pub confidence: f64,
    pub forecast: f64,
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, SCORE_MAX)
    }
}

impl ScoreSet {
    /// Build a score set, clamping each value into `[0, 100]` (NaN becomes 0).
    pub fn new(overall: f64, optimism: f64, confidence: f64, forecast: f64) -> Self {
        Self {
            overall: clamp_score(overall),
            optimism: clamp_score(optimism),
            confidence: clamp_score(confidence),
            forecast: clamp_score(forecast),
        }
    }

    /// Build from the API's positional order: overall, optimism, forecast, confidence.
    pub fn from_positional(values: [f64; 4]) -> Self {
        let [overall, optimism, forecast, confidence] = values;
        Self::new(overall, optimism, confidence, forecast)
    }

    /// Values rounded to whole percentages for display.
    pub fn rounded(&self) -> [i64; 4] {
        [
            self.overall.round() as i64,
            self.optimism.round() as i64,
            self.confidence.round() as i64,
            self.forecast.round() as i64,
        ]
    }
}

/// Field-named score object, as returned by `GET /docs/scores/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NamedScores {
    #[serde(alias = "overall", alias = "Overall")]
    pub score: f64,
    pub optimism: f64,
    pub forecast: f64,
    pub confidence: f64,
}

impl From<NamedScores> for ScoreSet {
    fn from(value: NamedScores) -> Self {
        ScoreSet::new(
            value.score,
            value.optimism,
            value.confidence,
            value.forecast,
        )
    }
}

/// Any score shape the API emits.
///
/// Variant order matters for untagged matching: a four-number array must be
/// read positionally before falling back to object forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScorePayload {
    /// `[overall, optimism, forecast, confidence]`.
    Positional([f64; 4]),
    /// `[{score, optimism, forecast, confidence}, ...]`; the first entry wins.
    List(Vec<NamedScores>),
    /// `{score, optimism, forecast, confidence}`.
    Named(NamedScores),
}

impl ScorePayload {
    /// Normalize into a [`ScoreSet`].
    ///
    /// # Returns
    /// `None` for an empty list.
    pub fn normalize(&self) -> Option<ScoreSet> {
        match self {
            Self::Positional(values) => Some(ScoreSet::from_positional(*values)),
            Self::List(items) => items.first().copied().map(ScoreSet::from),
            Self::Named(named) => Some(ScoreSet::from(*named)),
        }
    }
}

impl From<ScoreSet> for ScorePayload {
    fn from(value: ScoreSet) -> Self {
        Self::Named(NamedScores {
            score: value.overall,
            optimism: value.optimism,
            forecast: value.forecast,
            confidence: value.confidence,
        })
    }
}
