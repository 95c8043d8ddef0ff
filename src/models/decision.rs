//! Decision model

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Scores strictly above this are accepted
pub const ACCEPTANCE_THRESHOLD: f64 = 0.51;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn from_score(score: f64) -> Self {
        if score > ACCEPTANCE_THRESHOLD {
            Decision::Accepted
        } else {
            Decision::Rejected
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Upstream score as sent, so an integer stays an integer
    pub score: Number,
    pub decision: Decision,
}

/// Client payload has a `score` that is not a number
#[derive(Debug, thiserror::Error)]
#[error("client score is not numeric: {0}")]
pub struct InvalidScore(pub Value);

impl Prediction {
    /// Derive a prediction from an upstream client record.
    ///
    /// A missing or null `score` counts as 0.
    pub fn from_client(client: &Value) -> Result<Self, InvalidScore> {
        let score = match client.get("score") {
            None | Some(Value::Null) => Number::from(0),
            Some(Value::Number(n)) => n.clone(),
            Some(raw) => return Err(InvalidScore(raw.clone())),
        };
        let value = score.as_f64().ok_or_else(|| InvalidScore(Value::Number(score.clone())))?;

        Ok(Self {
            decision: Decision::from_score(value),
            score,
        })
    }
}
