//! Min-max scoring.
//!
//! Bounds always come from the whole actual-reading population, never from
//! a filtered subset, so scores from differently filtered queries against
//! the same data line up.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBounds {
    pub min: f64,
    pub max: f64,
}

/// Bounds over the non-null values; `None` when there are none.
pub fn compute_bounds<I>(population: I) -> Option<ScoreBounds>
where
    I: IntoIterator<Item = Option<f64>>,
{
    population
        .into_iter()
        .flatten()
        .fold(None, |bounds: Option<ScoreBounds>, value| {
            Some(match bounds {
                None => ScoreBounds {
                    min: value,
                    max: value,
                },
                Some(b) => ScoreBounds {
                    min: b.min.min(value),
                    max: b.max.max(value),
                },
            })
        })
}

/// `(value - min) / (max - min)`, or `None` when the value is null or the
/// range is empty. Values outside the bounds are not clamped.
pub fn normalize(value: Option<f64>, min: f64, max: f64) -> Option<f64> {
    let value = value?;
    if max > min {
        Some((value - min) / (max - min))
    } else {
        None
    }
}

impl ScoreBounds {
    pub fn score(&self, value: Option<f64>) -> Option<f64> {
        normalize(value, self.min, self.max)
    }
}

/// Score against optional bounds; no bounds means no score.
pub fn percent_score(bounds: Option<&ScoreBounds>, value: Option<f64>) -> Option<f64> {
    bounds.and_then(|b| b.score(value))
}
