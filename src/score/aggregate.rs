use serde::{Deserialize, Serialize};

use super::codec::{encode_number, EncodedScore, UnitOptions};
use super::parse::aggregate_values;
use super::scheme::{Scheme, ScoreType};
use crate::error::ScoreError;

/// One recorded attempt. Only the fields relevant to the event's scheme are set.
///
/// Quantities are in natural input units: `time` in seconds, `weight` in the
/// configured weight unit, `distance` in the configured distance unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetRecord {
    #[serde(default)]
    pub reps: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatedScore {
    pub score: Option<EncodedScore>,
    pub is_time_capped: bool,
}

impl AggregatedScore {
    fn empty() -> Self {
        Self {
            score: None,
            is_time_capped: false,
        }
    }
}

/// Reduce several attempts to one encoded score.
///
/// `score_type` falls back to the scheme default. A `time-with-cap` result
/// whose sets carry reps but no time is a capped result: its reps are
/// aggregated with `max` and encoded as a reps score.
pub fn aggregate(
    sets: &[SetRecord],
    scheme: Scheme,
    score_type: Option<ScoreType>,
    opts: &UnitOptions,
) -> Result<AggregatedScore, ScoreError> {
    let capped = scheme == Scheme::TimeWithCap
        && sets.iter().any(|s| s.reps.is_some())
        && sets.iter().all(|s| s.time.is_none());

    let (value_scheme, score_type) = if capped {
        (Scheme::Reps, ScoreType::Max)
    } else {
        (scheme, score_type.unwrap_or_else(|| scheme.default_score_type()))
    };

    let values: Vec<f64> = sets
        .iter()
        .filter_map(|set| select_field(set, scheme, capped))
        .collect();
    if values.is_empty() {
        return Ok(AggregatedScore::empty());
    }

    let encoded = values
        .iter()
        .map(|v| encode_number(*v, value_scheme, opts).map(|e| e.value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AggregatedScore {
        score: aggregate_values(&encoded, score_type).map(|v| EncodedScore::new(v, value_scheme)),
        is_time_capped: capped,
    })
}

fn select_field(set: &SetRecord, scheme: Scheme, capped: bool) -> Option<f64> {
    match scheme {
        Scheme::TimeWithCap if capped => set.reps,
        Scheme::Time | Scheme::TimeWithCap | Scheme::Emom => set.time,
        Scheme::Reps | Scheme::RoundsReps => set.reps.or(set.score),
        Scheme::Load => set.weight,
        Scheme::Calories | Scheme::Distance(_) | Scheme::Points => {
            set.score.or(set.reps).or(set.distance)
        }
        Scheme::PassFail => set.score,
    }
}
