use serde::{Deserialize, Serialize};

use super::codec::{decode, split_rounds_reps, DecodeOptions, UnitOptions};
use super::scheme::{DistanceUnit, Scheme, ScoreStatus, ScoreType, WeightUnit};

/// Time-cap context for a capped result: the cap itself plus the secondary
/// measurement (usually reps completed) the athlete is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCap {
    pub ms: i64,
    #[serde(default = "default_secondary_scheme")]
    pub secondary_scheme: Scheme,
    pub secondary_value: Option<i64>,
}

fn default_secondary_scheme() -> Scheme {
    Scheme::Reps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tiebreak {
    pub scheme: Scheme,
    pub value: i64,
}

/// A recorded score as it is displayed and sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub scheme: Scheme,
    pub score_type: ScoreType,
    /// `None` is only meaningful when `status` is not `Scored`.
    pub value: Option<i64>,
    #[serde(default)]
    pub status: ScoreStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_cap: Option<TimeCap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiebreak: Option<Tiebreak>,
}

impl Score {
    pub fn scored(scheme: Scheme, value: i64) -> Self {
        Self {
            scheme,
            score_type: scheme.default_score_type(),
            value: Some(value),
            status: ScoreStatus::Scored,
            time_cap: None,
            tiebreak: None,
        }
    }

    pub fn capped(scheme: Scheme, cap_ms: i64, reps: i64) -> Self {
        Self {
            scheme,
            score_type: scheme.default_score_type(),
            value: Some(cap_ms),
            status: ScoreStatus::Cap,
            time_cap: Some(TimeCap {
                ms: cap_ms,
                secondary_scheme: Scheme::Reps,
                secondary_value: Some(reps),
            }),
            tiebreak: None,
        }
    }

    pub fn with_status(scheme: Scheme, status: ScoreStatus) -> Self {
        Self {
            scheme,
            score_type: scheme.default_score_type(),
            value: None,
            status,
            time_cap: None,
            tiebreak: None,
        }
    }

    pub fn with_tiebreak(mut self, scheme: Scheme, value: i64) -> Self {
        self.tiebreak = Some(Tiebreak { scheme, value });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub weight_unit: WeightUnit,
    pub distance_unit: Option<DistanceUnit>,
    pub include_unit: bool,
    pub show_status: bool,
    pub compact: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::default(),
            distance_unit: None,
            include_unit: false,
            show_status: true,
            compact: false,
        }
    }
}

impl FormatOptions {
    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            units: UnitOptions {
                weight_unit: self.weight_unit,
                distance_unit: self.distance_unit,
            },
            include_unit: self.include_unit,
            compact: self.compact,
        }
    }
}

/// Render a score for display. Pure: identical input gives identical output.
pub fn format_score(score: &Score, opts: &FormatOptions) -> String {
    match score.status {
        ScoreStatus::Dq => "DQ".to_string(),
        ScoreStatus::Withdrawn => "WD".to_string(),
        ScoreStatus::Cap => format_capped(score, opts),
        ScoreStatus::Scored => match score.value {
            Some(value) => format_value(value, score.scheme, opts),
            None => "N/A".to_string(),
        },
    }
}

fn format_capped(score: &Score, opts: &FormatOptions) -> String {
    let secondary = score
        .time_cap
        .and_then(|cap| cap.secondary_value.map(|v| (cap.secondary_scheme, v)));

    let Some((scheme, value)) = secondary else {
        return "CAP".to_string();
    };

    let with_unit = FormatOptions {
        include_unit: true,
        ..*opts
    };
    let text = format_value(value, scheme, &with_unit);
    if opts.show_status {
        format!("CAP ({})", text)
    } else {
        text
    }
}

/// Decode a single value for display. Rounds+reps pads rounds to two digits.
fn format_value(value: i64, scheme: Scheme, opts: &FormatOptions) -> String {
    if scheme == Scheme::RoundsReps {
        let (rounds, reps) = split_rounds_reps(value);
        if opts.compact && reps == 0 {
            return format!("{:02}", rounds);
        }
        return format!("{:02}+{}", rounds, reps);
    }
    decode(value, scheme, &opts.decode_options())
}

/// Like [`format_score`], with ` (TB: ...)` appended when a tiebreak is recorded.
///
/// The tiebreak decodes with its own scheme, never the primary one.
pub fn format_score_with_tiebreak(score: &Score, opts: &FormatOptions) -> String {
    let main = format_score(score, opts);
    match score.tiebreak {
        Some(tiebreak) => {
            let plain = FormatOptions {
                include_unit: false,
                ..*opts
            };
            format!("{} (TB: {})", main, format_value(tiebreak.value, tiebreak.scheme, &plain))
        }
        None => main,
    }
}

/// One round of an interval workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRound {
    pub round_number: u32,
    pub value: i64,
    #[serde(default)]
    pub status: ScoreStatus,
    #[serde(default)]
    pub secondary_value: Option<i64>,
}

impl ScoreRound {
    pub fn new(round_number: u32, value: i64) -> Self {
        Self {
            round_number,
            value,
            status: ScoreStatus::Scored,
            secondary_value: None,
        }
    }
}

/// Format a per-round breakdown. Non-scored rounds render as `STATUS (secondary)`,
/// with the secondary value in reps as for a capped score.
pub fn format_rounds(rounds: &[ScoreRound], scheme: Scheme, opts: &FormatOptions) -> Vec<String> {
    let with_unit = FormatOptions {
        include_unit: true,
        ..*opts
    };
    rounds
        .iter()
        .map(|round| match (round.status.badge(), round.secondary_value) {
            (Some(badge), Some(secondary)) => {
                format!("{} ({})", badge, format_value(secondary, Scheme::Reps, &with_unit))
            }
            (Some(badge), None) => badge.to_string(),
            (None, _) => decode(round.value, scheme, &opts.decode_options()),
        })
        .collect()
}
