use serde::{Deserialize, Serialize};

use super::scheme::{Canonical, DistanceUnit, Scheme, WeightUnit};
use crate::error::ScoreError;

/// Width of the reps field inside an encoded rounds+reps value.
pub const ROUNDS_FACTOR: i64 = 100_000;

/// A canonical, sortable score value together with the scheme it was encoded for.
///
/// For a fixed scheme, integer order matches performance order in the
/// scheme's direction: milliseconds for time, grams for load, millimeters for
/// distance, `rounds * 100000 + reps` for rounds+reps and plain counts for
/// everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedScore {
    pub value: i64,
    pub scheme: Scheme,
}

impl EncodedScore {
    pub fn new(value: i64, scheme: Scheme) -> Self {
        Self { value, scheme }
    }
}

/// A typed performance measurement, before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Performance {
    Elapsed { minutes: i64, seconds: i64, millis: i64 },
    RoundsReps { rounds: u64, reps: u64 },
    /// Weight in `UnitOptions::weight_unit`.
    Weight(f64),
    /// Distance in `UnitOptions::distance_unit`, or the scheme's own unit.
    Distance(f64),
    Count(i64),
    Pass(bool),
}

impl Performance {
    fn kind(&self) -> &'static str {
        match self {
            Performance::Elapsed { .. } => "elapsed time",
            Performance::RoundsReps { .. } => "rounds+reps",
            Performance::Weight(_) => "weight",
            Performance::Distance(_) => "distance",
            Performance::Count(_) => "count",
            Performance::Pass(_) => "pass/fail",
        }
    }
}

/// Units used when converting to and from canonical storage units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitOptions {
    #[serde(default)]
    pub weight_unit: WeightUnit,
    /// Overrides the distance scheme's own unit family when set.
    #[serde(default)]
    pub distance_unit: Option<DistanceUnit>,
}

impl UnitOptions {
    pub fn distance_unit_for(&self, scheme: Scheme) -> DistanceUnit {
        match (self.distance_unit, scheme) {
            (Some(unit), _) => unit,
            (None, Scheme::Distance(family)) => family.display_unit(),
            (None, _) => DistanceUnit::Meters,
        }
    }
}

/// Options for turning an encoded value back into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub units: UnitOptions,
    pub include_unit: bool,
    /// Rounds+reps shows rounds only when the reps part is zero.
    pub compact: bool,
}

/// Round half up, the single rounding rule used for every canonical conversion.
pub(crate) fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Encode a typed performance for `scheme`.
///
/// Negative durations clamp to zero. Negative weights and distances are
/// rejected, as is a reps part that would overflow the rounds+reps field.
pub fn encode(value: Performance, scheme: Scheme, opts: &UnitOptions) -> Result<EncodedScore, ScoreError> {
    let mismatch = || ScoreError::SchemeMismatch {
        scheme: scheme.to_string(),
        kind: value.kind(),
    };

    let encoded = match (scheme.canonical(), value) {
        (Canonical::Milliseconds, Performance::Elapsed { minutes, seconds, millis }) => {
            let total = minutes
                .saturating_mul(60_000)
                .saturating_add(seconds.saturating_mul(1000))
                .saturating_add(millis);
            total.max(0)
        }
        (Canonical::RoundsReps, Performance::RoundsReps { rounds, reps }) => {
            encode_rounds_reps(rounds, reps)?
        }
        (Canonical::Grams, Performance::Weight(w)) => {
            non_negative(scheme, w)?;
            round_half_up(w * opts.weight_unit.grams_per_unit())
        }
        (Canonical::Millimeters, Performance::Distance(d)) => {
            non_negative(scheme, d)?;
            round_half_up(d * opts.distance_unit_for(scheme).millimeters_per_unit())
        }
        (Canonical::Count, Performance::Pass(passed)) if scheme == Scheme::PassFail => {
            i64::from(passed)
        }
        (Canonical::Count, Performance::Count(n)) => {
            if n < 0 && scheme != Scheme::Points {
                return Err(ScoreError::NegativeValue {
                    scheme: scheme.to_string(),
                    value: n as f64,
                });
            }
            n
        }
        _ => return Err(mismatch()),
    };

    Ok(EncodedScore::new(encoded, scheme))
}

fn non_negative(scheme: Scheme, value: f64) -> Result<(), ScoreError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ScoreError::NegativeValue {
            scheme: scheme.to_string(),
            value,
        });
    }
    Ok(())
}

pub(crate) fn encode_rounds_reps(rounds: u64, reps: u64) -> Result<i64, ScoreError> {
    if reps >= ROUNDS_FACTOR as u64 {
        return Err(ScoreError::RepsOverflow { reps });
    }
    let rounds = i64::try_from(rounds).map_err(|_| ScoreError::RepsOverflow { reps })?;
    Ok(rounds.saturating_mul(ROUNDS_FACTOR) + reps as i64)
}

/// Split an encoded rounds+reps value into `(rounds, reps)`.
pub fn split_rounds_reps(encoded: i64) -> (i64, i64) {
    let encoded = encoded.max(0);
    (encoded / ROUNDS_FACTOR, encoded % ROUNDS_FACTOR)
}

/// Encode a plain number given in the scheme's natural input unit.
///
/// Time is in seconds, load and distance in the configured units, counts as
/// is. Rounds+reps has no scalar unit, so the number is taken to be already
/// in `rounds * 100000 + reps` form.
pub fn encode_number(value: f64, scheme: Scheme, opts: &UnitOptions) -> Result<EncodedScore, ScoreError> {
    if !value.is_finite() {
        return Err(ScoreError::invalid(scheme, &value.to_string(), "not a finite number"));
    }

    let encoded = match scheme.canonical() {
        Canonical::Milliseconds => round_half_up(value * 1000.0).max(0),
        Canonical::RoundsReps => {
            non_negative(scheme, value)?;
            round_half_up(value)
        }
        Canonical::Grams => {
            non_negative(scheme, value)?;
            round_half_up(value * opts.weight_unit.grams_per_unit())
        }
        Canonical::Millimeters => {
            non_negative(scheme, value)?;
            round_half_up(value * opts.distance_unit_for(scheme).millimeters_per_unit())
        }
        Canonical::Count => {
            if value < 0.0 && scheme != Scheme::Points {
                return Err(ScoreError::NegativeValue {
                    scheme: scheme.to_string(),
                    value,
                });
            }
            round_half_up(value)
        }
    };

    Ok(EncodedScore::new(encoded, scheme))
}

/// Decode to a number in the caller's unit, converting through the canonical unit.
///
/// The inverse of [`encode_number`]: seconds for time, weight or distance
/// units from `opts`, raw counts otherwise.
pub fn decode_to_number(encoded: i64, scheme: Scheme, opts: &UnitOptions) -> f64 {
    match scheme.canonical() {
        Canonical::Milliseconds => encoded.max(0) as f64 / 1000.0,
        Canonical::Grams => encoded as f64 / opts.weight_unit.grams_per_unit(),
        Canonical::Millimeters => encoded as f64 / opts.distance_unit_for(scheme).millimeters_per_unit(),
        Canonical::RoundsReps | Canonical::Count => encoded as f64,
    }
}

/// Decode an encoded value into display text.
pub fn decode(encoded: i64, scheme: Scheme, opts: &DecodeOptions) -> String {
    let units = &opts.units;
    match scheme.canonical() {
        Canonical::Milliseconds => format_duration_ms(encoded),
        Canonical::RoundsReps => {
            let (rounds, reps) = split_rounds_reps(encoded);
            if opts.compact && reps == 0 {
                rounds.to_string()
            } else {
                format!("{}+{}", rounds, reps)
            }
        }
        Canonical::Grams => {
            let unit = units.weight_unit;
            let text = format_decimal(encoded as f64 / unit.grams_per_unit(), weight_decimals(unit));
            with_unit(text, unit.suffix(), opts.include_unit, " ")
        }
        Canonical::Millimeters => {
            let unit = units.distance_unit_for(scheme);
            let text = format_decimal(
                encoded as f64 / unit.millimeters_per_unit(),
                distance_decimals(unit),
            );
            with_unit(text, unit.suffix(), opts.include_unit, "")
        }
        Canonical::Count => {
            let text = encoded.to_string();
            match scheme {
                Scheme::PassFail if opts.include_unit => {
                    let noun = if encoded == 1 { "pass" } else { "passes" };
                    format!("{} {}", text, noun)
                }
                Scheme::Reps => with_unit(text, "reps", opts.include_unit, " "),
                Scheme::Calories => with_unit(text, "cal", opts.include_unit, " "),
                Scheme::Points => with_unit(text, "pts", opts.include_unit, " "),
                _ => text,
            }
        }
    }
}

fn with_unit(text: String, suffix: &str, include: bool, separator: &str) -> String {
    if include {
        format!("{}{}{}", text, separator, suffix)
    } else {
        text
    }
}

// Enough decimals that one canonical step survives the trip through display text.
fn weight_decimals(unit: WeightUnit) -> u32 {
    match unit {
        WeightUnit::Lbs => 3,
        WeightUnit::Kg => 3,
    }
}

fn distance_decimals(unit: DistanceUnit) -> u32 {
    match unit {
        DistanceUnit::Meters => 3,
        DistanceUnit::Feet => 3,
        DistanceUnit::Kilometers => 6,
    }
}

/// Format with at most `decimals` places, rounding half up and trimming zeros.
fn format_decimal(value: f64, decimals: u32) -> String {
    let scale = 10_i64.pow(decimals);
    let scaled = round_half_up(value * scale as f64);
    let whole = scaled.div_euclid(scale);
    let frac = scaled.rem_euclid(scale);
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Format milliseconds as `M:SS` or `M:SS.mmm`. Minutes are not wrapped into hours.
pub fn format_duration_ms(ms: i64) -> String {
    let ms = ms.max(0);
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    if millis == 0 {
        format!("{}:{:02}", minutes, seconds)
    } else {
        format!("{}:{:02}.{:03}", minutes, seconds, millis)
    }
}
