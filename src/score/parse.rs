use super::codec::{encode, encode_rounds_reps, EncodedScore, Performance, UnitOptions};
use super::scheme::{Canonical, DistanceUnit, Scheme, ScoreType, WeightUnit};
use crate::error::ScoreError;

/// Parse user-entered score text for `scheme` into an encoded value.
///
/// Accepted forms:
/// - time: `12:34`, `12:34.5`, `1:02:03`, or bare digits read as `MMSS` (`1234` is 12:34)
/// - rounds+reps: `5+12`, or a bare number of reps
/// - load and distance: a decimal number, optionally suffixed with a unit (`100kg`, `30 ft`)
/// - counts: an integer
/// - pass/fail: `pass`/`p`/`1`, `fail`/`f`/`0`, or a count of passes
pub fn parse_score(raw: &str, scheme: Scheme, opts: &UnitOptions) -> Result<EncodedScore, ScoreError> {
    let input = raw.trim().to_ascii_lowercase();
    if input.is_empty() {
        return Err(ScoreError::invalid(scheme, raw, "empty score"));
    }

    match scheme.canonical() {
        Canonical::Milliseconds => {
            let ms = parse_duration_ms(&input).map_err(|reason| ScoreError::invalid(scheme, raw, reason))?;
            Ok(EncodedScore::new(ms, scheme))
        }
        Canonical::RoundsReps => {
            let (rounds, reps) = parse_rounds_reps(&input).map_err(|reason| ScoreError::invalid(scheme, raw, reason))?;
            Ok(EncodedScore::new(encode_rounds_reps(rounds, reps)?, scheme))
        }
        Canonical::Grams => {
            let (number, suffix) = split_unit_suffix(&input);
            let value = parse_decimal(number).map_err(|reason| ScoreError::invalid(scheme, raw, reason))?;
            let mut units = *opts;
            if !suffix.is_empty() {
                units.weight_unit = WeightUnit::parse(suffix)
                    .ok_or_else(|| ScoreError::invalid(scheme, raw, format!("unknown weight unit '{}'", suffix)))?;
            }
            encode(Performance::Weight(value), scheme, &units)
        }
        Canonical::Millimeters => {
            let (number, suffix) = split_unit_suffix(&input);
            let value = parse_decimal(number).map_err(|reason| ScoreError::invalid(scheme, raw, reason))?;
            let mut units = *opts;
            if !suffix.is_empty() {
                units.distance_unit = Some(
                    DistanceUnit::parse(suffix)
                        .ok_or_else(|| ScoreError::invalid(scheme, raw, format!("unknown distance unit '{}'", suffix)))?,
                );
            }
            encode(Performance::Distance(value), scheme, &units)
        }
        Canonical::Count => {
            if scheme == Scheme::PassFail {
                match input.as_str() {
                    "pass" | "p" => return encode(Performance::Pass(true), scheme, opts),
                    "fail" | "f" => return encode(Performance::Pass(false), scheme, opts),
                    _ => {}
                }
            }
            let (number, _) = split_unit_suffix(&input);
            let count = number
                .parse::<i64>()
                .map_err(|_| ScoreError::invalid(scheme, raw, "expected a whole number"))?;
            encode(Performance::Count(count), scheme, opts)
        }
    }
}

/// Parse a tiebreak value. Tiebreaks are recorded either as a time or as reps.
pub fn parse_tiebreak(raw: &str, scheme: Scheme) -> Result<EncodedScore, ScoreError> {
    match scheme {
        Scheme::Time | Scheme::Reps => parse_score(raw, scheme, &UnitOptions::default()),
        other => Err(ScoreError::UnsupportedScheme(format!(
            "{} (tiebreaks are time or reps)",
            other
        ))),
    }
}

fn parse_duration_ms(input: &str) -> Result<i64, String> {
    if input.starts_with('-') {
        // Negative durations clamp to zero rather than erroring.
        return parse_duration_ms(&input[1..]).map(|_| 0);
    }

    if !input.contains(':') {
        if input.chars().all(|c| c.is_ascii_digit()) {
            return digits_as_minutes_seconds(input);
        }
        return Err("expected M:SS, H:MM:SS or digits".to_string());
    }

    let (clock, fraction) = match input.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (input, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let fields = parts.iter().map(|p| clock_field(p)).collect::<Result<Vec<_>, _>>()?;

    let (hours, minutes, seconds) = match fields.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => {
            if *m >= 60 {
                return Err("minutes must be below 60".to_string());
            }
            (*h, *m, *s)
        }
        _ => return Err("too many ':' separators".to_string()),
    };

    if seconds >= 60 {
        return Err("seconds must be below 60".to_string());
    }

    let millis = match fraction {
        Some(f) => parse_fraction_ms(f)?,
        None => 0,
    };

    clock_ms(hours, minutes, seconds)?
        .checked_add(millis)
        .ok_or_else(|| "duration is too large".to_string())
}

// Clock fields are unsigned digits only; a sign inside a field is malformed.
fn clock_field(field: &str) -> Result<i64, String> {
    let field = field.trim();
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' is not a number", field));
    }
    field.parse::<i64>().map_err(|_| "duration is too large".to_string())
}

fn clock_ms(hours: i64, minutes: i64, seconds: i64) -> Result<i64, String> {
    hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(minutes))
        .and_then(|m| m.checked_mul(60))
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(1000))
        .ok_or_else(|| "duration is too large".to_string())
}

// "1234" is 12:34, "234" is 2:34, "34" is 0:34.
fn digits_as_minutes_seconds(input: &str) -> Result<i64, String> {
    let split = input.len().saturating_sub(2);
    let minutes = if split == 0 { 0 } else { clock_field(&input[..split])? };
    let seconds = clock_field(&input[split..])?;
    if seconds >= 60 {
        return Err("seconds must be below 60".to_string());
    }
    clock_ms(0, minutes, seconds)
}

fn parse_fraction_ms(fraction: &str) -> Result<i64, String> {
    if fraction.is_empty() || fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err("fractional seconds must be 1 to 3 digits".to_string());
    }
    let padded = format!("{:0<3}", fraction);
    padded.parse::<i64>().map_err(|e| e.to_string())
}

fn parse_rounds_reps(input: &str) -> Result<(u64, u64), String> {
    match input.split_once('+') {
        Some((rounds, reps)) => {
            let rounds = rounds.trim().parse::<u64>().map_err(|_| "invalid rounds".to_string())?;
            let reps = reps.trim().parse::<u64>().map_err(|_| "invalid reps".to_string())?;
            Ok((rounds, reps))
        }
        None => {
            let (number, _) = split_unit_suffix(input);
            let reps = number.parse::<u64>().map_err(|_| "expected R+r or a rep count".to_string())?;
            Ok((0, reps))
        }
    }
}

fn parse_decimal(input: &str) -> Result<f64, String> {
    let value = input
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", input))?;
    if !value.is_finite() {
        return Err("not a finite number".to_string());
    }
    Ok(value)
}

/// Split `"100kg"` / `"100 kg"` into `("100", "kg")`.
fn split_unit_suffix(input: &str) -> (&str, &str) {
    let idx = input
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    (input[..idx].trim(), input[idx..].trim())
}

/// Reduce already-encoded values with `score_type`. Empty input yields `None`.
///
/// `average` is the mean rounded half up to a whole canonical unit.
pub fn aggregate_values(values: &[i64], score_type: ScoreType) -> Option<i64> {
    let first = *values.first()?;
    let result = match score_type {
        ScoreType::Min => values.iter().copied().min().unwrap_or(first),
        ScoreType::Max => values.iter().copied().max().unwrap_or(first),
        ScoreType::Sum => values.iter().fold(0_i64, |acc, v| acc.saturating_add(*v)),
        ScoreType::Average => {
            let sum: i128 = values.iter().map(|v| *v as i128).sum();
            let n = values.len() as i128;
            ((2 * sum + n).div_euclid(2 * n)) as i64
        }
        ScoreType::First => first,
        ScoreType::Last => *values.last().unwrap_or(&first),
    };
    Some(result)
}

/// Per-round encoded values plus their aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRounds {
    pub rounds: Vec<i64>,
    pub aggregated: Option<i64>,
}

/// Parse and encode each round of a multi-round workout, then aggregate.
///
/// `score_type` falls back to the scheme's default. Any malformed round
/// fails the whole set.
pub fn encode_rounds<S: AsRef<str>>(
    rounds: &[S],
    scheme: Scheme,
    score_type: Option<ScoreType>,
    opts: &UnitOptions,
) -> Result<EncodedRounds, ScoreError> {
    let encoded = rounds
        .iter()
        .map(|raw| parse_score(raw.as_ref(), scheme, opts).map(|e| e.value))
        .collect::<Result<Vec<_>, _>>()?;
    let score_type = score_type.unwrap_or_else(|| scheme.default_score_type());
    let aggregated = aggregate_values(&encoded, score_type);
    Ok(EncodedRounds {
        rounds: encoded,
        aggregated,
    })
}
