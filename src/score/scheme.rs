use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScoreError;

/// Direction in which a scheme's encoded values improve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

impl Direction {
    /// Orders two encoded values so that the better one sorts first.
    pub fn compare(self, a: i64, b: i64) -> std::cmp::Ordering {
        match self {
            Direction::LowerIsBetter => a.cmp(&b),
            Direction::HigherIsBetter => b.cmp(&a),
        }
    }

    /// The worse of two values.
    pub fn worse(self, a: i64, b: i64) -> i64 {
        match self {
            Direction::LowerIsBetter => a.max(b),
            Direction::HigherIsBetter => a.min(b),
        }
    }
}

/// How several attempts are reduced to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Min,
    Max,
    Sum,
    Average,
    First,
    Last,
}

impl ScoreType {
    /// Parse a score type name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Some(ScoreType::Min),
            "max" => Some(ScoreType::Max),
            "sum" => Some(ScoreType::Sum),
            "average" | "avg" => Some(ScoreType::Average),
            "first" => Some(ScoreType::First),
            "last" => Some(ScoreType::Last),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Lbs,
    Kg,
}

impl WeightUnit {
    pub fn grams_per_unit(self) -> f64 {
        match self {
            WeightUnit::Lbs => 453.592,
            WeightUnit::Kg => 1000.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            WeightUnit::Lbs => "lbs",
            WeightUnit::Kg => "kg",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lb" | "lbs" | "pounds" => Some(WeightUnit::Lbs),
            "kg" | "kgs" | "kilograms" => Some(WeightUnit::Kg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[serde(alias = "m")]
    Meters,
    #[serde(alias = "ft")]
    Feet,
    #[serde(alias = "km")]
    Kilometers,
}

impl DistanceUnit {
    pub fn millimeters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1000.0,
            DistanceUnit::Feet => 304.8,
            DistanceUnit::Kilometers => 1_000_000.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Feet => "ft",
            DistanceUnit::Kilometers => "km",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meters" | "metres" => Some(DistanceUnit::Meters),
            "ft" | "feet" => Some(DistanceUnit::Feet),
            "km" | "kilometers" | "kilometres" => Some(DistanceUnit::Kilometers),
            _ => None,
        }
    }
}

/// Unit family a distance workout is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceFamily {
    Meters,
    Feet,
}

impl DistanceFamily {
    pub fn display_unit(self) -> DistanceUnit {
        match self {
            DistanceFamily::Meters => DistanceUnit::Meters,
            DistanceFamily::Feet => DistanceUnit::Feet,
        }
    }
}

/// Workout scoring scheme. Drives encoding, aggregation and ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scheme {
    Time,
    TimeWithCap,
    RoundsReps,
    Reps,
    Load,
    Distance(DistanceFamily),
    Calories,
    Points,
    PassFail,
    Emom,
}

/// Canonical storage unit of an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Canonical {
    Milliseconds,
    RoundsReps,
    Grams,
    Millimeters,
    Count,
}

/// Per-scheme facts every component reads from one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeTraits {
    pub direction: Direction,
    pub default_score_type: ScoreType,
    pub canonical: Canonical,
}

impl Scheme {
    pub const ALL: [Scheme; 11] = [
        Scheme::Time,
        Scheme::TimeWithCap,
        Scheme::RoundsReps,
        Scheme::Reps,
        Scheme::Load,
        Scheme::Distance(DistanceFamily::Meters),
        Scheme::Distance(DistanceFamily::Feet),
        Scheme::Calories,
        Scheme::Points,
        Scheme::PassFail,
        Scheme::Emom,
    ];

    pub fn traits(self) -> SchemeTraits {
        use Canonical::*;
        use Direction::*;
        use ScoreType::*;

        let (direction, default_score_type, canonical) = match self {
            Scheme::Time => (LowerIsBetter, Min, Milliseconds),
            Scheme::TimeWithCap => (LowerIsBetter, Min, Milliseconds),
            Scheme::Emom => (HigherIsBetter, Max, Milliseconds),
            Scheme::RoundsReps => (HigherIsBetter, Max, RoundsReps),
            Scheme::Reps => (HigherIsBetter, Max, Count),
            Scheme::Load => (HigherIsBetter, Max, Grams),
            Scheme::Distance(_) => (HigherIsBetter, Max, Millimeters),
            Scheme::Calories => (HigherIsBetter, Max, Count),
            Scheme::Points => (HigherIsBetter, Max, Count),
            Scheme::PassFail => (HigherIsBetter, First, Count),
        };

        SchemeTraits {
            direction,
            default_score_type,
            canonical,
        }
    }

    pub fn direction(self) -> Direction {
        self.traits().direction
    }

    pub fn default_score_type(self) -> ScoreType {
        self.traits().default_score_type
    }

    pub fn canonical(self) -> Canonical {
        self.traits().canonical
    }

    pub fn is_time_based(self) -> bool {
        self.canonical() == Canonical::Milliseconds
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Time => "time",
            Scheme::TimeWithCap => "time-with-cap",
            Scheme::RoundsReps => "rounds-reps",
            Scheme::Reps => "reps",
            Scheme::Load => "load",
            Scheme::Distance(DistanceFamily::Meters) => "meters",
            Scheme::Distance(DistanceFamily::Feet) => "feet",
            Scheme::Calories => "calories",
            Scheme::Points => "points",
            Scheme::PassFail => "pass-fail",
            Scheme::Emom => "emom",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" | "for-time" => Ok(Scheme::Time),
            "time-with-cap" => Ok(Scheme::TimeWithCap),
            "rounds-reps" | "amrap" => Ok(Scheme::RoundsReps),
            "reps" => Ok(Scheme::Reps),
            "load" => Ok(Scheme::Load),
            "meters" | "distance" => Ok(Scheme::Distance(DistanceFamily::Meters)),
            "feet" => Ok(Scheme::Distance(DistanceFamily::Feet)),
            "calories" => Ok(Scheme::Calories),
            "points" => Ok(Scheme::Points),
            "pass-fail" => Ok(Scheme::PassFail),
            "emom" => Ok(Scheme::Emom),
            _ => Err(ScoreError::UnsupportedScheme(s.to_string())),
        }
    }
}

impl TryFrom<String> for Scheme {
    type Error = ScoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scheme> for String {
    fn from(scheme: Scheme) -> Self {
        scheme.as_str().to_string()
    }
}

/// Result status attached to a recorded score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreStatus {
    #[default]
    Scored,
    Cap,
    Dq,
    Withdrawn,
}

impl ScoreStatus {
    /// Short badge shown next to a score; `None` for plain scored results.
    pub fn badge(self) -> Option<&'static str> {
        match self {
            ScoreStatus::Scored => None,
            ScoreStatus::Cap => Some("CAP"),
            ScoreStatus::Dq => Some("DQ"),
            ScoreStatus::Withdrawn => Some("WD"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreStatus::Scored => "Scored",
            ScoreStatus::Cap => "Time Cap",
            ScoreStatus::Dq => "Disqualified",
            ScoreStatus::Withdrawn => "Withdrawn",
        }
    }

    /// Position of the status class in a leaderboard, best first.
    pub fn sort_order(self) -> u8 {
        match self {
            ScoreStatus::Scored => 0,
            ScoreStatus::Cap => 1,
            ScoreStatus::Dq => 2,
            ScoreStatus::Withdrawn => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_roundtrip_names() {
        for scheme in Scheme::ALL {
            let parsed: Scheme = scheme.as_str().parse().unwrap();
            assert_eq!(parsed, scheme);
        }
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let err = "yoga".parse::<Scheme>().unwrap_err();
        assert_eq!(err, ScoreError::UnsupportedScheme("yoga".to_string()));
    }

    #[test]
    fn test_direction_table() {
        assert_eq!(Scheme::Time.direction(), Direction::LowerIsBetter);
        assert_eq!(Scheme::TimeWithCap.direction(), Direction::LowerIsBetter);
        for scheme in [
            Scheme::RoundsReps,
            Scheme::Reps,
            Scheme::Load,
            Scheme::Distance(DistanceFamily::Feet),
            Scheme::Calories,
            Scheme::Points,
            Scheme::PassFail,
            Scheme::Emom,
        ] {
            assert_eq!(scheme.direction(), Direction::HigherIsBetter, "{}", scheme);
        }
    }

    #[test]
    fn test_default_score_types() {
        assert_eq!(Scheme::Time.default_score_type(), ScoreType::Min);
        assert_eq!(Scheme::TimeWithCap.default_score_type(), ScoreType::Min);
        assert_eq!(Scheme::PassFail.default_score_type(), ScoreType::First);
        assert_eq!(Scheme::RoundsReps.default_score_type(), ScoreType::Max);
        assert_eq!(Scheme::Load.default_score_type(), ScoreType::Max);
        assert_eq!(Scheme::Emom.default_score_type(), ScoreType::Max);
        assert_eq!(
            Scheme::Distance(DistanceFamily::Meters).default_score_type(),
            ScoreType::Max
        );
    }

    #[test]
    fn test_scheme_serde_as_string() {
        let json = serde_json::to_string(&Scheme::TimeWithCap).unwrap();
        assert_eq!(json, "\"time-with-cap\"");
        let parsed: Scheme = serde_json::from_str("\"feet\"").unwrap();
        assert_eq!(parsed, Scheme::Distance(DistanceFamily::Feet));
        assert!(serde_json::from_str::<Scheme>("\"yoga\"").is_err());
    }

    #[test]
    fn test_direction_compare_puts_better_first() {
        use std::cmp::Ordering;
        assert_eq!(Direction::LowerIsBetter.compare(1, 2), Ordering::Less);
        assert_eq!(Direction::HigherIsBetter.compare(1, 2), Ordering::Greater);
        assert_eq!(Direction::LowerIsBetter.worse(1, 2), 2);
        assert_eq!(Direction::HigherIsBetter.worse(1, 2), 1);
    }

    #[test]
    fn test_status_badges() {
        assert_eq!(ScoreStatus::Scored.badge(), None);
        assert_eq!(ScoreStatus::Cap.badge(), Some("CAP"));
        assert_eq!(ScoreStatus::Dq.label(), "Disqualified");
        assert_eq!(ScoreStatus::Withdrawn.badge(), Some("WD"));
        assert!(ScoreStatus::Cap.sort_order() < ScoreStatus::Dq.sort_order());
    }

    #[test]
    fn test_score_type_parse() {
        assert_eq!(ScoreType::parse("AVG"), Some(ScoreType::Average));
        assert_eq!(ScoreType::parse("median"), None);
    }
}
