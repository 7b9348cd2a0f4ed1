use serde::{Deserialize, Serialize};

use super::config::{DnfPolicy, DnsPolicy, StatusHandling, WithdrawnPolicy};
use crate::score::Direction;

/// Encoded value standing in for "zero" on lower-is-better schemes, where a
/// literal 0 would rank best.
pub const ZERO_SENTINEL: i64 = i64::MAX;

/// Ways an athlete can fail to produce a scored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonFinish {
    Dnf,
    Dns,
    Withdrawn,
}

impl NonFinish {
    pub fn badge(self) -> &'static str {
        match self {
            NonFinish::Dnf => "DNF",
            NonFinish::Dns => "DNS",
            NonFinish::Withdrawn => "WD",
        }
    }
}

/// How a resolved entry is treated by the ranking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Treatment {
    /// Ranked just behind the worst scored result.
    WorstPerformance,
    /// Ranked behind every performance and awarded no points.
    Zero,
    /// Appended after every numerically placed entry.
    LastPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Ranked { value: i64, treatment: Treatment },
    Exclude,
}

/// The scheme's "zero" performance: 0 when higher is better, otherwise a
/// value that loses to every real time.
pub fn zero_value(direction: Direction) -> i64 {
    match direction {
        Direction::HigherIsBetter => 0,
        Direction::LowerIsBetter => ZERO_SENTINEL,
    }
}

/// A value one canonical step worse than `worst`.
pub fn beyond_worst(direction: Direction, worst: i64) -> i64 {
    match direction {
        Direction::HigherIsBetter => worst.saturating_sub(1),
        Direction::LowerIsBetter => worst.saturating_add(1),
    }
}

/// Resolve a non-finish status to an effective score or an exclusion.
///
/// `worst_scored` is the worst scored value in the division for this event,
/// if any athlete scored; without one, worst-performance falls back to zero.
pub fn resolve(
    status: NonFinish,
    handling: &StatusHandling,
    direction: Direction,
    worst_scored: Option<i64>,
) -> Resolution {
    let zero = Resolution::Ranked {
        value: zero_value(direction),
        treatment: Treatment::Zero,
    };
    let worst = match worst_scored {
        Some(w) => Resolution::Ranked {
            value: beyond_worst(direction, w),
            treatment: Treatment::WorstPerformance,
        },
        None => zero,
    };

    match status {
        NonFinish::Dnf => match handling.dnf {
            DnfPolicy::WorstPerformance => worst,
            DnfPolicy::Zero => zero,
            DnfPolicy::LastPlace => Resolution::Ranked {
                value: zero_value(direction),
                treatment: Treatment::LastPlace,
            },
        },
        NonFinish::Dns => match handling.dns {
            DnsPolicy::WorstPerformance => worst,
            DnsPolicy::Zero => zero,
            DnsPolicy::Exclude => Resolution::Exclude,
        },
        NonFinish::Withdrawn => match handling.withdrawn {
            WithdrawnPolicy::Zero => zero,
            WithdrawnPolicy::Exclude => Resolution::Exclude,
        },
    }
}
