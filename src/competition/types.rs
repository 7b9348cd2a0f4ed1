use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::error::ConfigError;
use crate::score::{Scheme, ScoreType, SetRecord, UnitOptions};
use crate::scoring::ScoringConfig;

/// A competition document: events, registered athletes and their results.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Competition {
    #[serde(default)]
    pub name: Option<String>,
    /// Overrides the user config's scoring block.
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub units: UnitOptions,
    pub events: Vec<EventSpec>,
    #[serde(default)]
    pub athletes: Vec<Athlete>,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub scheme: Scheme,
    #[serde(default)]
    pub score_type: Option<ScoreType>,
    /// Written as a duration such as `15m` or `12m 30s`.
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub time_cap: Option<Duration>,
    #[serde(default)]
    pub tiebreak_scheme: Option<Scheme>,
    /// Percentage applied to this event's points.
    #[serde(default = "default_multiplier")]
    pub points_multiplier: f64,
}

fn default_multiplier() -> f64 {
    100.0
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom))
        .transpose()
}

impl EventSpec {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn time_cap_ms(&self) -> Option<i64> {
        self.time_cap.map(|d| d.as_millis() as i64)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Athlete {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_division")]
    pub division: String,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
}

fn default_division() -> String {
    "open".to_string()
}

impl Athlete {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Status written on a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    #[default]
    Scored,
    Cap,
    Dq,
    Withdrawn,
    Dnf,
    Dns,
}

/// One athlete's result for one event.
///
/// The performance comes from `sets`, `rounds` or `raw`, checked in that
/// order. For a capped result `raw` holds the reps completed.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultRecord {
    pub athlete: String,
    pub event: String,
    #[serde(default)]
    pub status: ResultStatus,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
    #[serde(default)]
    pub rounds: Vec<String>,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub tiebreak: Option<String>,
}

impl Competition {
    pub fn event(&self, id: &str) -> Result<&EventSpec, ConfigError> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ConfigError::UnknownEvent(id.to_string()))
    }

    pub fn athlete(&self, id: &str) -> Option<&Athlete> {
        self.athletes.iter().find(|a| a.id == id)
    }

    /// Divisions in order of first appearance.
    pub fn divisions(&self) -> Vec<&str> {
        let mut divisions: Vec<&str> = Vec::new();
        for athlete in &self.athletes {
            if !divisions.contains(&athlete.division.as_str()) {
                divisions.push(&athlete.division);
            }
        }
        divisions
    }

    /// Athletes of a division in registration order: timestamped
    /// registrations first by time, then the rest in document order.
    pub fn athletes_in(&self, division: &str) -> Vec<&Athlete> {
        let mut athletes: Vec<&Athlete> = self.athletes.iter().filter(|a| a.division == division).collect();
        athletes.sort_by_key(|a| (a.registered_at.is_none(), a.registered_at));
        athletes
    }

    /// The result recorded for an athlete in an event. A later row replaces
    /// an earlier one.
    pub fn result_for(&self, athlete: &str, event: &str) -> Option<&ResultRecord> {
        self.results
            .iter()
            .rev()
            .find(|r| r.athlete == athlete && r.event == event)
    }
}
