use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Fixed-step placement points: 1st place earns `first_place_points`, every
/// later place `step` fewer, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TraditionalConfig {
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_first_place_points")]
    pub first_place_points: f64,
}

fn default_step() -> f64 {
    5.0
}

fn default_first_place_points() -> f64 {
    100.0
}

impl Default for TraditionalConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            first_place_points: default_first_place_points(),
        }
    }
}

/// Which slice of the scored field the P-Score median is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedianField {
    #[default]
    TopHalf,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PScoreConfig {
    #[serde(default = "default_true")]
    pub allow_negatives: bool,
    #[serde(default)]
    pub median_field: MedianField,
}

fn default_true() -> bool {
    true
}

impl Default for PScoreConfig {
    fn default() -> Self {
        Self {
            allow_negatives: true,
            median_field: MedianField::TopHalf,
        }
    }
}

/// Placement table a custom config falls back to for places it does not override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseTemplate {
    Traditional,
    WinnerTakesMore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomTableConfig {
    pub base_template: BaseTemplate,
    /// Place (1-based) to points.
    #[serde(default)]
    pub overrides: BTreeMap<u32, f64>,
}

/// Scoring algorithm together with the settings only it uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    Traditional(TraditionalConfig),
    PScore(PScoreConfig),
    WinnerTakesMore,
    /// Points equal place; the lowest total wins.
    Online,
    Custom {
        table: CustomTableConfig,
        /// Used when `table.base_template` is traditional.
        traditional: TraditionalConfig,
    },
}

/// Name of an algorithm as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Traditional,
    PScore,
    WinnerTakesMore,
    Online,
    Custom,
}

impl Algorithm {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::Traditional(_) => AlgorithmKind::Traditional,
            Algorithm::PScore(_) => AlgorithmKind::PScore,
            Algorithm::WinnerTakesMore => AlgorithmKind::WinnerTakesMore,
            Algorithm::Online => AlgorithmKind::Online,
            Algorithm::Custom { .. } => AlgorithmKind::Custom,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Algorithm::Traditional(_) => "Traditional",
            Algorithm::PScore(_) => "P-Score",
            Algorithm::WinnerTakesMore => "Winner Takes More",
            Algorithm::Online => "Online",
            Algorithm::Custom { .. } => "Custom",
        }
    }

    /// Whether a lower points total ranks better.
    pub fn lower_total_wins(&self) -> bool {
        matches!(self, Algorithm::Online)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakMethod {
    #[default]
    Countback,
    HeadToHead,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TiebreakerConfig {
    #[serde(default)]
    pub primary: TiebreakMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<TiebreakMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_to_head_event_id: Option<String>,
}

impl TiebreakerConfig {
    pub fn uses_head_to_head(&self) -> bool {
        self.primary == TiebreakMethod::HeadToHead || self.secondary == Some(TiebreakMethod::HeadToHead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnfPolicy {
    WorstPerformance,
    #[default]
    Zero,
    LastPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsPolicy {
    WorstPerformance,
    #[default]
    Zero,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawnPolicy {
    #[default]
    Zero,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusHandling {
    #[serde(default)]
    pub dnf: DnfPolicy,
    #[serde(default)]
    pub dns: DnsPolicy,
    #[serde(default)]
    pub withdrawn: WithdrawnPolicy,
}

/// Complete scoring configuration.
///
/// Stored as camelCase JSON or YAML with an `algorithm` tag and optional
/// sibling blocks:
///
/// ```yaml
/// algorithm: traditional
/// traditional: { step: 5, firstPlacePoints: 100 }
/// tiebreaker: { primary: countback, secondary: head_to_head, headToHeadEventId: final }
/// statusHandling: { dnf: last_place, dns: zero, withdrawn: exclude }
/// ```
///
/// The block matching `algorithm` is required; deserializing a document
/// without it fails with [`ConfigError::MissingAlgorithmConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScoringConfigDocument", into = "ScoringConfigDocument")]
pub struct ScoringConfig {
    pub algorithm: Algorithm,
    pub tiebreaker: TiebreakerConfig,
    pub status_handling: StatusHandling,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Traditional(TraditionalConfig::default()),
            tiebreaker: TiebreakerConfig::default(),
            status_handling: StatusHandling::default(),
        }
    }
}

impl ScoringConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    pub fn can_have_negative_scores(&self) -> bool {
        matches!(self.algorithm, Algorithm::PScore(p) if p.allow_negatives)
    }
}

/// On-disk shape of [`ScoringConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScoringConfigDocument {
    pub algorithm: AlgorithmKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traditional: Option<TraditionalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_score: Option<PScoreConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_table: Option<CustomTableConfig>,
    #[serde(default)]
    pub tiebreaker: TiebreakerConfig,
    #[serde(default)]
    pub status_handling: StatusHandling,
}

impl TryFrom<ScoringConfigDocument> for ScoringConfig {
    type Error = ConfigError;

    fn try_from(doc: ScoringConfigDocument) -> Result<Self, Self::Error> {
        let missing = |algorithm, block| ConfigError::MissingAlgorithmConfig { algorithm, block };

        let algorithm = match doc.algorithm {
            AlgorithmKind::Traditional => Algorithm::Traditional(
                doc.traditional
                    .ok_or_else(|| missing("traditional", "traditional"))?,
            ),
            AlgorithmKind::PScore => {
                Algorithm::PScore(doc.p_score.ok_or_else(|| missing("p_score", "pScore"))?)
            }
            AlgorithmKind::WinnerTakesMore => Algorithm::WinnerTakesMore,
            AlgorithmKind::Online => Algorithm::Online,
            AlgorithmKind::Custom => Algorithm::Custom {
                table: doc
                    .custom_table
                    .ok_or_else(|| missing("custom", "customTable"))?,
                traditional: doc.traditional.unwrap_or_default(),
            },
        };

        Ok(ScoringConfig {
            algorithm,
            tiebreaker: doc.tiebreaker,
            status_handling: doc.status_handling,
        })
    }
}

impl From<ScoringConfig> for ScoringConfigDocument {
    fn from(config: ScoringConfig) -> Self {
        let mut doc = ScoringConfigDocument {
            algorithm: config.algorithm.kind(),
            traditional: None,
            p_score: None,
            custom_table: None,
            tiebreaker: config.tiebreaker,
            status_handling: config.status_handling,
        };
        match config.algorithm {
            Algorithm::Traditional(t) => doc.traditional = Some(t),
            Algorithm::PScore(p) => doc.p_score = Some(p),
            Algorithm::WinnerTakesMore | Algorithm::Online => {}
            Algorithm::Custom { table, traditional } => {
                if table.base_template == BaseTemplate::Traditional {
                    doc.traditional = Some(traditional);
                }
                doc.custom_table = Some(table);
            }
        }
        doc
    }
}
