use serde::{Deserialize, Serialize};

use crate::score::{DistanceUnit, UnitOptions, WeightUnit};
use crate::scoring::ScoringConfig;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Used when a competition file carries no scoring block of its own.
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub distance_unit: Option<DistanceUnit>,
    #[serde(default)]
    pub compact: bool,
}

impl DisplayConfig {
    pub fn units(&self) -> UnitOptions {
        UnitOptions {
            weight_unit: self.weight_unit,
            distance_unit: self.distance_unit,
        }
    }
}
