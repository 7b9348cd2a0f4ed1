use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use super::config::{Algorithm, ScoringConfig, TraditionalConfig};

const DEFAULT_STEP: f64 = 5.0;

/// Scoring settings stored by older competitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegacyScoringSettings {
    WinnerTakesMore,
    /// Linear spread from 100 down to 0 across the division.
    EvenSpread,
    FixedStep {
        #[serde(default)]
        step: Option<f64>,
    },
}

/// Translate legacy settings to the current shape.
///
/// `even_spread` depends on the division size. With `athlete_count` it
/// becomes a traditional step of `100 / (n - 1)`; without it the default step
/// is used, which only approximates the old spread.
pub fn migrate_legacy(settings: &LegacyScoringSettings, athlete_count: Option<usize>) -> ScoringConfig {
    let algorithm = match settings {
        LegacyScoringSettings::WinnerTakesMore => Algorithm::WinnerTakesMore,
        LegacyScoringSettings::FixedStep { step } => Algorithm::Traditional(TraditionalConfig {
            step: step.unwrap_or(DEFAULT_STEP),
            ..TraditionalConfig::default()
        }),
        LegacyScoringSettings::EvenSpread => {
            let step = match athlete_count {
                Some(n) if n >= 2 => 100.0 / (n - 1) as f64,
                Some(_) => DEFAULT_STEP,
                None => {
                    warn!("even_spread migrated without an athlete count; using step {DEFAULT_STEP}");
                    DEFAULT_STEP
                }
            };
            Algorithm::Traditional(TraditionalConfig {
                step,
                ..TraditionalConfig::default()
            })
        }
    };
    ScoringConfig::new(algorithm)
}

pub fn load_legacy_settings(path: &Path) -> Result<LegacyScoringSettings> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open legacy scoring settings at {}", path.display()))?;
    serde_json::from_reader(file).context("Failed to parse legacy scoring settings")
}

/// Write a scoring config as pretty JSON, atomically.
pub fn save_scoring_config(path: &Path, config: &ScoringConfig) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, config).context("Failed to serialize scoring config")?;

    file.commit().context("Failed to save scoring config")?;

    Ok(())
}
