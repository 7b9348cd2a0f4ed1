pub mod config;
pub mod engine;
pub mod legacy;
pub mod points;
pub mod standings;
pub mod status;
pub mod tiebreak;
pub mod validation;

pub use config::*;
pub use engine::{EventEntry, Outcome, RankedEntry, RankingEngine, Standing};
pub use legacy::{load_legacy_settings, migrate_legacy, save_scoring_config, LegacyScoringSettings};
pub use points::{apply_multiplier, p_scores, placement_curve, PointsCurve, WinnerTakesMoreTable, WINNER_TAKES_MORE_TABLE};
pub use standings::{collect_placements, compute_standings, EventResults, StandingsRow};
pub use status::{resolve, NonFinish, Resolution, Treatment};
pub use tiebreak::{shared_places, DecidedBy, Placements, TiebreakResolver, TiebreakTrace};
pub use validation::{validate_scoring, validate_scoring_for_events};
