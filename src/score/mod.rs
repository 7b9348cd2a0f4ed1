pub mod aggregate;
pub mod codec;
pub mod format;
pub mod parse;
pub mod scheme;
pub mod sort;

pub use aggregate::{aggregate, AggregatedScore, SetRecord};
pub use codec::{
    decode, decode_to_number, encode, encode_number, format_duration_ms, split_rounds_reps,
    DecodeOptions, EncodedScore, Performance, UnitOptions,
};
pub use format::{
    format_rounds, format_score, format_score_with_tiebreak, FormatOptions, Score, ScoreRound,
    Tiebreak, TimeCap,
};
pub use parse::{aggregate_values, encode_rounds, parse_score, parse_tiebreak, EncodedRounds};
pub use scheme::{
    Direction, DistanceFamily, DistanceUnit, Scheme, ScoreStatus, ScoreType, WeightUnit,
};
pub use sort::{compare_scores, compute_sort_key, find_rank, sort_scores, SortKey};
