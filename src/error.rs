use thiserror::Error;

/// Errors raised while encoding, decoding or parsing a single score.
///
/// These never abort a whole leaderboard: the competition pipeline logs them
/// and renders the affected athlete as `N/A`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid {scheme} score '{input}': {reason}")]
    InvalidInput {
        scheme: String,
        input: String,
        reason: String,
    },

    #[error("reps field overflow: {reps} does not fit below 100000")]
    RepsOverflow { reps: u64 },

    #[error("negative value {value} is not allowed for {scheme}")]
    NegativeValue { scheme: String, value: f64 },

    #[error("value of kind {kind} cannot be encoded as {scheme}")]
    SchemeMismatch { scheme: String, kind: &'static str },
}

impl ScoreError {
    pub(crate) fn invalid(scheme: impl ToString, input: &str, reason: impl Into<String>) -> Self {
        ScoreError::InvalidInput {
            scheme: scheme.to_string(),
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Configuration problems. Surfaced before any ranking is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("algorithm `{algorithm}` requires a `{block}` block")]
    MissingAlgorithmConfig {
        algorithm: &'static str,
        block: &'static str,
    },

    #[error("headToHeadEventId is required for head_to_head tiebreaker")]
    MissingHeadToHeadEvent,

    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}
