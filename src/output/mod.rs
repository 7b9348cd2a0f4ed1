pub mod formatter;

pub use formatter::{
    event_json, format_event_table, format_event_tsv, format_outcome, format_points, format_standings_table,
    format_standings_tsv, should_use_colors, standings_json,
};
