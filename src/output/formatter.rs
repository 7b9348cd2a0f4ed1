use owo_colors::OwoColorize;
use serde_json::{json, Value};
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::competition::{Competition, DivisionBoard, EventBoard};
use crate::score::{format_score_with_tiebreak, FormatOptions};
use crate::scoring::Outcome;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format points with at most two decimals, dropping trailing zeros
/// (100, 42.5, 33.33)
pub fn format_points(points: f64) -> String {
    let formatted = format!("{:.2}", points);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Human-readable result for a leaderboard cell.
pub fn format_outcome(outcome: &Outcome, opts: &FormatOptions) -> String {
    match outcome {
        Outcome::Missing => "N/A".to_string(),
        Outcome::NonFinish(status) => status.badge().to_string(),
        Outcome::Recorded(score) => format_score_with_tiebreak(score, opts),
    }
}

/// Place column: "1", "T2" when shared, "--" when unranked.
fn format_place(place: Option<u32>, shared: bool) -> String {
    match place {
        Some(p) if shared => format!("T{}", p),
        Some(p) => p.to_string(),
        None => "--".to_string(),
    }
}

fn is_shared(places: &[Option<u32>], place: Option<u32>) -> bool {
    place.is_some() && places.iter().filter(|p| **p == place).count() > 1
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn athlete_name<'a>(competition: &'a Competition, id: &'a str) -> &'a str {
    competition.athlete(id).map(|a| a.display_name()).unwrap_or(id)
}

// Place column: 4 chars, points column: 7 chars, two separators.
const PLACE_WIDTH: usize = 4;
const POINTS_WIDTH: usize = 7;
const SEPARATOR: &str = "  ";

fn fit_name(name: &str, trailing: usize, term_width: Option<usize>) -> String {
    let fixed_width = PLACE_WIDTH + 1 + POINTS_WIDTH + SEPARATOR.len() * 2 + trailing;
    match term_width {
        Some(width) if width > fixed_width + 10 => truncate_name(name, width - fixed_width),
        // Very narrow terminal, show truncated
        Some(_) => truncate_name(name, 20),
        // No terminal (pipe), don't truncate
        None => name.to_string(),
    }
}

fn format_row(place: &str, points: &str, name: &str, detail: &str, use_colors: bool) -> String {
    let place = format!("{:>width$}", place, width = PLACE_WIDTH);
    let points = format!("{:>width$}", points, width = POINTS_WIDTH);
    if use_colors {
        format!(
            "{} {}{}{}{}{}",
            place.dimmed(),
            points.bold(),
            SEPARATOR,
            name,
            SEPARATOR,
            detail.cyan()
        )
    } else {
        format!("{} {}{}{}{}{}", place, points, SEPARATOR, name, SEPARATOR, detail)
    }
}

/// Overall standings, one line per athlete:
/// place, total points, name, then per-event places ("fran:1 dl:3")
pub fn format_standings_table(board: &DivisionBoard, competition: &Competition, use_colors: bool) -> String {
    if board.standings.is_empty() {
        return format!("No athletes in division {}.", board.division);
    }

    let term_width = get_terminal_width();
    let places: Vec<Option<u32>> = board.standings.iter().map(|s| Some(s.place)).collect();

    let header = if use_colors {
        board.division.bold().to_string()
    } else {
        board.division.clone()
    };

    let rows = board.standings.iter().map(|row| {
        let detail = row
            .event_places
            .iter()
            .map(|(event, place)| format!("{}:{}", event, place))
            .collect::<Vec<_>>()
            .join(" ");
        let name = fit_name(athlete_name(competition, &row.athlete_id), detail.chars().count(), term_width);
        format_row(
            &format_place(Some(row.place), is_shared(&places, Some(row.place))),
            &format_points(row.total_points),
            &name,
            &detail,
            use_colors,
        )
    });

    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

/// One event's leaderboard: place, points, name, formatted result
pub fn format_event_table(
    board: &EventBoard,
    competition: &Competition,
    opts: &FormatOptions,
    use_colors: bool,
) -> String {
    if board.rows.is_empty() {
        return format!("No results for {}.", board.event_id);
    }

    let term_width = get_terminal_width();
    let places: Vec<Option<u32>> = board.rows.iter().map(|r| r.entry.place).collect();

    board
        .rows
        .iter()
        .map(|row| {
            let result = format_outcome(&row.outcome, opts);
            let name = fit_name(
                athlete_name(competition, &row.entry.athlete_id),
                result.chars().count(),
                term_width,
            );
            format_row(
                &format_place(row.entry.place, is_shared(&places, row.entry.place)),
                &format_points(row.entry.points),
                &name,
                &result,
                use_colors,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Standings as tab-separated values for scripting
/// Columns: division, place, points, athlete id, name (no headers, no colors)
pub fn format_standings_tsv(board: &DivisionBoard, competition: &Competition) -> String {
    board
        .standings
        .iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                board.division,
                row.place,
                format_points(row.total_points),
                row.athlete_id,
                athlete_name(competition, &row.athlete_id)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Event results as tab-separated values
/// Columns: place (empty when unranked), points, athlete id, result
pub fn format_event_tsv(board: &EventBoard, opts: &FormatOptions) -> String {
    board
        .rows
        .iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}",
                row.entry.place.map(|p| p.to_string()).unwrap_or_default(),
                format_points(row.entry.points),
                row.entry.athlete_id,
                format_outcome(&row.outcome, opts)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn standings_json(board: &DivisionBoard, competition: &Competition) -> Value {
    json!({
        "division": board.division,
        "standings": board.standings.iter().map(|row| json!({
            "athlete": row.athlete_id,
            "name": athlete_name(competition, &row.athlete_id),
            "place": row.place,
            "points": row.total_points,
            "events": row.event_places,
            "tiebreak": row.tiebreak,
        })).collect::<Vec<_>>(),
    })
}

pub fn event_json(board: &EventBoard, opts: &FormatOptions) -> Value {
    json!({
        "event": board.event_id,
        "scheme": board.scheme.as_str(),
        "results": board.rows.iter().map(|row| {
            let score = match &row.outcome {
                Outcome::Recorded(score) => serde_json::to_value(score).unwrap_or(Value::Null),
                _ => Value::Null,
            };
            json!({
                "athlete": row.entry.athlete_id,
                "place": row.entry.place,
                "points": row.entry.points,
                "standing": row.entry.standing,
                "result": format_outcome(&row.outcome, opts),
                "score": score,
                "tiebreak": row.entry.tiebreak,
            })
        }).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::evaluate_division;
    use crate::score::{Scheme, Score, ScoreStatus};
    use crate::scoring::{NonFinish, ScoringConfig};

    fn sample() -> (Competition, DivisionBoard) {
        let comp: Competition = serde_saphyr::from_str(
            r#"
events:
  - id: fran
    scheme: time
  - id: dl
    scheme: load
athletes:
  - id: ann
    name: Ann Example
  - id: bea
  - id: cat
results:
  - { athlete: ann, event: fran, raw: "4:00" }
  - { athlete: bea, event: fran, raw: "4:00" }
  - { athlete: cat, event: fran, status: dnf }
  - { athlete: ann, event: dl, raw: "315" }
  - { athlete: bea, event: dl, raw: "315" }
"#,
        )
        .unwrap();
        let board = evaluate_division(&comp, &ScoringConfig::default(), "open").unwrap();
        (comp, board)
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(100.0), "100");
        assert_eq!(format_points(42.5), "42.5");
        assert_eq!(format_points(33.333), "33.33");
        assert_eq!(format_points(-12.5), "-12.5");
        assert_eq!(format_points(0.0), "0");
    }

    #[test]
    fn test_format_outcome() {
        let opts = FormatOptions::default();
        assert_eq!(format_outcome(&Outcome::Missing, &opts), "N/A");
        assert_eq!(format_outcome(&Outcome::NonFinish(NonFinish::Dns), &opts), "DNS");
        let dq = Outcome::Recorded(Score::with_status(Scheme::Time, ScoreStatus::Dq));
        assert_eq!(format_outcome(&dq, &opts), "DQ");
        let time = Outcome::Recorded(Score::scored(Scheme::Time, 245_000));
        assert_eq!(format_outcome(&time, &opts), "4:05");
    }

    #[test]
    fn test_format_place() {
        assert_eq!(format_place(Some(1), false), "1");
        assert_eq!(format_place(Some(2), true), "T2");
        assert_eq!(format_place(None, false), "--");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 20), "Short");
        assert_eq!(truncate_name("A very long athlete name", 10), "A very ...");
        assert_eq!(truncate_name("Hello", 3), "Hel");
    }

    #[test]
    fn test_event_table_plain() {
        let (comp, board) = sample();
        let table = format_event_table(&board.events[0], &comp, &FormatOptions::default(), false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  T1     100"));
        assert!(lines[0].contains("Ann Example"));
        assert!(lines[0].ends_with("4:00"));
        assert!(lines[2].contains("cat"));
        assert!(lines[2].ends_with("DNF"));
    }

    #[test]
    fn test_standings_table_plain() {
        let (comp, board) = sample();
        let table = format_standings_table(&board, &comp, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "open");
        assert!(lines[1].contains("Ann Example"));
        assert!(lines[1].contains("dl:1 fran:1"));
    }

    #[test]
    fn test_tsv_output() {
        let (comp, board) = sample();
        let tsv = format_standings_tsv(&board, &comp);
        assert_eq!(tsv.lines().next(), Some("open\t1\t200\tann\tAnn Example"));

        let tsv = format_event_tsv(&board.events[1], &FormatOptions::default());
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "1\t100\tann\t315");
        assert_eq!(lines[2], "\t0\tcat\tN/A");
    }

    #[test]
    fn test_json_output() {
        let (comp, board) = sample();
        let value = standings_json(&board, &comp);
        assert_eq!(value["division"], "open");
        assert_eq!(value["standings"][0]["athlete"], "ann");
        assert_eq!(value["standings"][0]["points"], 200.0);

        let value = event_json(&board.events[0], &FormatOptions::default());
        assert_eq!(value["scheme"], "time");
        assert_eq!(value["results"][2]["standing"], "zero");
        assert_eq!(value["results"][2]["score"], Value::Null);
        assert_eq!(value["results"][0]["tiebreak"]["group_size"], 2);
    }

    #[test]
    fn test_empty_board() {
        let (comp, mut board) = sample();
        board.standings.clear();
        assert_eq!(format_standings_table(&board, &comp, false), "No athletes in division open.");
    }
}
