mod load;
mod types;

pub use load::{load_competition, load_scoring_config};
pub use types::{Athlete, Competition, EventSpec, ResultRecord, ResultStatus};

use log::{debug, warn};

use crate::error::{ConfigError, ScoreError};
use crate::score::{aggregate, encode_rounds, parse_score, parse_tiebreak, Scheme, Score, ScoreStatus, UnitOptions};
use crate::scoring::{
    apply_multiplier, collect_placements, compute_standings, EventEntry, EventResults, NonFinish, Outcome,
    Placements, RankedEntry, RankingEngine, ScoringConfig, StandingsRow,
};

/// One row of an event leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub entry: RankedEntry,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventBoard {
    pub event_id: String,
    pub scheme: Scheme,
    pub rows: Vec<EventRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivisionBoard {
    pub division: String,
    pub events: Vec<EventBoard>,
    pub standings: Vec<StandingsRow>,
}

/// Turn a result row into the engine's input for one event.
///
/// Unusable data leaves the athlete unranked and is logged rather than
/// failing the leaderboard.
pub fn outcome_for(event: &EventSpec, result: Option<&ResultRecord>, units: &UnitOptions) -> Outcome {
    let Some(result) = result else {
        return Outcome::Missing;
    };

    let scheme = event.scheme;
    let cap_ms = event.time_cap_ms().unwrap_or(0);

    let score = match result.status {
        ResultStatus::Dnf => return Outcome::NonFinish(NonFinish::Dnf),
        ResultStatus::Dns => return Outcome::NonFinish(NonFinish::Dns),
        ResultStatus::Dq => Score::with_status(scheme, ScoreStatus::Dq),
        ResultStatus::Withdrawn => Score::with_status(scheme, ScoreStatus::Withdrawn),
        ResultStatus::Cap => match capped_reps(result, units) {
            Ok(Some(reps)) => Score::capped(scheme, cap_ms, reps),
            Ok(None) => Score::with_status(scheme, ScoreStatus::Cap),
            Err(err) => {
                warn!("{} in {}: {}", result.athlete, event.id, err);
                return Outcome::Missing;
            }
        },
        ResultStatus::Scored => match scored_value(event, result, units) {
            Ok(Some(score)) => score,
            Ok(None) => {
                warn!("{} in {}: result has no usable score", result.athlete, event.id);
                return Outcome::Missing;
            }
            Err(err) => {
                warn!("{} in {}: {}", result.athlete, event.id, err);
                return Outcome::Missing;
            }
        },
    };

    let score = match (&result.tiebreak, event.tiebreak_scheme) {
        (Some(raw), Some(tb_scheme)) => match parse_tiebreak(raw, tb_scheme) {
            Ok(tb) => score.with_tiebreak(tb.scheme, tb.value),
            Err(err) => {
                warn!("{} in {}: ignoring tiebreak: {}", result.athlete, event.id, err);
                score
            }
        },
        (Some(_), None) => {
            warn!("{} in {}: event has no tiebreak scheme, ignoring tiebreak", result.athlete, event.id);
            score
        }
        _ => score,
    };

    Outcome::Recorded(score)
}

fn capped_reps(result: &ResultRecord, units: &UnitOptions) -> Result<Option<i64>, ScoreError> {
    if !result.sets.is_empty() {
        let aggregated = aggregate(&result.sets, Scheme::Reps, None, units)?;
        return Ok(aggregated.score.map(|s| s.value));
    }
    result
        .raw
        .as_deref()
        .map(|raw| parse_score(raw, Scheme::Reps, units).map(|s| s.value))
        .transpose()
}

fn scored_value(event: &EventSpec, result: &ResultRecord, units: &UnitOptions) -> Result<Option<Score>, ScoreError> {
    let scheme = event.scheme;
    let with_type = |mut score: Score| {
        if let Some(score_type) = event.score_type {
            score.score_type = score_type;
        }
        score
    };

    if !result.sets.is_empty() {
        let aggregated = aggregate(&result.sets, scheme, event.score_type, units)?;
        return Ok(aggregated.score.map(|encoded| {
            if aggregated.is_time_capped {
                Score::capped(scheme, event.time_cap_ms().unwrap_or(0), encoded.value)
            } else {
                with_type(Score::scored(scheme, encoded.value))
            }
        }));
    }

    if !result.rounds.is_empty() {
        let encoded = encode_rounds(&result.rounds, scheme, event.score_type, units)?;
        return Ok(encoded.aggregated.map(|v| with_type(Score::scored(scheme, v))));
    }

    result
        .raw
        .as_deref()
        .map(|raw| parse_score(raw, scheme, units).map(|e| with_type(Score::scored(scheme, e.value))))
        .transpose()
}

/// Places from every event except `event_id`.
fn placements_without(placements: &Placements, event_id: &str) -> Placements {
    placements
        .iter()
        .map(|(athlete, events)| {
            let others = events
                .iter()
                .filter(|(id, _)| id.as_str() != event_id)
                .map(|(id, place)| (id.clone(), *place))
                .collect();
            (athlete.clone(), others)
        })
        .collect()
}

/// Rank every event of one division and build its standings.
///
/// Events are ranked twice: first without cross-event tiebreaks to learn
/// each athlete's places, then with the configured tiebreaker fed the places
/// from the other events.
pub fn evaluate_division(
    competition: &Competition,
    config: &ScoringConfig,
    division: &str,
) -> Result<DivisionBoard, ConfigError> {
    if let Some(id) = config.tiebreaker.head_to_head_event_id.as_deref() {
        if config.tiebreaker.uses_head_to_head() {
            competition.event(id)?;
        }
    }
    if let Some(event) = competition
        .events
        .iter()
        .find(|e| !e.points_multiplier.is_finite() || e.points_multiplier < 0.0)
    {
        return Err(ConfigError::InvalidValue {
            field: format!("events.{}.points_multiplier", event.id),
            reason: format!("must be a non-negative percentage, got {}", event.points_multiplier),
        });
    }

    let engine = RankingEngine::new(config);
    let athletes = competition.athletes_in(division);

    let inputs: Vec<(&EventSpec, Vec<EventEntry>)> = competition
        .events
        .iter()
        .map(|event| {
            let entries = athletes
                .iter()
                .map(|athlete| {
                    let result = competition.result_for(&athlete.id, &event.id);
                    EventEntry::new(athlete.id.clone(), outcome_for(event, result, &competition.units))
                })
                .collect();
            (event, entries)
        })
        .collect();

    let mut first_pass = Vec::with_capacity(inputs.len());
    for (event, entries) in &inputs {
        first_pass.push(EventResults {
            event_id: event.id.clone(),
            entries: engine.rank_event(event.scheme, entries, None)?,
        });
    }
    let placements = collect_placements(&first_pass);
    debug!("{}: first pass placed {} athletes", division, placements.len());

    let mut boards = Vec::with_capacity(inputs.len());
    let mut results = Vec::with_capacity(inputs.len());
    for (event, entries) in &inputs {
        let others = placements_without(&placements, &event.id);
        let mut ranked = engine.rank_event(event.scheme, entries, Some(&others))?;
        for entry in &mut ranked {
            entry.points = apply_multiplier(entry.points, event.points_multiplier);
        }

        let rows = ranked
            .iter()
            .map(|entry| EventRow {
                entry: entry.clone(),
                outcome: entries
                    .iter()
                    .find(|e| e.athlete_id == entry.athlete_id)
                    .map(|e| e.outcome.clone())
                    .unwrap_or(Outcome::Missing),
            })
            .collect();

        boards.push(EventBoard {
            event_id: event.id.clone(),
            scheme: event.scheme,
            rows,
        });
        results.push(EventResults {
            event_id: event.id.clone(),
            entries: ranked,
        });
    }

    let ids: Vec<&str> = athletes.iter().map(|a| a.id.as_str()).collect();
    let standings = compute_standings(&ids, &results, config)?;

    Ok(DivisionBoard {
        division: division.to_string(),
        events: boards,
        standings,
    })
}

/// Evaluate every division in order of first appearance.
pub fn evaluate(competition: &Competition, config: &ScoringConfig) -> Result<Vec<DivisionBoard>, ConfigError> {
    competition
        .divisions()
        .into_iter()
        .map(|division| evaluate_division(competition, config, division))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Algorithm, DnfPolicy, Standing};

    fn competition(doc: &str) -> Competition {
        serde_saphyr::from_str(doc).unwrap()
    }

    const THREE_EVENTS: &str = r#"
events:
  - id: fran
    scheme: time-with-cap
    time_cap: 10m
  - id: dl
    scheme: load
    points_multiplier: 200
  - id: amrap
    scheme: rounds-reps
    tiebreak_scheme: time
athletes:
  - id: ann
  - id: bea
  - id: cat
  - id: dee
    division: scaled
results:
  - { athlete: ann, event: fran, raw: "4:00" }
  - { athlete: bea, event: fran, raw: "5:00" }
  - { athlete: cat, event: fran, status: cap, raw: "120" }
  - { athlete: ann, event: dl, sets: [{ weight: 300 }, { weight: 315 }] }
  - { athlete: bea, event: dl, sets: [{ weight: 335 }] }
  - { athlete: cat, event: dl, status: dnf }
  - { athlete: ann, event: amrap, raw: "5+10", tiebreak: "8:00" }
  - { athlete: bea, event: amrap, raw: "5+10", tiebreak: "7:30" }
  - { athlete: cat, event: amrap, raw: "6+0" }
  - { athlete: dee, event: amrap, raw: "3+3" }
"#;

    fn row<'a>(board: &'a EventBoard, athlete: &str) -> &'a EventRow {
        board.rows.iter().find(|r| r.entry.athlete_id == athlete).unwrap()
    }

    #[test]
    fn test_full_evaluation() {
        let comp = competition(THREE_EVENTS);
        let boards = evaluate(&comp, &ScoringConfig::default()).unwrap();
        assert_eq!(boards.len(), 2);

        let rx = &boards[0];
        assert_eq!(rx.division, "open");

        let fran = &rx.events[0];
        assert_eq!(row(fran, "ann").entry.place, Some(1));
        assert_eq!(row(fran, "cat").entry.standing, Standing::Capped);
        assert_eq!(row(fran, "cat").entry.place, Some(3));

        let dl = &rx.events[1];
        assert_eq!(row(dl, "bea").entry.points, 200.0);
        assert_eq!(row(dl, "ann").entry.points, 190.0);
        assert_eq!(row(dl, "cat").entry.points, 0.0);

        let amrap = &rx.events[2];
        assert_eq!(row(amrap, "cat").entry.place, Some(1));
        assert_eq!(row(amrap, "bea").entry.place, Some(2));
        assert_eq!(row(amrap, "ann").entry.place, Some(3));

        // ann 100 + 190 + 90, bea 95 + 200 + 95, cat 90 + 0 + 100
        let totals: Vec<(&str, f64)> = rx
            .standings
            .iter()
            .map(|s| (s.athlete_id.as_str(), s.total_points))
            .collect();
        assert_eq!(totals, vec![("bea", 390.0), ("ann", 380.0), ("cat", 190.0)]);

        let scaled = &boards[1];
        assert_eq!(scaled.division, "scaled");
        assert_eq!(scaled.standings.len(), 1);
        assert_eq!(scaled.standings[0].place, 1);
        assert_eq!(scaled.events[0].rows[0].outcome, Outcome::Missing);
    }

    #[test]
    fn test_bad_data_is_unranked() {
        let comp = competition(
            r#"
events:
  - id: e1
    scheme: time
athletes:
  - id: good
  - id: bad
  - id: empty
results:
  - { athlete: good, event: e1, raw: "3:00" }
  - { athlete: bad, event: e1, raw: "three minutes" }
  - { athlete: empty, event: e1 }
"#,
        );
        let board = evaluate_division(&comp, &ScoringConfig::default(), "open").unwrap();
        let event = &board.events[0];
        assert_eq!(row(event, "good").entry.place, Some(1));
        assert_eq!(row(event, "bad").entry.place, None);
        assert_eq!(row(event, "empty").entry.place, None);
        assert_eq!(board.standings[0].athlete_id, "good");
    }

    #[test]
    fn test_online_skipped_event_does_not_pay() {
        let comp = competition(
            r#"
events:
  - id: e1
    scheme: time
  - id: e2
    scheme: time
athletes:
  - id: a
  - id: b
  - id: c
results:
  - { athlete: a, event: e1, raw: "1:00" }
  - { athlete: b, event: e1, raw: "2:00" }
  - { athlete: c, event: e1, raw: "3:00" }
  - { athlete: c, event: e2, raw: "1:00" }
  - { athlete: a, event: e2, raw: "2:00" }
"#,
        );
        let board = evaluate_division(&comp, &ScoringConfig::new(Algorithm::Online), "open").unwrap();
        assert_eq!(row(&board.events[1], "b").entry.place, None);
        assert_eq!(row(&board.events[1], "b").entry.points, 3.0);

        // a 1 + 2, c 3 + 1, b 2 + 3
        let totals: Vec<(&str, u32, f64)> = board
            .standings
            .iter()
            .map(|s| (s.athlete_id.as_str(), s.place, s.total_points))
            .collect();
        assert_eq!(totals, vec![("a", 1, 3.0), ("c", 2, 4.0), ("b", 3, 5.0)]);
    }

    #[test]
    fn test_status_policies_flow_through() {
        let comp = competition(
            r#"
events:
  - id: e1
    scheme: reps
athletes:
  - id: a
  - id: b
  - id: c
results:
  - { athlete: a, event: e1, status: dnf }
  - { athlete: b, event: e1, raw: "50" }
  - { athlete: c, event: e1, status: withdrawn }
"#,
        );
        let mut config = ScoringConfig::new(Algorithm::WinnerTakesMore);
        config.status_handling.dnf = DnfPolicy::LastPlace;
        let board = evaluate_division(&comp, &config, "open").unwrap();
        let event = &board.events[0];
        assert_eq!(row(event, "b").entry.points, 100.0);
        assert_eq!(row(event, "c").entry.standing, Standing::Zero);
        assert_eq!(row(event, "a").entry.standing, Standing::LastPlace);
        assert_eq!(row(event, "a").entry.place, Some(3));
        assert_eq!(
            row(event, "c").outcome,
            Outcome::Recorded(Score::with_status(Scheme::Reps, ScoreStatus::Withdrawn))
        );
    }

    #[test]
    fn test_unknown_head_to_head_event() {
        let comp = competition(THREE_EVENTS);
        let mut config = ScoringConfig::default();
        config.tiebreaker.primary = crate::scoring::TiebreakMethod::HeadToHead;
        config.tiebreaker.head_to_head_event_id = Some("final".to_string());
        let err = evaluate(&comp, &config).unwrap_err();
        assert_eq!(err, ConfigError::UnknownEvent("final".to_string()));
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let comp = competition("events:\n  - id: e1\n    scheme: reps\n    points_multiplier: -50\n");
        let err = evaluate_division(&comp, &ScoringConfig::default(), "open").unwrap_err();
        assert_eq!(
            err.to_string(),
            "events.e1.points_multiplier: must be a non-negative percentage, got -50"
        );
    }

    #[test]
    fn test_capped_sets_use_event_cap() {
        let comp = competition(
            r#"
events:
  - id: e1
    scheme: time-with-cap
    time_cap: 12m
athletes:
  - id: a
results:
  - { athlete: a, event: e1, sets: [{ reps: 87 }] }
"#,
        );
        let event = comp.event("e1").unwrap();
        let outcome = outcome_for(event, comp.result_for("a", "e1"), &comp.units);
        assert_eq!(outcome, Outcome::Recorded(Score::capped(Scheme::TimeWithCap, 720_000, 87)));
    }
}
