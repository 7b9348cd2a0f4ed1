use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use super::config::ScoringConfig;
use super::engine::RankedEntry;
use super::points::round2;
use super::tiebreak::{shared_places, DecidedBy, Placements, TiebreakResolver, TiebreakTrace};
use crate::error::ConfigError;

/// Ranked results of one event, with multipliers already applied to points.
#[derive(Debug, Clone, PartialEq)]
pub struct EventResults {
    pub event_id: String,
    pub entries: Vec<RankedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsRow {
    pub athlete_id: String,
    pub place: u32,
    pub total_points: f64,
    /// Place earned in each event the athlete was ranked in.
    pub event_places: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiebreak: Option<TiebreakTrace>,
}

/// Event places keyed by athlete, the input to countback and head-to-head.
pub fn collect_placements(events: &[EventResults]) -> Placements {
    let mut placements = Placements::new();
    for event in events {
        for entry in &event.entries {
            if let Some(place) = entry.place {
                placements
                    .entry(entry.athlete_id.clone())
                    .or_insert_with(HashMap::new)
                    .insert(event.event_id.clone(), place);
            }
        }
    }
    placements
}

struct Total<'a> {
    athlete_id: &'a str,
    points: f64,
    ranked_events: usize,
}

fn compare_totals(a: &Total, b: &Total, lower_wins: bool) -> Ordering {
    let unranked = (a.ranked_events == 0).cmp(&(b.ranked_events == 0));
    let points = if lower_wins {
        a.points.total_cmp(&b.points)
    } else {
        b.points.total_cmp(&a.points)
    };
    unranked.then(points)
}

/// Sum event points per athlete and rank the division.
///
/// Highest total wins, except under the online algorithm where the lowest
/// does. Athletes who were never ranked in any event sit at the bottom.
/// Equal totals go through the configured tiebreak methods and share a
/// place if still tied.
pub fn compute_standings(
    athletes: &[&str],
    events: &[EventResults],
    config: &ScoringConfig,
) -> Result<Vec<StandingsRow>, ConfigError> {
    let placements = collect_placements(events);
    let resolver = TiebreakResolver::new(&config.tiebreaker, &placements)?;
    let lower_wins = config.algorithm.lower_total_wins();

    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for event in events {
        for entry in &event.entries {
            let slot = sums.entry(entry.athlete_id.as_str()).or_default();
            slot.0 += entry.points;
            if entry.place.is_some() {
                slot.1 += 1;
            }
        }
    }

    let mut totals: Vec<Total> = athletes
        .iter()
        .map(|&id| {
            let (points, ranked_events) = sums.get(id).copied().unwrap_or_default();
            Total {
                athlete_id: id,
                points: round2(points),
                ranked_events,
            }
        })
        .collect();

    let by_total = |a: &Total, b: &Total| compare_totals(a, b, lower_wins);
    totals.sort_by(|a, b| by_total(a, b).then_with(|| resolver.ordering(a.athlete_id, b.athlete_id)));

    let places = shared_places(&totals, |a, b| {
        by_total(a, b) == Ordering::Equal && resolver.ordering(a.athlete_id, b.athlete_id) == Ordering::Equal
    });

    let mut rows = Vec::with_capacity(totals.len());
    for (i, (total, place)) in totals.iter().zip(places).enumerate() {
        let group_size = totals
            .iter()
            .filter(|other| by_total(total, *other) == Ordering::Equal)
            .count();
        let tiebreak = (group_size > 1).then(|| {
            let decided_by: Option<DecidedBy> = i
                .checked_sub(1)
                .map(|prev| &totals[prev])
                .filter(|prev| by_total(*prev, total) == Ordering::Equal)
                .and_then(|prev| resolver.compare(prev.athlete_id, total.athlete_id))
                .map(|(_, method)| method);
            TiebreakTrace { group_size, decided_by }
        });
        if let Some(TiebreakTrace {
            decided_by: Some(method),
            ..
        }) = tiebreak
        {
            debug!("{} placed on {:?} at {} points", total.athlete_id, method, total.points);
        }

        let event_places = placements
            .get(total.athlete_id)
            .map(|events| events.iter().map(|(e, p)| (e.clone(), *p)).collect())
            .unwrap_or_default();

        rows.push(StandingsRow {
            athlete_id: total.athlete_id.to_string(),
            place,
            total_points: total.points,
            event_places,
            tiebreak,
        });
    }

    Ok(rows)
}
