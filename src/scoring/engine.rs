use log::debug;
use serde::Serialize;
use std::cmp::Ordering;

use super::config::{Algorithm, ScoringConfig};
use super::points::{p_scores, placement_curve, PointsCurve, WinnerTakesMoreTable};
use super::status::{resolve, NonFinish, Resolution, Treatment};
use super::tiebreak::{shared_places, DecidedBy, Placements, TiebreakResolver, TiebreakTrace};
use crate::error::ConfigError;
use crate::score::{Direction, Scheme, Score, ScoreStatus};

/// What an athlete brought to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A recorded score. `Dq` is handled by the DNF policy and `Withdrawn`
    /// by the withdrawn policy.
    Recorded(Score),
    NonFinish(NonFinish),
    /// No usable score. The athlete is left unranked.
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    pub athlete_id: String,
    pub outcome: Outcome,
}

impl EventEntry {
    pub fn new(athlete_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            athlete_id: athlete_id.into(),
            outcome,
        }
    }

    pub fn scored(athlete_id: impl Into<String>, scheme: Scheme, value: i64) -> Self {
        Self::new(athlete_id, Outcome::Recorded(Score::scored(scheme, value)))
    }
}

/// How an entry was placed. Ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Scored,
    Capped,
    WorstPerformance,
    Zero,
    LastPlace,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub athlete_id: String,
    /// `None` only for excluded entries.
    pub place: Option<u32>,
    pub points: f64,
    pub standing: Standing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiebreak: Option<TiebreakTrace>,
}

struct Candidate<'e> {
    athlete_id: &'e str,
    standing: Standing,
    /// Normalized so that smaller is better.
    key: i64,
    /// Recorded tiebreak, normalized the same way.
    recorded_tiebreak: Option<i64>,
    /// Raw scored value, for P-Score.
    value: Option<i64>,
    use_recorded_tiebreak: bool,
}

fn normalize(direction: Direction, value: i64) -> i64 {
    match direction {
        Direction::LowerIsBetter => value,
        Direction::HigherIsBetter => value.saturating_neg(),
    }
}

/// Orders one event's entries, assigns shared places and converts places to points.
pub struct RankingEngine<'a> {
    config: &'a ScoringConfig,
    winner_takes_more: &'a dyn PointsCurve,
}

impl<'a> RankingEngine<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self {
            config,
            winner_takes_more: &WinnerTakesMoreTable,
        }
    }

    /// Replace the winner-takes-more curve, also used by custom tables built on it.
    pub fn with_curve(mut self, curve: &'a dyn PointsCurve) -> Self {
        self.winner_takes_more = curve;
        self
    }

    /// Rank one (event, division) scope.
    ///
    /// `placements` holds places from other events for cross-event
    /// tiebreaks; without it ties that survive the recorded tiebreak value
    /// share a place. Entries come back best first, then forced-last entries,
    /// then excluded ones, each group in input (registration) order where
    /// still tied.
    pub fn rank_event(
        &self,
        scheme: Scheme,
        entries: &[EventEntry],
        placements: Option<&Placements>,
    ) -> Result<Vec<RankedEntry>, ConfigError> {
        let empty = Placements::new();
        let resolver = TiebreakResolver::new(&self.config.tiebreaker, placements.unwrap_or(&empty))?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let direction = scheme.direction();
        let worst_scored = entries
            .iter()
            .filter_map(|e| match &e.outcome {
                Outcome::Recorded(s) if s.status == ScoreStatus::Scored => s.value,
                _ => None,
            })
            .reduce(|a, b| direction.worse(a, b));

        let mut ranked: Vec<Candidate> = Vec::new();
        let mut forced_last: Vec<&str> = Vec::new();
        let mut excluded: Vec<&str> = Vec::new();

        for entry in entries {
            let id = entry.athlete_id.as_str();
            let non_finish = match &entry.outcome {
                Outcome::Missing => {
                    excluded.push(id);
                    continue;
                }
                Outcome::NonFinish(status) => *status,
                Outcome::Recorded(score) => match score.status {
                    ScoreStatus::Scored => {
                        let Some(value) = score.value else {
                            excluded.push(id);
                            continue;
                        };
                        ranked.push(Candidate {
                            athlete_id: id,
                            standing: Standing::Scored,
                            key: normalize(direction, value),
                            recorded_tiebreak: recorded_tiebreak(score),
                            value: Some(value),
                            use_recorded_tiebreak: false,
                        });
                        continue;
                    }
                    ScoreStatus::Cap => {
                        let reps = score.time_cap.and_then(|c| c.secondary_value);
                        ranked.push(Candidate {
                            athlete_id: id,
                            standing: Standing::Capped,
                            key: reps.map(i64::saturating_neg).unwrap_or(i64::MAX),
                            recorded_tiebreak: recorded_tiebreak(score),
                            value: None,
                            use_recorded_tiebreak: false,
                        });
                        continue;
                    }
                    ScoreStatus::Dq => NonFinish::Dnf,
                    ScoreStatus::Withdrawn => NonFinish::Withdrawn,
                },
            };

            match resolve(non_finish, &self.config.status_handling, direction, worst_scored) {
                Resolution::Exclude => excluded.push(id),
                Resolution::Ranked {
                    treatment: Treatment::LastPlace,
                    ..
                } => forced_last.push(id),
                Resolution::Ranked { value, treatment } => ranked.push(Candidate {
                    athlete_id: id,
                    standing: match treatment {
                        Treatment::WorstPerformance => Standing::WorstPerformance,
                        _ => Standing::Zero,
                    },
                    key: normalize(direction, value),
                    recorded_tiebreak: None,
                    value: None,
                    use_recorded_tiebreak: false,
                }),
            }
        }

        ranked.sort_by(|a, b| a.standing.cmp(&b.standing).then(a.key.cmp(&b.key)));
        break_ties(&mut ranked, &resolver);

        let places = shared_places(&ranked, |a, b| {
            same_group(a, b) && tie_order(a, b, &resolver) == Ordering::Equal
        });

        let traces = tie_traces(&ranked, &resolver);
        let placed_count = ranked.len() as u32;
        let field_size = ranked.len() + forced_last.len();
        let points = self.points_for(&ranked, &places, field_size, direction);

        let mut results: Vec<RankedEntry> = ranked
            .iter()
            .zip(places)
            .zip(points)
            .zip(traces)
            .map(|(((c, place), points), tiebreak)| RankedEntry {
                athlete_id: c.athlete_id.to_string(),
                place: Some(place),
                points,
                standing: c.standing,
                tiebreak,
            })
            .collect();

        let last_place = placed_count + 1;
        for id in forced_last {
            results.push(RankedEntry {
                athlete_id: id.to_string(),
                place: Some(last_place),
                points: self.last_place_points(last_place, &results),
                standing: Standing::LastPlace,
                tiebreak: None,
            });
        }

        // Under online a missing event must cost more than any place earned in it.
        let excluded_points = if self.config.algorithm.lower_total_wins() {
            (field_size + 1) as f64
        } else {
            0.0
        };
        results.extend(excluded.into_iter().map(|id| RankedEntry {
            athlete_id: id.to_string(),
            place: None,
            points: excluded_points,
            standing: Standing::Excluded,
            tiebreak: None,
        }));

        Ok(results)
    }

    fn points_for(&self, ranked: &[Candidate], places: &[u32], field_size: usize, direction: Direction) -> Vec<f64> {
        if let Algorithm::PScore(config) = &self.config.algorithm {
            let scored: Vec<i64> = ranked.iter().filter_map(|c| c.value).collect();
            let scores = p_scores(&scored, direction, config);
            let floor = scores.iter().copied().reduce(f64::min).unwrap_or(0.0);
            let mut scored_points = scores.into_iter();
            return ranked
                .iter()
                .map(|c| match c.standing {
                    Standing::Scored => scored_points.next().unwrap_or(0.0),
                    Standing::Zero => 0.0,
                    _ => floor,
                })
                .collect();
        }

        let Some(curve) = placement_curve(&self.config.algorithm, self.winner_takes_more) else {
            return vec![0.0; ranked.len()];
        };
        let online = self.config.algorithm.lower_total_wins();
        ranked
            .iter()
            .zip(places)
            .map(|(c, place)| match c.standing {
                Standing::Zero if online => (field_size + 1) as f64,
                Standing::Zero => 0.0,
                _ => curve.points_for_place(*place),
            })
            .collect()
    }

    fn last_place_points(&self, place: u32, placed: &[RankedEntry]) -> f64 {
        if let Algorithm::PScore(_) = self.config.algorithm {
            return placed
                .iter()
                .filter(|e| e.standing == Standing::Scored)
                .map(|e| e.points)
                .reduce(f64::min)
                .unwrap_or(0.0);
        }
        placement_curve(&self.config.algorithm, self.winner_takes_more)
            .map(|curve| curve.points_for_place(place))
            .unwrap_or(0.0)
    }
}

fn recorded_tiebreak(score: &Score) -> Option<i64> {
    score
        .tiebreak
        .map(|tb| normalize(tb.scheme.direction(), tb.value))
}

fn same_group(a: &Candidate, b: &Candidate) -> bool {
    a.standing == b.standing && a.key == b.key
}

// Order within a group of equal primary results.
fn tie_order(a: &Candidate, b: &Candidate, resolver: &TiebreakResolver) -> Ordering {
    let recorded = if a.use_recorded_tiebreak {
        a.recorded_tiebreak.cmp(&b.recorded_tiebreak)
    } else {
        Ordering::Equal
    };
    recorded.then_with(|| resolver.ordering(a.athlete_id, b.athlete_id))
}

/// Sort each run of equal primary results by recorded tiebreak, when every
/// member has one, and then by the cross-event tiebreak methods.
fn break_ties(ranked: &mut [Candidate], resolver: &TiebreakResolver) {
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start + 1;
        while end < ranked.len() && same_group(&ranked[start], &ranked[end]) {
            end += 1;
        }

        let group = &mut ranked[start..end];
        if group.len() > 1 {
            let use_recorded = group.iter().all(|c| c.recorded_tiebreak.is_some());
            for c in group.iter_mut() {
                c.use_recorded_tiebreak = use_recorded;
            }
            group.sort_by(|a, b| tie_order(a, b, resolver));
            debug!(
                "tie group of {} at {:?} (recorded tiebreak: {})",
                group.len(),
                group[0].standing,
                use_recorded
            );
        }
        start = end;
    }
}

fn tie_traces(ranked: &[Candidate], resolver: &TiebreakResolver) -> Vec<Option<TiebreakTrace>> {
    let mut traces = Vec::with_capacity(ranked.len());
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start + 1;
        while end < ranked.len() && same_group(&ranked[start], &ranked[end]) {
            end += 1;
        }
        let group_size = end - start;
        for i in start..end {
            if group_size == 1 {
                traces.push(None);
                continue;
            }
            let decided_by = if i == start {
                None
            } else {
                let (prev, cur) = (&ranked[i - 1], &ranked[i]);
                if cur.use_recorded_tiebreak && prev.recorded_tiebreak != cur.recorded_tiebreak {
                    Some(DecidedBy::RecordedTiebreak)
                } else {
                    resolver.compare(prev.athlete_id, cur.athlete_id).map(|(_, d)| d)
                }
            };
            if let Some(method) = decided_by {
                debug!("{} separated from {} by {:?}", ranked[i].athlete_id, ranked[i - 1].athlete_id, method);
            }
            traces.push(Some(TiebreakTrace { group_size, decided_by }));
        }
        start = end;
    }
    traces
}
