use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::config::{TiebreakMethod, TiebreakerConfig};
use crate::error::ConfigError;

/// Places earned per athlete per event: `athlete id -> event id -> place`.
pub type Placements = HashMap<String, HashMap<String, u32>>;

/// What separated an athlete from the rest of a tied group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecidedBy {
    /// The tiebreak value recorded with the score.
    RecordedTiebreak,
    Countback,
    HeadToHead,
}

/// Tie information attached to a ranked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiebreakTrace {
    /// Size of the group that was tied before tiebreaks applied.
    pub group_size: usize,
    /// Method that ordered this athlete against the one ranked just ahead,
    /// `None` when they still share a place or this athlete leads the group.
    pub decided_by: Option<DecidedBy>,
}

/// Breaks ties with the configured primary and secondary methods.
pub struct TiebreakResolver<'a> {
    methods: Vec<TiebreakMethod>,
    head_to_head_event: Option<&'a str>,
    placements: &'a Placements,
}

impl<'a> TiebreakResolver<'a> {
    /// Fails when a head-to-head method is configured without an event.
    pub fn new(config: &'a TiebreakerConfig, placements: &'a Placements) -> Result<Self, ConfigError> {
        if config.uses_head_to_head() && config.head_to_head_event_id.is_none() {
            return Err(ConfigError::MissingHeadToHeadEvent);
        }

        let methods = std::iter::once(config.primary)
            .chain(config.secondary)
            .filter(|m| *m != TiebreakMethod::None)
            .collect();

        Ok(Self {
            methods,
            head_to_head_event: config.head_to_head_event_id.as_deref(),
            placements,
        })
    }

    /// Compare two tied athletes; `Less` means `a` ranks ahead.
    ///
    /// Returns the method that separated them, or `None` if they stay tied.
    pub fn compare(&self, a: &str, b: &str) -> Option<(Ordering, DecidedBy)> {
        self.methods.iter().find_map(|method| {
            let (ordering, decided_by) = match method {
                TiebreakMethod::Countback => (self.countback(a, b), DecidedBy::Countback),
                TiebreakMethod::HeadToHead => (self.head_to_head(a, b), DecidedBy::HeadToHead),
                TiebreakMethod::None => (Ordering::Equal, DecidedBy::Countback),
            };
            (ordering != Ordering::Equal).then_some((ordering, decided_by))
        })
    }

    pub fn ordering(&self, a: &str, b: &str) -> Ordering {
        self.compare(a, b).map(|(o, _)| o).unwrap_or(Ordering::Equal)
    }

    fn places_of(&self, athlete: &str) -> impl Iterator<Item = u32> + '_ {
        self.placements
            .get(athlete)
            .into_iter()
            .flat_map(|events| events.values().copied())
    }

    // More finishes at the best differing place level wins.
    fn countback(&self, a: &str, b: &str) -> Ordering {
        let histogram = |athlete: &str| {
            let mut counts: HashMap<u32, u32> = HashMap::new();
            for place in self.places_of(athlete) {
                *counts.entry(place).or_default() += 1;
            }
            counts
        };
        let (ha, hb) = (histogram(a), histogram(b));
        let deepest = ha.keys().chain(hb.keys()).copied().max().unwrap_or(0);

        (1..=deepest)
            .map(|level| {
                let ca = ha.get(&level).copied().unwrap_or(0);
                let cb = hb.get(&level).copied().unwrap_or(0);
                cb.cmp(&ca)
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    // Lower place in the designated event wins; missing from it counts as worse.
    fn head_to_head(&self, a: &str, b: &str) -> Ordering {
        let Some(event) = self.head_to_head_event else {
            return Ordering::Equal;
        };
        let place = |athlete: &str| self.placements.get(athlete).and_then(|e| e.get(event)).copied();
        match (place(a), place(b)) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Shared-place numbering for an already sorted slice.
///
/// `same(prev, cur)` reports whether two neighbours are still tied; a tied
/// entry repeats the previous place, any other takes `1 + index`.
pub fn shared_places<T>(sorted: &[T], mut same: impl FnMut(&T, &T) -> bool) -> Vec<u32> {
    let mut places = Vec::with_capacity(sorted.len());
    for (i, item) in sorted.iter().enumerate() {
        let place = match (i.checked_sub(1), places.last()) {
            (Some(prev), Some(&last)) if same(&sorted[prev], item) => last,
            _ => i as u32 + 1,
        };
        places.push(place);
    }
    places
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placements(rows: &[(&str, &[(&str, u32)])]) -> Placements {
        rows.iter()
            .map(|(athlete, events)| {
                let events = events.iter().map(|(e, p)| (e.to_string(), *p)).collect();
                (athlete.to_string(), events)
            })
            .collect()
    }

    fn config(primary: TiebreakMethod, secondary: Option<TiebreakMethod>, h2h: Option<&str>) -> TiebreakerConfig {
        TiebreakerConfig {
            primary,
            secondary,
            head_to_head_event_id: h2h.map(str::to_string),
        }
    }

    #[test]
    fn test_countback_most_firsts() {
        let p = placements(&[
            ("a1", &[("e1", 2), ("e2", 1)]),
            ("a2", &[("e1", 1), ("e2", 2)]),
            ("a3", &[("e1", 1), ("e2", 1)]),
        ]);
        let cfg = config(TiebreakMethod::Countback, None, None);
        let resolver = TiebreakResolver::new(&cfg, &p).unwrap();
        assert_eq!(resolver.compare("a3", "a1"), Some((Ordering::Less, DecidedBy::Countback)));
        assert_eq!(resolver.compare("a1", "a2"), None);
    }

    #[test]
    fn test_countback_deeper_levels() {
        let p = placements(&[
            ("a1", &[("e1", 1), ("e2", 2), ("e3", 4)]),
            ("a2", &[("e1", 1), ("e2", 2), ("e3", 3)]),
        ]);
        let cfg = config(TiebreakMethod::Countback, None, None);
        let resolver = TiebreakResolver::new(&cfg, &p).unwrap();
        assert_eq!(resolver.ordering("a2", "a1"), Ordering::Less);
    }

    #[test]
    fn test_countback_no_placements_stays_tied() {
        let p = Placements::new();
        let cfg = config(TiebreakMethod::Countback, None, None);
        let resolver = TiebreakResolver::new(&cfg, &p).unwrap();
        assert_eq!(resolver.compare("a1", "a2"), None);
    }

    #[test]
    fn test_head_to_head() {
        let p = placements(&[
            ("a1", &[("e1", 2), ("final", 3)]),
            ("a2", &[("e1", 1), ("final", 1)]),
            ("a3", &[("e1", 1)]),
            ("a4", &[("e1", 3)]),
        ]);
        let cfg = config(TiebreakMethod::HeadToHead, None, Some("final"));
        let resolver = TiebreakResolver::new(&cfg, &p).unwrap();
        assert_eq!(resolver.compare("a2", "a1"), Some((Ordering::Less, DecidedBy::HeadToHead)));
        // Missing from the event counts as worse.
        assert_eq!(resolver.ordering("a1", "a3"), Ordering::Less);
        // Both missing: still tied.
        assert_eq!(resolver.compare("a3", "a4"), None);
    }

    #[test]
    fn test_head_to_head_requires_event() {
        let p = Placements::new();
        let cfg = config(TiebreakMethod::HeadToHead, None, None);
        let err = TiebreakResolver::new(&cfg, &p).err().unwrap();
        assert_eq!(err.to_string(), "headToHeadEventId is required for head_to_head tiebreaker");

        let cfg = config(TiebreakMethod::Countback, Some(TiebreakMethod::HeadToHead), None);
        assert!(TiebreakResolver::new(&cfg, &p).is_err());
    }

    #[test]
    fn test_secondary_only_when_primary_ties() {
        let p = placements(&[
            ("a1", &[("e1", 1), ("e2", 2), ("final", 2)]),
            ("a2", &[("e1", 2), ("e2", 1), ("final", 1)]),
        ]);
        let cfg = config(TiebreakMethod::Countback, Some(TiebreakMethod::HeadToHead), Some("final"));
        let resolver = TiebreakResolver::new(&cfg, &p).unwrap();
        assert_eq!(resolver.compare("a2", "a1"), Some((Ordering::Less, DecidedBy::HeadToHead)));

        let p = placements(&[
            ("a1", &[("e1", 1), ("e2", 1), ("final", 2)]),
            ("a2", &[("e1", 2), ("e2", 2), ("final", 1)]),
        ]);
        let resolver = TiebreakResolver::new(&cfg, &p).unwrap();
        assert_eq!(resolver.compare("a1", "a2"), Some((Ordering::Less, DecidedBy::Countback)));
    }

    #[test]
    fn test_none_leaves_ties() {
        let p = placements(&[("a1", &[("e1", 1)]), ("a2", &[("e1", 2)])]);
        let cfg = config(TiebreakMethod::None, None, None);
        let resolver = TiebreakResolver::new(&cfg, &p).unwrap();
        assert_eq!(resolver.compare("a1", "a2"), None);
    }

    #[test]
    fn test_shared_places() {
        let values = [200, 200, 150, 100, 100, 90];
        let places = shared_places(&values, |a, b| a == b);
        assert_eq!(places, vec![1, 1, 3, 4, 4, 6]);
        assert!(shared_places(&[] as &[i32], |a, b| a == b).is_empty());
    }
}
