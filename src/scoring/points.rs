use super::config::{Algorithm, BaseTemplate, CustomTableConfig, MedianField, PScoreConfig, TraditionalConfig};
use crate::score::Direction;

/// Maps a 1-based place to event points.
pub trait PointsCurve {
    fn points_for_place(&self, place: u32) -> f64;
}

/// Front-loaded table rewarding the podium; every place past the table earns 1.
pub const WINNER_TAKES_MORE_TABLE: [f64; 28] = [
    100.0, 85.0, 75.0, 67.0, 60.0, 54.0, 49.0, 45.0, 41.0, 38.0, 35.0, 32.0, 30.0, 28.0, 26.0,
    24.0, 22.0, 20.0, 18.0, 16.0, 14.0, 12.0, 10.0, 8.0, 6.0, 4.0, 2.0, 1.0,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct WinnerTakesMoreTable;

impl PointsCurve for WinnerTakesMoreTable {
    fn points_for_place(&self, place: u32) -> f64 {
        let idx = place.max(1) as usize - 1;
        WINNER_TAKES_MORE_TABLE.get(idx).copied().unwrap_or(1.0)
    }
}

impl PointsCurve for TraditionalConfig {
    fn points_for_place(&self, place: u32) -> f64 {
        let place = place.max(1);
        (self.first_place_points - self.step * f64::from(place - 1)).max(0.0)
    }
}

/// Points equal place.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlinePoints;

impl PointsCurve for OnlinePoints {
    fn points_for_place(&self, place: u32) -> f64 {
        f64::from(place)
    }
}

/// Override table over a base template.
pub struct CustomCurve<'a> {
    pub table: &'a CustomTableConfig,
    pub traditional: &'a TraditionalConfig,
    pub winner_takes_more: &'a dyn PointsCurve,
}

impl PointsCurve for CustomCurve<'_> {
    fn points_for_place(&self, place: u32) -> f64 {
        if let Some(points) = self.table.overrides.get(&place) {
            return *points;
        }
        match self.table.base_template {
            BaseTemplate::Traditional => self.traditional.points_for_place(place),
            BaseTemplate::WinnerTakesMore => self.winner_takes_more.points_for_place(place),
        }
    }
}

/// The placement curve for `algorithm`, or `None` for P-Score, which is
/// computed from performances rather than places.
pub fn placement_curve<'a>(
    algorithm: &'a Algorithm,
    winner_takes_more: &'a dyn PointsCurve,
) -> Option<Box<dyn PointsCurve + 'a>> {
    match algorithm {
        Algorithm::Traditional(config) => Some(Box::new(*config)),
        Algorithm::WinnerTakesMore => Some(Box::new(Borrowed(winner_takes_more))),
        Algorithm::Online => Some(Box::new(OnlinePoints)),
        Algorithm::Custom { table, traditional } => Some(Box::new(CustomCurve {
            table,
            traditional,
            winner_takes_more,
        })),
        Algorithm::PScore(_) => None,
    }
}

struct Borrowed<'a>(&'a dyn PointsCurve);

impl PointsCurve for Borrowed<'_> {
    fn points_for_place(&self, place: u32) -> f64 {
        self.0.points_for_place(place)
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Scale event points by a percentage multiplier (100 leaves them unchanged).
pub fn apply_multiplier(points: f64, multiplier_percent: f64) -> f64 {
    round2(points * multiplier_percent / 100.0)
}

fn median_of(sorted_best_first: &[i64], field: MedianField) -> Option<f64> {
    let n = sorted_best_first.len();
    if n == 0 {
        return None;
    }
    match field {
        MedianField::TopHalf => {
            let idx = n.div_ceil(2) - 1;
            Some(sorted_best_first[idx] as f64)
        }
        MedianField::All => {
            let mid = n / 2;
            if n % 2 == 1 {
                Some(sorted_best_first[mid] as f64)
            } else {
                Some((sorted_best_first[mid - 1] as f64 + sorted_best_first[mid] as f64) / 2.0)
            }
        }
    }
}

/// P-Score for each value, in input order.
///
/// The best value earns 100 and the median earns 50; everything else scales
/// linearly with its distance from the best. When the configured median
/// equals the best value the whole-field median is used instead, and if that
/// also equals the best, every non-best value scores 0.
pub fn p_scores(values: &[i64], direction: Direction, config: &PScoreConfig) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| direction.compare(*a, *b));
    let Some(&best) = sorted.first() else {
        return Vec::new();
    };
    let best_f = best as f64;

    let spread = [config.median_field, MedianField::All]
        .into_iter()
        .filter_map(|field| median_of(&sorted, field))
        .map(|median| (median - best_f).abs())
        .find(|spread| *spread > 0.0);

    values
        .iter()
        .map(|&value| {
            if value == best {
                return 100.0;
            }
            let score = match spread {
                Some(spread) => round2(100.0 - (value as f64 - best_f).abs() * 50.0 / spread),
                None => 0.0,
            };
            if config.allow_negatives {
                score
            } else {
                score.max(0.0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn pscore(median_field: MedianField, allow_negatives: bool) -> PScoreConfig {
        PScoreConfig {
            allow_negatives,
            median_field,
        }
    }

    #[test]
    fn test_traditional_points() {
        let config = TraditionalConfig::default();
        let points: Vec<f64> = (1..=4).map(|p| config.points_for_place(p)).collect();
        assert_eq!(points, vec![100.0, 95.0, 90.0, 85.0]);
        assert_eq!(config.points_for_place(21), 0.0);
        assert_eq!(config.points_for_place(40), 0.0);
    }

    #[test]
    fn test_winner_takes_more_table() {
        let curve = WinnerTakesMoreTable;
        assert_eq!(curve.points_for_place(1), 100.0);
        assert_eq!(curve.points_for_place(2), 85.0);
        assert_eq!(curve.points_for_place(6), 54.0);
        assert_eq!(curve.points_for_place(28), 1.0);
        assert_eq!(curve.points_for_place(29), 1.0);
        assert_eq!(curve.points_for_place(500), 1.0);
    }

    #[test]
    fn test_online_points_equal_place() {
        assert_eq!(OnlinePoints.points_for_place(1), 1.0);
        assert_eq!(OnlinePoints.points_for_place(7), 7.0);
    }

    #[test]
    fn test_custom_overrides_and_fallback() {
        let table = CustomTableConfig {
            base_template: BaseTemplate::WinnerTakesMore,
            overrides: BTreeMap::from([(1, 150.0)]),
        };
        let traditional = TraditionalConfig::default();
        let curve = CustomCurve {
            table: &table,
            traditional: &traditional,
            winner_takes_more: &WinnerTakesMoreTable,
        };
        assert_eq!(curve.points_for_place(1), 150.0);
        assert_eq!(curve.points_for_place(2), 85.0);

        let table = CustomTableConfig {
            base_template: BaseTemplate::Traditional,
            overrides: BTreeMap::from([(2, 90.0)]),
        };
        let curve = CustomCurve {
            table: &table,
            traditional: &traditional,
            winner_takes_more: &WinnerTakesMoreTable,
        };
        assert_eq!(curve.points_for_place(1), 100.0);
        assert_eq!(curve.points_for_place(2), 90.0);
        assert_eq!(curve.points_for_place(3), 90.0);
    }

    #[test]
    fn test_swapped_curve() {
        struct Flat;
        impl PointsCurve for Flat {
            fn points_for_place(&self, _place: u32) -> f64 {
                10.0
            }
        }
        let algorithm = Algorithm::WinnerTakesMore;
        let curve = placement_curve(&algorithm, &Flat).unwrap();
        assert_eq!(curve.points_for_place(1), 10.0);
        assert!(placement_curve(&Algorithm::PScore(PScoreConfig::default()), &Flat).is_none());
    }

    #[test]
    fn test_multiplier() {
        assert_eq!(apply_multiplier(95.0, 100.0), 95.0);
        assert_eq!(apply_multiplier(95.0, 200.0), 190.0);
        assert_eq!(apply_multiplier(85.0, 50.0), 42.5);
        assert_eq!(apply_multiplier(33.333, 100.0), 33.33);
    }

    #[test]
    fn test_p_score_time_top_half() {
        let scores = p_scores(&[300, 360, 420, 480], Direction::LowerIsBetter, &pscore(MedianField::TopHalf, true));
        assert_eq!(scores, vec![100.0, 50.0, 0.0, -50.0]);

        let floored = p_scores(&[300, 360, 420, 480], Direction::LowerIsBetter, &pscore(MedianField::TopHalf, false));
        assert_eq!(floored[3], 0.0);
    }

    #[test]
    fn test_p_score_six_athletes() {
        let times = [300, 330, 360, 400, 450, 500];
        let scores = p_scores(&times, Direction::LowerIsBetter, &pscore(MedianField::TopHalf, true));
        assert_eq!(scores[1], 75.0);
        assert_eq!(scores[2], 50.0);

        let reps = [200, 180, 160, 140, 120, 100];
        let scores = p_scores(&reps, Direction::HigherIsBetter, &pscore(MedianField::TopHalf, true));
        assert_eq!(scores[0], 100.0);
        assert_eq!(scores[1], 75.0);
    }

    #[test]
    fn test_p_score_all_field_median() {
        // Median of all: (360 + 420) / 2 = 390, spread 90.
        let scores = p_scores(&[300, 360, 420, 480], Direction::LowerIsBetter, &pscore(MedianField::All, true));
        assert_eq!(scores[0], 100.0);
        assert_eq!(scores[1], round2(100.0 - 60.0 * 50.0 / 90.0));
    }

    #[test]
    fn test_p_score_degenerate_fields() {
        assert!(p_scores(&[], Direction::LowerIsBetter, &PScoreConfig::default()).is_empty());
        assert_eq!(p_scores(&[300], Direction::LowerIsBetter, &PScoreConfig::default()), vec![100.0]);
        assert_eq!(
            p_scores(&[300, 300, 300], Direction::LowerIsBetter, &PScoreConfig::default()),
            vec![100.0, 100.0, 100.0]
        );
        // Two athletes: top-half median is the winner, whole-field median is 330.
        let two = p_scores(&[300, 360], Direction::LowerIsBetter, &PScoreConfig::default());
        assert_eq!(two, vec![100.0, 0.0]);
    }

    #[test]
    fn test_p_score_ties_share_100() {
        let scores = p_scores(&[300, 300, 360, 420], Direction::LowerIsBetter, &PScoreConfig::default());
        assert_eq!(scores[0], 100.0);
        assert_eq!(scores[1], 100.0);
    }
}
