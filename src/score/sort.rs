use std::cmp::Ordering;

use super::format::Score;
use super::scheme::{Direction, ScoreStatus};

/// Orderable key for a [`Score`]. Smaller keys rank better.
///
/// Fields are normalized so that ascending order is always best-first,
/// whatever the scheme's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub class: u8,
    pub primary: i64,
    pub tiebreak: i64,
}

fn normalize(direction: Direction, value: i64) -> i64 {
    match direction {
        Direction::LowerIsBetter => value,
        Direction::HigherIsBetter => value.saturating_neg(),
    }
}

fn primary_key(score: &Score) -> i64 {
    match score.status {
        // Capped athletes are ranked on reps completed, more is better.
        ScoreStatus::Cap => score
            .time_cap
            .and_then(|cap| cap.secondary_value)
            .map(|reps| reps.saturating_neg())
            .unwrap_or(i64::MAX),
        ScoreStatus::Scored => score
            .value
            .map(|v| normalize(score.scheme.direction(), v))
            .unwrap_or(i64::MAX),
        ScoreStatus::Dq | ScoreStatus::Withdrawn => 0,
    }
}

fn tiebreak_key(score: &Score) -> Option<i64> {
    score
        .tiebreak
        .map(|tb| normalize(tb.scheme.direction(), tb.value))
}

pub fn compute_sort_key(score: &Score) -> SortKey {
    SortKey {
        class: score.status.sort_order(),
        primary: primary_key(score),
        tiebreak: tiebreak_key(score).unwrap_or(i64::MAX),
    }
}

/// Compare two scores, best first.
///
/// Tiebreaks only separate two scores when both of them carry one; a score
/// without a tiebreak compares equal to an otherwise identical score with one.
pub fn compare_scores(a: &Score, b: &Score) -> Ordering {
    let (ka, kb) = (compute_sort_key(a), compute_sort_key(b));
    ka.class
        .cmp(&kb.class)
        .then(ka.primary.cmp(&kb.primary))
        .then_with(|| match (tiebreak_key(a), tiebreak_key(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        })
}

/// Stable sort, best first.
///
/// Uses [`compute_sort_key`], which is a total order: among scores tied on
/// status and value, those without a tiebreak follow those with one.
pub fn sort_scores(scores: &mut [Score]) {
    scores.sort_by_key(compute_sort_key);
}

/// 1-based rank `target` would take in `field`, sharing rank with equal scores.
pub fn find_rank(target: &Score, field: &[Score]) -> usize {
    1 + field
        .iter()
        .filter(|s| compare_scores(s, target) == Ordering::Less)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::format::TimeCap;
    use crate::score::scheme::Scheme;

    fn capped(reps: i64) -> Score {
        let mut score = Score::with_status(Scheme::TimeWithCap, ScoreStatus::Cap);
        score.time_cap = Some(TimeCap {
            ms: 900_000,
            secondary_scheme: Scheme::Reps,
            secondary_value: Some(reps),
        });
        score
    }

    #[test]
    fn test_sort_key_direction() {
        let fast = compute_sort_key(&Score::scored(Scheme::Time, 510_000));
        let slow = compute_sort_key(&Score::scored(Scheme::Time, 720_000));
        assert!(fast < slow);

        let many = compute_sort_key(&Score::scored(Scheme::Reps, 150));
        let few = compute_sort_key(&Score::scored(Scheme::Reps, 100));
        assert!(many < few);
    }

    #[test]
    fn test_sort_key_status_order() {
        let scored = compute_sort_key(&Score::scored(Scheme::Time, 900_000));
        let cap = compute_sort_key(&Score::with_status(Scheme::Time, ScoreStatus::Cap));
        let dq = compute_sort_key(&Score::with_status(Scheme::Time, ScoreStatus::Dq));
        let wd = compute_sort_key(&Score::with_status(Scheme::Time, ScoreStatus::Withdrawn));
        assert!(scored < cap);
        assert!(cap < dq);
        assert!(dq < wd);
    }

    #[test]
    fn test_full_field_sort() {
        let scheme = Scheme::TimeWithCap;
        let mut field = vec![
            Score::scored(scheme, 510_000).with_tiebreak(Scheme::Reps, 75),
            Score::scored(scheme, 510_000).with_tiebreak(Scheme::Reps, 90),
            capped(180),
            Score::with_status(scheme, ScoreStatus::Dq),
            Score::scored(scheme, 600_000),
            Score::with_status(scheme, ScoreStatus::Withdrawn),
            capped(150),
        ];
        sort_scores(&mut field);

        assert_eq!(field[0].tiebreak.unwrap().value, 90);
        assert_eq!(field[1].tiebreak.unwrap().value, 75);
        assert_eq!(field[2].value, Some(600_000));
        assert_eq!(field[3].time_cap.unwrap().secondary_value, Some(180));
        assert_eq!(field[4].time_cap.unwrap().secondary_value, Some(150));
        assert_eq!(field[5].status, ScoreStatus::Dq);
        assert_eq!(field[6].status, ScoreStatus::Withdrawn);
    }

    #[test]
    fn test_time_tiebreak_lower_wins() {
        let mut field = vec![
            Score::scored(Scheme::RoundsReps, 500_012).with_tiebreak(Scheme::Time, 600_000),
            Score::scored(Scheme::RoundsReps, 500_012).with_tiebreak(Scheme::Time, 510_000),
            Score::scored(Scheme::RoundsReps, 500_012).with_tiebreak(Scheme::Time, 540_000),
        ];
        sort_scores(&mut field);
        let order: Vec<i64> = field.iter().map(|s| s.tiebreak.unwrap().value).collect();
        assert_eq!(order, vec![510_000, 540_000, 600_000]);
    }

    #[test]
    fn test_primary_beats_tiebreak() {
        let worse = Score::scored(Scheme::RoundsReps, 500_010).with_tiebreak(Scheme::Time, 300_000);
        let better = Score::scored(Scheme::RoundsReps, 500_015).with_tiebreak(Scheme::Time, 600_000);
        assert_eq!(compare_scores(&better, &worse), Ordering::Less);
    }

    #[test]
    fn test_missing_tiebreak_compares_equal() {
        let bare = Score::scored(Scheme::RoundsReps, 500_012);
        let with_tb = Score::scored(Scheme::RoundsReps, 500_012).with_tiebreak(Scheme::Time, 510_000);
        assert_eq!(compare_scores(&bare, &with_tb), Ordering::Equal);

        let mut field = vec![bare.clone(), with_tb.clone()];
        sort_scores(&mut field);
        assert_eq!(field[0], with_tb);
    }

    #[test]
    fn test_find_rank() {
        let field: Vec<Score> = [600_000, 510_000, 720_000, 540_000]
            .into_iter()
            .map(|v| Score::scored(Scheme::Time, v))
            .collect();
        assert_eq!(find_rank(&Score::scored(Scheme::Time, 540_000), &field), 2);

        let tied: Vec<Score> = [510_000, 540_000, 540_000, 600_000]
            .into_iter()
            .map(|v| Score::scored(Scheme::Time, v))
            .collect();
        assert_eq!(find_rank(&Score::scored(Scheme::Time, 540_000), &tied), 2);
        assert_eq!(find_rank(&Score::scored(Scheme::Time, 600_000), &tied), 4);
    }
}
