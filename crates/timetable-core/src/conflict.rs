//! Day/week/period overlap detection between canonical sessions.

use crate::model::{CanonicalSession, WeekParity};

/// ## Summary
/// Returns whether two sessions ever occupy the same period on the same calendar week.
///
/// Sessions on different weekdays never conflict. Week ranges must intersect;
/// an `All` session overlaps any intersecting range, equal parities overlap,
/// and opposite parities (odd vs even) never land on the same week.
#[must_use]
pub fn sessions_overlap(a: &CanonicalSession, b: &CanonicalSession) -> bool {
    a.day_of_week == b.day_of_week && weeks_overlap(a, b) && periods_overlap(a, b)
}

fn weeks_overlap(a: &CanonicalSession, b: &CanonicalSession) -> bool {
    if a.start_week > b.end_week || b.start_week > a.end_week {
        return false;
    }
    match (a.week_parity, b.week_parity) {
        (WeekParity::All, _) | (_, WeekParity::All) => true,
        (left, right) => left == right,
    }
}

fn periods_overlap(a: &CanonicalSession, b: &CanonicalSession) -> bool {
    a.start_period <= b.end_period() && b.start_period <= a.end_period()
}

/// ## Summary
/// Returns every session in `existing` that overlaps `target`.
///
/// A candidate sharing `target`'s storage identity is the record being edited
/// and is skipped.
#[must_use]
pub fn find_conflicts<'a>(
    target: &CanonicalSession,
    existing: &'a [CanonicalSession],
) -> Vec<&'a CanonicalSession> {
    existing
        .iter()
        .filter(|candidate| !(target.id.is_some() && candidate.id == target.id))
        .filter(|candidate| sessions_overlap(target, candidate))
        .collect()
}

/// ## Summary
/// Lists every unordered pair of indices `(i, j)` with `i < j` whose sessions conflict.
#[must_use]
pub fn conflict_pairs(sessions: &[CanonicalSession]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in sessions.iter().enumerate() {
        for (offset, b) in sessions[i + 1..].iter().enumerate() {
            if sessions_overlap(a, b) {
                pairs.push((i, i + 1 + offset));
            }
        }
    }
    if !pairs.is_empty() {
        tracing::debug!(count = pairs.len(), "Found conflicting session pairs");
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PeriodRange, WeekRange};
    use proptest::prelude::*;

    fn session(day: u8, weeks: WeekRange, periods: PeriodRange) -> CanonicalSession {
        CanonicalSession::from_ranges("Course", "", "", day, weeks, periods)
    }

    fn all_weeks() -> WeekRange {
        WeekRange::new(1, 16, WeekParity::All)
    }

    #[test]
    fn shared_period_conflicts() {
        let a = session(1, all_weeks(), PeriodRange::new(1, 2));
        let b = session(1, all_weeks(), PeriodRange::new(2, 2));
        assert_eq!(find_conflicts(&a, std::slice::from_ref(&b)).len(), 1);
    }

    #[test]
    fn adjacent_periods_do_not_conflict() {
        let a = session(1, all_weeks(), PeriodRange::new(1, 2));
        let b = session(1, all_weeks(), PeriodRange::new(3, 2));
        assert!(find_conflicts(&a, std::slice::from_ref(&b)).is_empty());
    }

    #[test]
    fn different_days_do_not_conflict() {
        let a = session(1, all_weeks(), PeriodRange::new(1, 2));
        let b = session(2, all_weeks(), PeriodRange::new(1, 2));
        assert!(!sessions_overlap(&a, &b));
    }

    #[test]
    fn odd_and_even_never_conflict() {
        let a = session(3, WeekRange::new(1, 15, WeekParity::Odd), PeriodRange::new(1, 2));
        let b = session(3, WeekRange::new(2, 16, WeekParity::Even), PeriodRange::new(1, 2));
        assert!(!sessions_overlap(&a, &b));
        assert!(!sessions_overlap(&b, &a));
    }

    #[test]
    fn same_parity_conflicts_when_ranges_meet() {
        let a = session(3, WeekRange::new(1, 7, WeekParity::Odd), PeriodRange::new(1, 2));
        let b = session(3, WeekRange::new(7, 15, WeekParity::Odd), PeriodRange::new(2, 1));
        assert!(sessions_overlap(&a, &b));
    }

    #[test]
    fn disjoint_week_ranges_do_not_conflict() {
        let a = session(3, WeekRange::new(1, 8, WeekParity::All), PeriodRange::new(1, 2));
        let b = session(3, WeekRange::new(9, 16, WeekParity::All), PeriodRange::new(1, 2));
        assert!(!sessions_overlap(&a, &b));
    }

    #[test]
    fn edited_record_is_excluded() {
        let mut a = session(1, all_weeks(), PeriodRange::new(1, 2));
        a.id = Some(7);
        let mut stored = a.clone();
        stored.name = "Old name".to_string();
        let mut other = a.clone();
        other.id = Some(8);
        let existing = vec![stored, other];
        let conflicts = find_conflicts(&a, &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, Some(8));
    }

    #[test]
    fn unsaved_sessions_are_never_excluded() {
        let a = session(1, all_weeks(), PeriodRange::new(1, 2));
        assert_eq!(find_conflicts(&a, std::slice::from_ref(&a)).len(), 1);
    }

    #[test]
    fn pairs_are_reported_once() {
        let sessions = vec![
            session(1, all_weeks(), PeriodRange::new(1, 2)),
            session(1, all_weeks(), PeriodRange::new(2, 2)),
            session(1, all_weeks(), PeriodRange::new(5, 1)),
            session(1, all_weeks(), PeriodRange::new(1, 1)),
        ];
        assert_eq!(conflict_pairs(&sessions), vec![(0, 1), (0, 3)]);
    }

    fn arb_session() -> impl Strategy<Value = CanonicalSession> {
        (1u8..=3, 1u32..10, 0u32..8, 0u8..3, 1u32..6, 1u32..3).prop_map(
            |(day, start, len, parity, start_period, duration)| {
                let parity = match parity {
                    0 => WeekParity::All,
                    1 => WeekParity::Odd,
                    _ => WeekParity::Even,
                };
                let start = if parity.admits(start) { start } else { start + 1 };
                session(
                    day,
                    WeekRange::new(start, start + len * parity.step(), parity),
                    PeriodRange::new(start_period, duration),
                )
            },
        )
    }

    proptest! {
        #[test]
        fn conflict_detection_is_symmetric(a in arb_session(), b in arb_session()) {
            prop_assert_eq!(
                find_conflicts(&a, std::slice::from_ref(&b)).is_empty(),
                find_conflicts(&b, std::slice::from_ref(&a)).is_empty()
            );
        }
    }
}
