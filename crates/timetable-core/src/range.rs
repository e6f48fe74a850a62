//! Range folding of discrete week and period sets.
//!
//! Both splitters sort and deduplicate their input, then walk it once. They are
//! total over any finite input and never synthesize a value that was not in the
//! source set.

use std::collections::BTreeSet;

use crate::model::{PeriodRange, WeekParity, WeekRange};

/// ## Summary
/// Folds a set of week numbers into minimal contiguous/parity ranges.
///
/// The step of a run is fixed by its first gap, which must be exactly 1 or 2.
/// Any gap that does not match the established step (or a first gap that is
/// neither 1 nor 2) closes the run and starts a new one at the current week.
#[must_use]
pub fn split_weeks<I>(weeks: I) -> Vec<WeekRange>
where
    I: IntoIterator<Item = u32>,
{
    let sorted: BTreeSet<u32> = weeks.into_iter().collect();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut start = first;
    let mut prev = first;
    let mut step = 0;

    for week in iter {
        let gap = week - prev;
        if step == 0 && (gap == 1 || gap == 2) {
            step = gap;
        } else if gap != step {
            ranges.push(WeekRange::new(start, prev, WeekParity::from_step(step, start)));
            start = week;
            step = 0;
        } else {
            // continues the current run
        }
        prev = week;
    }

    ranges.push(WeekRange::new(start, prev, WeekParity::from_step(step, start)));
    tracing::trace!(count = ranges.len(), "Folded week set");
    ranges
}

/// ## Summary
/// Folds a set of period numbers into contiguous runs.
///
/// Any gap other than exactly 1 closes the current run.
#[must_use]
pub fn split_periods<I>(periods: I) -> Vec<PeriodRange>
where
    I: IntoIterator<Item = u32>,
{
    let sorted: BTreeSet<u32> = periods.into_iter().collect();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut start = first;
    let mut prev = first;

    for period in iter {
        if period - prev != 1 {
            ranges.push(PeriodRange::new(start, prev - start + 1));
            start = period;
        }
        prev = period;
    }

    ranges.push(PeriodRange::new(start, prev - start + 1));
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn odd_weeks_fold_to_one_range() {
        assert_eq!(
            split_weeks([1, 3, 5, 7, 9]),
            vec![WeekRange::new(1, 9, WeekParity::Odd)]
        );
    }

    #[test]
    fn even_weeks_fold_to_one_range() {
        assert_eq!(
            split_weeks([2, 4, 6]),
            vec![WeekRange::new(2, 6, WeekParity::Even)]
        );
    }

    #[test]
    fn gap_splits_contiguous_weeks() {
        assert_eq!(
            split_weeks([1, 2, 3, 4, 7, 8]),
            vec![
                WeekRange::new(1, 4, WeekParity::All),
                WeekRange::new(7, 8, WeekParity::All),
            ]
        );
    }

    #[test]
    fn unsorted_duplicates_are_normalized() {
        assert_eq!(
            split_weeks([4, 2, 3, 2, 1]),
            vec![WeekRange::new(1, 4, WeekParity::All)]
        );
    }

    #[test]
    fn step_change_closes_run() {
        assert_eq!(
            split_weeks([1, 3, 4]),
            vec![
                WeekRange::new(1, 3, WeekParity::Odd),
                WeekRange::new(4, 4, WeekParity::All),
            ]
        );
    }

    #[test]
    fn irregular_gap_fragments() {
        assert_eq!(
            split_weeks([1, 4, 7]),
            vec![
                WeekRange::new(1, 1, WeekParity::All),
                WeekRange::new(4, 4, WeekParity::All),
                WeekRange::new(7, 7, WeekParity::All),
            ]
        );
    }

    #[test]
    fn empty_and_single() {
        assert!(split_weeks(Vec::new()).is_empty());
        assert!(split_periods(Vec::new()).is_empty());
        assert_eq!(split_weeks([5]), vec![WeekRange::new(5, 5, WeekParity::All)]);
        assert_eq!(split_periods([5]), vec![PeriodRange::new(5, 1)]);
    }

    #[test]
    fn periods_split_on_any_gap() {
        assert_eq!(
            split_periods([1, 2, 3, 5, 6]),
            vec![PeriodRange::new(1, 3), PeriodRange::new(5, 2)]
        );
        assert_eq!(
            split_periods([1, 3, 5]),
            vec![
                PeriodRange::new(1, 1),
                PeriodRange::new(3, 1),
                PeriodRange::new(5, 1),
            ]
        );
    }

    proptest! {
        #[test]
        fn week_ranges_reconstruct_input(weeks in proptest::collection::btree_set(1u32..60, 0..30)) {
            let ranges = split_weeks(weeks.iter().copied());
            let mut covered = Vec::new();
            for range in &ranges {
                prop_assert!(range.start_week <= range.end_week);
                prop_assert!(range.parity.admits(range.start_week));
                covered.extend(range.weeks());
            }
            let expected: Vec<u32> = weeks.into_iter().collect();
            prop_assert_eq!(covered, expected);
        }

        #[test]
        fn period_ranges_reconstruct_input(periods in proptest::collection::btree_set(1u32..16, 0..16)) {
            let covered: Vec<u32> = split_periods(periods.iter().copied())
                .iter()
                .flat_map(|r| r.start_period..=r.end_period())
                .collect();
            let expected: Vec<u32> = periods.into_iter().collect();
            prop_assert_eq!(covered, expected);
        }
    }
}
