//! Two-way merge of venue event streams by local capture time
//!
//! Both inputs must already be sorted by `local_timestamp_ns`. Chunked
//! decoding does not guarantee that, so each venue list goes through
//! [`sort_by_local_time`] first.

use std::iter::Peekable;

use crate::schema::CanonicalEvent;

/// Stable sort by `local_timestamp_ns`; ties keep their input order.
pub fn sort_by_local_time<E: CanonicalEvent>(events: &mut [E]) {
    events.sort_by_key(|e| e.local_timestamp_ns());
}

/// Streaming two-pointer merge. On equal timestamps the left input wins.
pub struct MergeByLocalTime<L, R>
where
    L: Iterator,
    R: Iterator<Item = L::Item>,
{
    left: Peekable<L>,
    right: Peekable<R>,
}

/// Merge two sorted event streams into one sorted stream
pub fn merge_by_local_time<E, L, R>(left: L, right: R) -> MergeByLocalTime<L::IntoIter, R::IntoIter>
where
    E: CanonicalEvent,
    L: IntoIterator<Item = E>,
    R: IntoIterator<Item = E>,
{
    MergeByLocalTime {
        left: left.into_iter().peekable(),
        right: right.into_iter().peekable(),
    }
}

impl<E, L, R> Iterator for MergeByLocalTime<L, R>
where
    E: CanonicalEvent,
    L: Iterator<Item = E>,
    R: Iterator<Item = E>,
{
    type Item = E;

    fn next(&mut self) -> Option<E> {
        match (self.left.peek(), self.right.peek()) {
            (Some(l), Some(r)) => {
                if l.local_timestamp_ns() <= r.local_timestamp_ns() {
                    self.left.next()
                } else {
                    self.right.next()
                }
            }
            (Some(_), None) => self.left.next(),
            (None, Some(_)) => self.right.next(),
            (None, None) => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (l_lo, l_hi) = self.left.size_hint();
        let (r_lo, r_hi) = self.right.size_hint();
        let hi = match (l_hi, r_hi) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        (l_lo.saturating_add(r_lo), hi)
    }
}

/// Sort both lists and merge them into one
pub fn merge_sorted<E: CanonicalEvent>(mut left: Vec<E>, mut right: Vec<E>) -> Vec<E> {
    sort_by_local_time(&mut left);
    sort_by_local_time(&mut right);
    let mut merged = Vec::with_capacity(left.len() + right.len());
    merged.extend(merge_by_local_time(left, right));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ev {
        source: &'static str,
        row: usize,
        ts: i64,
    }

    impl CanonicalEvent for Ev {
        fn instrument_id(&self) -> &str {
            self.source
        }

        fn local_timestamp_ns(&self) -> i64 {
            self.ts
        }
    }

    fn events(source: &'static str, ts: &[i64]) -> Vec<Ev> {
        ts.iter()
            .enumerate()
            .map(|(row, &ts)| Ev { source, row, ts })
            .collect()
    }

    /// Deterministic pseudo-random timestamps with plenty of ties
    fn lcg_timestamps(seed: u64, n: usize, range: i64) -> Vec<i64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) as i64).rem_euclid(range)
            })
            .collect()
    }

    #[test]
    fn test_merge_interleaves() {
        let merged: Vec<i64> = merge_by_local_time(events("L", &[1, 3, 5]), events("R", &[2, 4, 6]))
            .map(|e| e.ts)
            .collect();
        assert_eq!(merged, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_ties_favour_left() {
        let merged: Vec<_> = merge_by_local_time(events("L", &[5, 5]), events("R", &[5]))
            .map(|e| (e.source, e.row))
            .collect();
        assert_eq!(merged, vec![("L", 0), ("L", 1), ("R", 0)]);
    }

    #[test]
    fn test_drains_remainder() {
        let merged: Vec<i64> = merge_by_local_time(events("L", &[1]), events("R", &[2, 3, 4]))
            .map(|e| e.ts)
            .collect();
        assert_eq!(merged, vec![1, 2, 3, 4]);

        let merged: Vec<i64> = merge_by_local_time(events("L", &[]), events("R", &[7]))
            .map(|e| e.ts)
            .collect();
        assert_eq!(merged, vec![7]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut evs = events("L", &[3, 1, 3, 1, 2]);
        sort_by_local_time(&mut evs);
        let order: Vec<_> = evs.iter().map(|e| (e.ts, e.row)).collect();
        assert_eq!(order, vec![(1, 1), (1, 3), (2, 4), (3, 0), (3, 2)]);
    }

    #[test]
    fn test_merge_sorted_properties() {
        for seed in 1..20u64 {
            let left = events("L", &lcg_timestamps(seed, 50, 20));
            let right = events("R", &lcg_timestamps(seed * 7919, 37, 20));
            let merged = merge_sorted(left.clone(), right.clone());

            // Same multiset
            assert_eq!(merged.len(), left.len() + right.len());
            let mut expected: Vec<_> = left.iter().chain(right.iter()).map(|e| (e.source, e.row)).collect();
            let mut actual: Vec<_> = merged.iter().map(|e| (e.source, e.row)).collect();
            expected.sort();
            actual.sort();
            assert_eq!(actual, expected);

            for pair in merged.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(a.ts <= b.ts, "unsorted at seed {}", seed);
                if a.ts == b.ts {
                    // Left before right; within a source, original row order
                    assert!(!(a.source == "R" && b.source == "L"), "tie order at seed {}", seed);
                    if a.source == b.source {
                        assert!(a.row < b.row);
                    }
                }
            }
        }
    }

    #[test]
    fn test_size_hint() {
        let it = merge_by_local_time(events("L", &[1, 2]), events("R", &[3]));
        assert_eq!(it.size_hint(), (3, Some(3)));
    }
}
