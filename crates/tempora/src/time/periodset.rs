use crate::time::{Period, Timestamp};

/// A finite, pairwise non-overlapping, non-adjacent, ordered collection of
/// periods — the canonical form produced by [`periodarr_normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSet(Vec<Period>);

impl PeriodSet {
    /// Normalizes an arbitrary slice of periods into canonical form:
    /// sorted, with overlapping or adjacent periods merged.
    #[must_use]
    pub fn normalize(periods: Vec<Period>) -> Self {
        Self(periodarr_normalize(periods))
    }

    /// Builds a `PeriodSet` from a slice that the caller guarantees is
    /// already sorted, disjoint, and non-adjacent.
    #[must_use]
    pub fn from_normalized_unchecked(periods: Vec<Period>) -> Self {
        Self(periods)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Period] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finds the period containing `t`, or the index at which a period
    /// covering `t` would be inserted.
    #[must_use]
    pub fn find_timestamp(&self, t: Timestamp) -> (bool, usize) {
        periodarr_find_timestamp(&self.0, t)
    }

    #[must_use]
    pub fn contains_timestamp(&self, t: Timestamp) -> bool {
        self.find_timestamp(t).0
    }
}

/// Sorts by [`Period::cmp`], then folds any pair that overlaps or is
/// adjacent into a single merged period.
#[must_use]
pub fn periodarr_normalize(mut periods: Vec<Period>) -> Vec<Period> {
    periods.sort_unstable_by(Period::cmp);
    let mut normalized: Vec<Period> = Vec::with_capacity(periods.len());
    for period in periods {
        match normalized.last_mut() {
            Some(last) if last.overlaps(&period) || last.adjacent(&period) => {
                *last = last.union(&period).into_iter().next().expect("overlap/adjacency implies a single merged period");
            }
            _ => normalized.push(period),
        }
    }
    normalized
}

/// Binary searches a normalized, disjoint, sorted period array for the
/// period containing `t`.
///
/// Returns `(true, index)` if `periods[index]` contains `t`, otherwise
/// `(false, index)` where `index` is the position at which a period
/// covering `t` would need to be inserted to keep the array sorted.
#[must_use]
pub fn periodarr_find_timestamp(periods: &[Period], t: Timestamp) -> (bool, usize) {
    let mut lo = 0usize;
    let mut hi = periods.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let period = &periods[mid];
        if period.contains_timestamp(t) {
            return (true, mid);
        }
        if t < period.lower() {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    (false, lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lo: i64, hi: i64, li: bool, ui: bool) -> Period {
        Period::new(Timestamp::from_micros(lo), Timestamp::from_micros(hi), li, ui).unwrap()
    }

    #[test]
    fn normalize_merges_overlaps_and_adjacency() {
        let periods = vec![p(20, 30, true, true), p(0, 10, true, false), p(10, 20, true, true)];
        let normalized = periodarr_normalize(periods);
        assert_eq!(normalized, vec![p(0, 30, true, true)]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = periodarr_normalize(vec![p(0, 5, true, true), p(10, 15, true, true)]);
        let twice = periodarr_normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn find_timestamp_hits_and_misses() {
        let set = PeriodSet::normalize(vec![p(0, 10, true, false), p(20, 30, true, true)]);
        assert_eq!(set.find_timestamp(Timestamp::from_micros(5)), (true, 0));
        assert_eq!(set.find_timestamp(Timestamp::from_micros(15)), (false, 1));
        assert_eq!(set.find_timestamp(Timestamp::from_micros(25)), (true, 1));
        assert_eq!(set.find_timestamp(Timestamp::from_micros(40)), (false, 2));
    }
}
