use core::{cmp::Ordering, ops::Bound};

use interval_ops::{compare_bounds, BoundType, Interval, IntervalBound};

use crate::{
    error::{InvalidInput, Result},
    time::Timestamp,
};

/// A period's bound: always inclusive or exclusive, never unbounded.
///
/// Narrower than a general interval bound that also allows `Unbounded` —
/// periods here are always finite (`spec.md` §3 forbids empty periods and
/// this library never needs open-ended decision-time ranges).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PeriodBound {
    Inclusive(Timestamp),
    Exclusive(Timestamp),
}

impl PeriodBound {
    #[must_use]
    pub const fn timestamp(self) -> Timestamp {
        match self {
            Self::Inclusive(t) | Self::Exclusive(t) => t,
        }
    }

    #[must_use]
    pub const fn is_inclusive(self) -> bool {
        matches!(self, Self::Inclusive(_))
    }
}

impl IntervalBound<Timestamp> for PeriodBound {
    fn as_bound(&self) -> Bound<&Timestamp> {
        match self {
            Self::Inclusive(t) => Bound::Included(t),
            Self::Exclusive(t) => Bound::Excluded(t),
        }
    }

    fn into_bound(self) -> Bound<Timestamp> {
        match self {
            Self::Inclusive(t) => Bound::Included(t),
            Self::Exclusive(t) => Bound::Excluded(t),
        }
    }

    fn from_bound(bound: Bound<Timestamp>) -> Self {
        match bound {
            Bound::Included(t) => Self::Inclusive(t),
            Bound::Excluded(t) => Self::Exclusive(t),
            Bound::Unbounded => unimplemented!("periods never have an unbounded side"),
        }
    }
}

type PeriodInterval = Interval<Timestamp, PeriodBound, PeriodBound>;

/// A closed-open (or closed-closed, or open-open) timestamp interval.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Period {
    lower: Timestamp,
    upper: Timestamp,
    lower_inc: bool,
    upper_inc: bool,
}

impl Period {
    /// Builds a period, rejecting inverted or empty-but-exclusive bounds.
    #[tracing::instrument(level = "trace")]
    pub fn new(lower: Timestamp, upper: Timestamp, lower_inc: bool, upper_inc: bool) -> Result<Self, InvalidInput> {
        if lower > upper {
            return Err(error_stack::Report::new(InvalidInput)
                .attach_printable(format!("lower bound {lower} is after upper bound {upper}")));
        }
        if lower == upper && !(lower_inc && upper_inc) {
            return Err(error_stack::Report::new(InvalidInput)
                .attach_printable(format!("degenerate period at {lower} must be inclusive on both sides")));
        }
        Ok(Self { lower, upper, lower_inc, upper_inc })
    }

    #[must_use]
    pub const fn lower(&self) -> Timestamp {
        self.lower
    }

    #[must_use]
    pub const fn upper(&self) -> Timestamp {
        self.upper
    }

    #[must_use]
    pub const fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    #[must_use]
    pub const fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.lower.as_micros() == self.upper.as_micros()
    }

    fn as_interval(self) -> PeriodInterval {
        let lower_bound = if self.lower_inc { PeriodBound::Inclusive(self.lower) } else { PeriodBound::Exclusive(self.lower) };
        let upper_bound = if self.upper_inc { PeriodBound::Inclusive(self.upper) } else { PeriodBound::Exclusive(self.upper) };
        PeriodInterval::new_unchecked(lower_bound, upper_bound)
    }

    fn from_interval(interval: PeriodInterval) -> Self {
        let (lower, upper) = interval.into_bounds();
        Self {
            lower: lower.timestamp(),
            upper: upper.timestamp(),
            lower_inc: lower.is_inclusive(),
            upper_inc: upper.is_inclusive(),
        }
    }

    /// Compares two periods by the bound-ordering rule, first on lower
    /// bounds and then (if equal) on upper bounds.
    #[must_use]
    pub fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.as_interval(), other.as_interval());
        match compare_bounds(a.start().as_bound(), b.start().as_bound(), BoundType::Start, BoundType::Start) {
            Ordering::Equal => compare_bounds(a.end().as_bound(), b.end().as_bound(), BoundType::End, BoundType::End),
            ordering => ordering,
        }
    }

    #[must_use]
    pub fn contains_timestamp(&self, t: Timestamp) -> bool {
        self.as_interval().contains_point(&t)
    }

    #[must_use]
    pub fn contains_period(&self, other: &Self) -> bool {
        self.as_interval().contains_interval(&other.as_interval())
    }

    /// Whether `self` (treated as the earlier-or-equal period) touches
    /// `other` at a single inclusive/exclusive boundary.
    #[must_use]
    pub fn adjacent(&self, other: &Self) -> bool {
        self.as_interval().is_adjacent_to(&other.as_interval())
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.as_interval().overlaps(&other.as_interval())
    }

    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        self.as_interval().intersect(other.as_interval()).map(Self::from_interval)
    }

    /// Either the single merged period (when overlapping or adjacent) or
    /// both periods in order.
    #[must_use]
    pub fn union(&self, other: &Self) -> Vec<Self> {
        self.as_interval().union(other.as_interval()).map(Self::from_interval).collect()
    }

    /// `self` with any overlap with `other` removed: zero, one, or two
    /// periods, in time order.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Vec<Self> {
        self.as_interval().difference(other.as_interval()).map(Self::from_interval).collect()
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        Period::cmp(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lo: i64, hi: i64, li: bool, ui: bool) -> Period {
        Period::new(Timestamp::from_micros(lo), Timestamp::from_micros(hi), li, ui).unwrap()
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(Period::new(Timestamp::from_micros(10), Timestamp::from_micros(0), true, true).is_err());
    }

    #[test]
    fn rejects_degenerate_exclusive_period() {
        assert!(Period::new(Timestamp::from_micros(5), Timestamp::from_micros(5), true, false).is_err());
        assert!(Period::new(Timestamp::from_micros(5), Timestamp::from_micros(5), true, true).is_ok());
    }

    #[test]
    fn adjacency_requires_exactly_one_inclusive_side() {
        let a = p(0, 10, true, false);
        let b = p(10, 20, true, true);
        assert!(a.adjacent(&b));
        assert!(!a.overlaps(&b));

        let c = p(0, 10, true, true);
        let d = p(10, 20, false, true);
        assert!(!c.adjacent(&d));
        assert!(c.overlaps(&d));
    }

    #[test]
    fn union_of_adjacent_periods_merges_to_one() {
        let a = p(0, 10, true, false);
        let b = p(10, 20, true, true);
        let merged = a.union(&b);
        assert_eq!(merged, vec![p(0, 20, true, true)]);
    }

    #[test]
    fn union_of_disjoint_periods_keeps_two() {
        let a = p(0, 5, true, true);
        let b = p(10, 15, true, true);
        assert_eq!(a.union(&b), vec![a, b]);
    }

    #[test]
    fn intersect_respects_inclusivity() {
        let a = p(0, 10, true, true);
        let b = p(10, 20, false, true);
        assert_eq!(a.intersect(&b), None);

        let c = p(0, 10, true, true);
        let d = p(10, 20, true, true);
        assert_eq!(c.intersect(&d), Some(p(10, 10, true, true)));
    }

    #[test]
    fn cmp_tie_breaks_on_bound_ordering_rule() {
        let a = p(0, 10, true, true);
        let b = p(0, 10, true, false);
        assert_eq!(a.cmp(&b), Ordering::Greater);
    }

    #[test]
    fn difference_punches_a_hole() {
        let whole = p(0, 10, true, true);
        let middle = p(3, 6, true, true);
        assert_eq!(whole.difference(&middle), vec![p(0, 3, true, false), p(6, 10, false, true)]);
    }

    #[test]
    fn difference_of_disjoint_period_is_unchanged() {
        let a = p(0, 5, true, true);
        let b = p(10, 15, true, true);
        assert_eq!(a.difference(&b), vec![a]);
    }

    #[test]
    fn contains_period() {
        let outer = p(0, 100, true, true);
        let inner = p(10, 20, true, false);
        assert!(outer.contains_period(&inner));
        assert!(!inner.contains_period(&outer));
    }
}
