use crate::{
    base::{BaseType, BaseValue},
    bbox::PeriodBox,
    error::{InvalidInput, Result},
    time::{Period, Timestamp},
    value::Instant,
};

/// A temporal value defined at a finite, strictly increasing set of
/// instants, and undefined everywhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantSet {
    base_type: BaseType,
    instants: Vec<Instant>,
}

impl InstantSet {
    /// Builds an `InstantSet` from instants in any order, rejecting
    /// duplicate timestamps and type-mixed values.
    pub fn new(mut instants: Vec<Instant>) -> Result<Self, InvalidInput> {
        if instants.is_empty() {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("an instant set needs at least one instant"));
        }
        instants.sort_unstable_by_key(Instant::timestamp);
        if instants.windows(2).any(|w| w[0].timestamp() == w[1].timestamp()) {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("instant set timestamps must be unique"));
        }
        let base_type = instants[0].value().base_type();
        if instants.iter().any(|i| i.value().base_type() != base_type) {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("all instants in a set must share a base type"));
        }
        Ok(Self { base_type, instants })
    }

    #[must_use]
    pub fn base_type(&self) -> BaseType {
        self.base_type
    }

    #[must_use]
    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    #[must_use]
    pub fn value_at_timestamp(&self, t: Timestamp) -> Option<&BaseValue> {
        self.instants.binary_search_by_key(&t, Instant::timestamp).ok().map(|i| self.instants[i].value())
    }

    #[must_use]
    pub fn period_box(&self) -> PeriodBox {
        PeriodBox::new(self.instants[0].timestamp(), self.instants[self.instants.len() - 1].timestamp())
    }

    /// Restricts the set to the instants lying within `period`.
    #[must_use]
    pub fn at_period(&self, period: &Period) -> Option<Self> {
        let kept: Vec<Instant> = self.instants.iter().filter(|i| period.contains_timestamp(i.timestamp())).cloned().collect();
        (!kept.is_empty()).then(|| Self { base_type: self.base_type, instants: kept })
    }

    /// Restricts the set to the instants lying outside `period`.
    #[must_use]
    pub fn minus_period(&self, period: &Period) -> Option<Self> {
        let kept: Vec<Instant> = self.instants.iter().filter(|i| !period.contains_timestamp(i.timestamp())).cloned().collect();
        (!kept.is_empty()).then(|| Self { base_type: self.base_type, instants: kept })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(micros: i64, v: i32) -> Instant {
        Instant::new(Timestamp::from_micros(micros), BaseValue::Integer(v))
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        assert!(InstantSet::new(vec![inst(0, 1), inst(0, 2)]).is_err());
    }

    #[test]
    fn rejects_mixed_base_types() {
        let mixed = vec![Instant::new(Timestamp::from_micros(0), BaseValue::Integer(1)), Instant::new(Timestamp::from_micros(1), BaseValue::Boolean(true))];
        assert!(InstantSet::new(mixed).is_err());
    }

    #[test]
    fn sorts_and_answers_by_timestamp() {
        let set = InstantSet::new(vec![inst(10, 2), inst(0, 1)]).unwrap();
        assert_eq!(set.value_at_timestamp(Timestamp::from_micros(0)), Some(&BaseValue::Integer(1)));
        assert_eq!(set.value_at_timestamp(Timestamp::from_micros(5)), None);
    }
}
