use crate::{
    base::{BaseType, BaseValue},
    bbox::PeriodBox,
    error::{InvalidInput, Result},
    time::{Period, PeriodSet, Timestamp},
    value::{Instant, Interpolation, Sequence, SequenceBuilder},
};

/// A temporal value made of several disjoint (possibly adjacent, in which
/// case the value jumps discontinuously across the shared boundary)
/// continuous pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSet {
    base_type: BaseType,
    interpolation: Interpolation,
    sequences: Vec<Sequence>,
}

impl SequenceSet {
    #[must_use]
    pub fn base_type(&self) -> BaseType {
        self.base_type
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[must_use]
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    #[must_use]
    pub fn period_box(&self) -> PeriodBox {
        let first = self.sequences[0].period_box();
        self.sequences.iter().skip(1).fold(first, |acc, s| acc.expand(s.period_box()))
    }

    #[must_use]
    pub fn period_set(&self) -> PeriodSet {
        PeriodSet::normalize(self.sequences.iter().map(Sequence::period).collect())
    }

    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<Option<BaseValue>, InvalidInput> {
        match self.sequences.iter().find(|s| s.period().contains_timestamp(t)) {
            Some(s) => s.value_at_timestamp(t),
            None => Ok(None),
        }
    }

    /// Restricts the set to the parts of its sequences overlapping
    /// `period`.
    #[must_use]
    pub fn at_period(&self, period: &Period) -> Option<Self> {
        let kept: Vec<Sequence> = self.sequences.iter().filter_map(|s| s.at_period(period)).collect();
        (!kept.is_empty()).then_some(Self { base_type: self.base_type, interpolation: self.interpolation, sequences: kept })
    }

    /// Removes `period` from every member sequence, dropping any that
    /// vanish entirely and keeping any that split in two.
    #[must_use]
    pub fn minus_period(&self, period: &Period) -> Option<Self> {
        let kept: Vec<Sequence> = self.sequences.iter().flat_map(|s| s.minus_period(period)).collect();
        (!kept.is_empty()).then_some(Self { base_type: self.base_type, interpolation: self.interpolation, sequences: kept })
    }
}

/// Validated construction of a [`SequenceSet`] from its member sequences.
#[derive(Debug, Clone, Default)]
pub struct SequenceSetBuilder {
    sequences: Vec<Sequence>,
}

impl SequenceSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    pub fn build(mut self) -> Result<SequenceSet, InvalidInput> {
        if self.sequences.is_empty() {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("a sequence set needs at least one sequence"));
        }
        self.sequences.sort_unstable_by(|a, b| a.period().cmp(&b.period()));
        let base_type = self.sequences[0].base_type();
        let interpolation = self.sequences[0].interpolation();
        for s in &self.sequences {
            if s.base_type() != base_type {
                return Err(error_stack::Report::new(InvalidInput).attach_printable("all sequences in a set must share a base type"));
            }
            if s.interpolation() != interpolation {
                return Err(error_stack::Report::new(InvalidInput).attach_printable("all sequences in a set must share an interpolation"));
            }
        }
        for pair in self.sequences.windows(2) {
            if pair[0].period().intersect(&pair[1].period()).is_some() {
                return Err(error_stack::Report::new(InvalidInput).attach_printable("sequences in a set must not overlap"));
            }
        }
        Ok(SequenceSet { base_type, interpolation, sequences: self.sequences })
    }

    /// Builds the set, first merging any adjacent sequences that touch at
    /// an inclusive/inclusive boundary with an equal value there — the same
    /// way `SequenceBuilder::build_normalized` collapses collinear samples
    /// within a single sequence.
    pub fn build_normalized(mut self) -> Result<SequenceSet, InvalidInput> {
        if self.sequences.is_empty() {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("a sequence set needs at least one sequence"));
        }
        self.sequences.sort_unstable_by(|a, b| a.period().cmp(&b.period()));
        let base_type = self.sequences[0].base_type();
        let interpolation = self.sequences[0].interpolation();
        for s in &self.sequences {
            if s.base_type() != base_type {
                return Err(error_stack::Report::new(InvalidInput).attach_printable("all sequences in a set must share a base type"));
            }
            if s.interpolation() != interpolation {
                return Err(error_stack::Report::new(InvalidInput).attach_printable("all sequences in a set must share an interpolation"));
            }
        }

        let mut merged: Vec<Sequence> = Vec::with_capacity(self.sequences.len());
        for next in self.sequences {
            let touches_with_equal_value = merged.last().is_some_and(|prev: &Sequence| {
                prev.upper_inc()
                    && next.lower_inc()
                    && prev.period().upper() == next.period().lower()
                    && prev.instants().last().map(Instant::value) == next.instants().first().map(Instant::value)
            });
            if touches_with_equal_value {
                let prev = merged.pop().expect("just checked merged.last()");
                let mut builder = SequenceBuilder::new(interpolation).lower_inc(prev.lower_inc()).upper_inc(next.upper_inc());
                for instant in prev.instants() {
                    builder = builder.instant(instant.timestamp(), instant.value().clone());
                }
                for instant in &next.instants()[1..] {
                    builder = builder.instant(instant.timestamp(), instant.value().clone());
                }
                merged.push(builder.build_normalized()?);
                continue;
            }
            if let Some(prev) = merged.last() {
                if prev.period().intersect(&next.period()).is_some() {
                    return Err(error_stack::Report::new(InvalidInput).attach_printable("sequences in a set must not overlap"));
                }
            }
            merged.push(next);
        }
        Ok(SequenceSet { base_type, interpolation, sequences: merged })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(lo: i64, hi: i64) -> Sequence {
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(lo), BaseValue::Float(lo as f64))
            .instant(Timestamp::from_micros(hi), BaseValue::Float(hi as f64))
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_overlapping_sequences() {
        let set = SequenceSetBuilder::new().sequence(seq(0, 10)).sequence(seq(5, 15)).build();
        assert!(set.is_err());
    }

    #[test]
    fn accepts_adjacent_disjoint_sequences() {
        let set = SequenceSetBuilder::new().sequence(seq(10, 20)).sequence(seq(0, 10)).build().unwrap();
        assert_eq!(set.sequences().len(), 2);
        assert_eq!(set.sequences()[0].period().lower(), Timestamp::from_micros(0));
    }

    #[test]
    fn value_at_timestamp_finds_the_right_piece() {
        let set = SequenceSetBuilder::new().sequence(seq(0, 10)).sequence(seq(20, 30)).build().unwrap();
        assert!(set.value_at_timestamp(Timestamp::from_micros(25)).unwrap().is_some());
        assert!(set.value_at_timestamp(Timestamp::from_micros(15)).unwrap().is_none());
    }

    #[test]
    fn build_normalized_merges_sequences_touching_at_an_equal_value() {
        let a = SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(0.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(10.0))
            .build()
            .unwrap();
        let b = SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(10), BaseValue::Float(10.0))
            .instant(Timestamp::from_micros(20), BaseValue::Float(20.0))
            .build()
            .unwrap();
        let set = SequenceSetBuilder::new().sequence(a).sequence(b).build_normalized().unwrap();
        assert_eq!(set.sequences().len(), 1);
        let merged = &set.sequences()[0];
        assert_eq!(merged.instants().len(), 2);
        assert_eq!(merged.instants()[0].timestamp(), Timestamp::from_micros(0));
        assert_eq!(merged.instants()[1].timestamp(), Timestamp::from_micros(20));
    }

    #[test]
    fn build_normalized_still_rejects_a_genuine_overlap() {
        let set = SequenceSetBuilder::new().sequence(seq(0, 10)).sequence(seq(5, 15)).build_normalized();
        assert!(set.is_err());
    }
}
