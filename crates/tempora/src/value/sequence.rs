use crate::{
    base::{self, BaseType, BaseValue},
    bbox::PeriodBox,
    error::{InvalidInput, Result},
    time::{Period, Timestamp},
    value::{Instant, Interpolation},
};

/// A temporal value whose domain is a single continuous (or stepwise, or
/// discrete) time span, carried as a sorted run of instants plus the
/// inclusivity of its two end bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    base_type: BaseType,
    interpolation: Interpolation,
    instants: Vec<Instant>,
    lower_inc: bool,
    upper_inc: bool,
}

impl Sequence {
    #[must_use]
    pub fn base_type(&self) -> BaseType {
        self.base_type
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[must_use]
    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    #[must_use]
    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    #[must_use]
    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    #[must_use]
    pub fn period(&self) -> Period {
        Period::new(self.instants[0].timestamp(), self.instants[self.instants.len() - 1].timestamp(), self.lower_inc, self.upper_inc)
            .expect("a built sequence always has a valid period")
    }

    #[must_use]
    pub fn period_box(&self) -> PeriodBox {
        PeriodBox::from_period(&self.period())
    }

    /// Evaluates the sequence at `t`, interpolating between the bracketing
    /// instants according to [`Interpolation`]. Returns `None` when `t`
    /// falls outside the sequence's period, or at an excluded endpoint.
    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<Option<BaseValue>, InvalidInput> {
        if !self.period().contains_timestamp(t) {
            return Ok(None);
        }
        if let Ok(i) = self.instants.binary_search_by_key(&t, Instant::timestamp) {
            return Ok(Some(self.instants[i].value().clone()));
        }
        // t falls strictly between two instants; that's only possible for
        // a continuous interpolation since a discrete sequence is only
        // ever an isolated instant run with a matching period.
        let after = self.instants.partition_point(|i| i.timestamp() < t);
        let (left, right) = (&self.instants[after - 1], &self.instants[after]);
        match self.interpolation {
            Interpolation::Discrete => Ok(None),
            Interpolation::Stepwise => Ok(Some(left.value().clone())),
            Interpolation::Linear => {
                let span = (right.timestamp().as_micros() - left.timestamp().as_micros()) as f64;
                let u = (t.as_micros() - left.timestamp().as_micros()) as f64 / span;
                base::lerp(left.value(), right.value(), u).map(Some)
            }
        }
    }

    /// Restricts the sequence to the portion overlapping `period`, if any.
    /// The result may itself need gaps split out by the caller when
    /// `period` is only part of a larger [`PeriodSet`](crate::PeriodSet);
    /// `Temporal::at_periodset` handles that.
    #[must_use]
    pub fn at_period(&self, period: &Period) -> Option<Self> {
        let overlap = self.period().intersect(period)?;
        self.clamp_to(overlap)
    }

    /// The pieces of `self` left after removing `period`: empty if `period`
    /// covers the whole sequence, one piece if it removes an edge, two if
    /// it punches a hole in the middle.
    #[must_use]
    pub fn minus_period(&self, period: &Period) -> Vec<Self> {
        self.period().difference(period).into_iter().filter_map(|window| self.clamp_to(window)).collect()
    }

    /// Drops interior instants that lie exactly on the line through their
    /// neighbors. A no-op unless interpolation is `Linear` over a scalar
    /// (`Integer`/`Float`) base type — points are left untouched.
    #[must_use]
    fn simplify_collinear(self) -> Self {
        if !matches!(self.interpolation, Interpolation::Linear) || self.instants.len() < 3 {
            return self;
        }
        let Some(scalars) = self.instants.iter().map(|i| i.value().as_scalar()).collect::<Option<Vec<f64>>>() else {
            return self;
        };
        let mut kept = vec![0usize];
        for i in 1..self.instants.len() - 1 {
            let &last = kept.last().expect("kept always has at least one index");
            let (t0, t1, t2) = (
                self.instants[last].timestamp().as_micros() as f64,
                self.instants[i].timestamp().as_micros() as f64,
                self.instants[i + 1].timestamp().as_micros() as f64,
            );
            let (v0, v1, v2) = (scalars[last], scalars[i], scalars[i + 1]);
            let expected = v0 + (v2 - v0) * (t1 - t0) / (t2 - t0);
            if (v1 - expected).abs() > 1e-9 {
                kept.push(i);
            }
        }
        kept.push(self.instants.len() - 1);
        let instants = kept.into_iter().map(|idx| self.instants[idx].clone()).collect();
        Self { instants, ..self }
    }

    fn clamp_to(&self, window: Period) -> Option<Self> {
        let mut kept: Vec<Instant> = self
            .instants
            .iter()
            .filter(|i| window.contains_timestamp(i.timestamp()))
            .cloned()
            .collect();
        if kept.is_empty() {
            // The window falls strictly between two instants; only a
            // degenerate (single-timestamp) window can still produce a
            // result, by interpolating the value at that instant.
            return (window.lower() == window.upper())
                .then(|| self.value_at_timestamp(window.lower()).ok().flatten())
                .flatten()
                .map(|v| Self {
                    base_type: self.base_type,
                    interpolation: self.interpolation,
                    instants: vec![Instant::new(window.lower(), v)],
                    lower_inc: true,
                    upper_inc: true,
                });
        }
        if self.interpolation.is_continuous() {
            if kept[0].timestamp() != window.lower() {
                if let Ok(Some(v)) = self.value_at_timestamp(window.lower()) {
                    kept.insert(0, Instant::new(window.lower(), v));
                }
            }
            let last = kept.len() - 1;
            if kept[last].timestamp() != window.upper() {
                if let Ok(Some(v)) = self.value_at_timestamp(window.upper()) {
                    kept.push(Instant::new(window.upper(), v));
                }
            }
        }
        let lower_inc = kept[0].timestamp() != window.lower() || window.lower_inc();
        let upper_inc = kept[kept.len() - 1].timestamp() != window.upper() || window.upper_inc();
        Some(Self { base_type: self.base_type, interpolation: self.interpolation, instants: kept, lower_inc, upper_inc })
    }
}

/// Validated, immutable construction of a [`Sequence`].
///
/// Mirrors the builder-then-`build()` idiom used elsewhere in this crate's
/// lineage for types whose invariants can only be checked once every field
/// is present: instants must be strictly increasing, share a base type, and
/// (for `Linear`) that base type must support interpolation.
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    instants: Vec<Instant>,
    interpolation: Interpolation,
    lower_inc: bool,
    upper_inc: bool,
}

impl SequenceBuilder {
    #[must_use]
    pub fn new(interpolation: Interpolation) -> Self {
        Self { instants: Vec::new(), interpolation, lower_inc: true, upper_inc: true }
    }

    #[must_use]
    pub fn instant(mut self, timestamp: Timestamp, value: BaseValue) -> Self {
        self.instants.push(Instant::new(timestamp, value));
        self
    }

    #[must_use]
    pub fn lower_inc(mut self, inclusive: bool) -> Self {
        self.lower_inc = inclusive;
        self
    }

    #[must_use]
    pub fn upper_inc(mut self, inclusive: bool) -> Self {
        self.upper_inc = inclusive;
        self
    }

    pub fn build(mut self) -> Result<Sequence, InvalidInput> {
        if self.instants.is_empty() {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("a sequence needs at least one instant"));
        }
        self.instants.sort_unstable_by_key(Instant::timestamp);
        if self.instants.windows(2).any(|w| w[0].timestamp() == w[1].timestamp()) {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("sequence instants must have distinct timestamps"));
        }
        let base_type = self.instants[0].value().base_type();
        if self.instants.iter().any(|i| i.value().base_type() != base_type) {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("all instants in a sequence must share a base type"));
        }
        if self.instants.len() == 1 && !(self.lower_inc && self.upper_inc) {
            return Err(error_stack::Report::new(InvalidInput).attach_printable("a single-instant sequence must be inclusive on both sides"));
        }
        if matches!(self.interpolation, Interpolation::Linear) && !base_type.supports_linear() {
            return Err(error_stack::Report::new(InvalidInput)
                .attach_printable(format!("{base_type:?} does not support linear interpolation")));
        }
        Ok(Sequence { base_type, interpolation: self.interpolation, instants: self.instants, lower_inc: self.lower_inc, upper_inc: self.upper_inc })
    }

    /// Builds the sequence, then collapses any run of collinear Linear
    /// samples down to their two endpoints.
    pub fn build_normalized(self) -> Result<Sequence, InvalidInput> {
        self.build().map(Sequence::simplify_collinear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(interp: Interpolation, pts: &[(i64, f64)]) -> Sequence {
        let mut b = SequenceBuilder::new(interp);
        for (t, v) in pts {
            b = b.instant(Timestamp::from_micros(*t), BaseValue::Float(*v));
        }
        b.build().unwrap()
    }

    #[test]
    fn linear_interpolates_between_instants() {
        let s = seq(Interpolation::Linear, &[(0, 0.0), (10, 100.0)]);
        let v = s.value_at_timestamp(Timestamp::from_micros(5)).unwrap().unwrap();
        assert_eq!(v, BaseValue::Float(50.0));
    }

    #[test]
    fn stepwise_holds_left_value() {
        let s = seq(Interpolation::Stepwise, &[(0, 1.0), (10, 2.0)]);
        let v = s.value_at_timestamp(Timestamp::from_micros(5)).unwrap().unwrap();
        assert_eq!(v, BaseValue::Float(1.0));
    }

    #[test]
    fn out_of_period_is_none() {
        let s = seq(Interpolation::Linear, &[(0, 0.0), (10, 100.0)]);
        assert!(s.value_at_timestamp(Timestamp::from_micros(20)).unwrap().is_none());
    }

    #[test]
    fn build_normalized_drops_the_collinear_midpoint() {
        let s = SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(0.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(10.0))
            .instant(Timestamp::from_micros(20), BaseValue::Float(20.0))
            .build_normalized()
            .unwrap();
        assert_eq!(s.instants().len(), 2);
        assert_eq!(s.instants()[0].timestamp(), Timestamp::from_micros(0));
        assert_eq!(s.instants()[1].timestamp(), Timestamp::from_micros(20));
    }

    #[test]
    fn build_normalized_keeps_a_genuine_bend() {
        let s = SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(0.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(5.0))
            .instant(Timestamp::from_micros(20), BaseValue::Float(20.0))
            .build_normalized()
            .unwrap();
        assert_eq!(s.instants().len(), 3);
    }

    #[test]
    fn builder_rejects_linear_on_unsupported_type() {
        let s = SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Text("a".into()))
            .instant(Timestamp::from_micros(1), BaseValue::Text("b".into()))
            .build();
        assert!(s.is_err());
    }

    #[test]
    fn discrete_sequence_may_carry_several_instants() {
        let s = SequenceBuilder::new(Interpolation::Discrete)
            .instant(Timestamp::from_micros(0), BaseValue::Integer(1))
            .instant(Timestamp::from_micros(10), BaseValue::Integer(2))
            .build()
            .unwrap();
        assert_eq!(s.instants().len(), 2);
        assert_eq!(s.value_at_timestamp(Timestamp::from_micros(0)).unwrap(), Some(BaseValue::Integer(1)));
        assert_eq!(s.value_at_timestamp(Timestamp::from_micros(10)).unwrap(), Some(BaseValue::Integer(2)));
        // Discrete is only defined exactly at its instants, even though it
        // now permits more than one — querying strictly between two of them
        // still reads as undefined.
        assert!(s.value_at_timestamp(Timestamp::from_micros(5)).unwrap().is_none());
    }
}
