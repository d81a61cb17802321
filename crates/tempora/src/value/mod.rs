//! The four temporal value variants — component D from `SPEC_FULL.md`.
//!
//! [`Temporal`] is the public sum type; [`Instant`], [`InstantSet`],
//! [`Sequence`], and [`SequenceSet`] are its four shapes, each able to
//! answer `value_at_timestamp` and to be restricted to (`at_*`) or excluded
//! from (`minus_*`) a time domain.

mod instant;
mod instant_set;
mod interpolation;
mod sequence;
mod sequence_set;

pub use self::{
    instant::Instant,
    instant_set::InstantSet,
    interpolation::Interpolation,
    sequence::{Sequence, SequenceBuilder},
    sequence_set::{SequenceSet, SequenceSetBuilder},
};

use error_stack::ResultExt as _;

use crate::{
    base::{BaseType, BaseValue},
    bbox::{BoundingBox, NumericBox, PeriodBox, SpatioBox},
    error::{InvalidInput, Result},
    time::{Period, PeriodSet, TimeSet, Timestamp},
};

/// A value whose evolution over time takes one of four shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    Instant(Instant),
    InstantSet(InstantSet),
    Sequence(Sequence),
    SequenceSet(SequenceSet),
}

impl Temporal {
    #[must_use]
    pub fn base_type(&self) -> BaseType {
        match self {
            Self::Instant(i) => i.value().base_type(),
            Self::InstantSet(s) => s.base_type(),
            Self::Sequence(s) => s.base_type(),
            Self::SequenceSet(s) => s.base_type(),
        }
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        match self {
            Self::Instant(_) | Self::InstantSet(_) => Interpolation::Discrete,
            Self::Sequence(s) => s.interpolation(),
            Self::SequenceSet(s) => s.interpolation(),
        }
    }

    #[must_use]
    pub fn period_box(&self) -> PeriodBox {
        match self {
            Self::Instant(i) => i.period_box(),
            Self::InstantSet(s) => s.period_box(),
            Self::Sequence(s) => s.period_box(),
            Self::SequenceSet(s) => s.period_box(),
        }
    }

    /// The bounding box shaped by this value's base type: a bare time span
    /// for `Boolean`/`Text`, a time span plus numeric range for
    /// `Integer`/`Float`, or a time span plus spatial extent for points.
    ///
    /// Computing the numeric/spatial extent requires walking every
    /// instant; callers evaluating many queries against the same value
    /// should cache the result.
    pub fn bounding_box(&self) -> Result<BoundingBox, InvalidInput> {
        let period = self.period_box();
        match self.base_type() {
            BaseType::Integer | BaseType::Float => {
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                for v in self.sample_values() {
                    let scalar = v.as_scalar().ok_or_else(|| {
                        error_stack::Report::new(InvalidInput).attach_printable("expected a numeric sample")
                    })?;
                    min = min.min(scalar);
                    max = max.max(scalar);
                }
                Ok(BoundingBox::Numeric(NumericBox::new(period, min, max)))
            }
            BaseType::Point2D => {
                let mut b: Option<SpatioBox> = None;
                for v in self.sample_values() {
                    let BaseValue::Point2D(p) = v else {
                        return Err(error_stack::Report::new(InvalidInput).attach_printable("expected a Point2D sample"));
                    };
                    let sample = SpatioBox { period, xmin: p.x, xmax: p.x, ymin: p.y, ymax: p.y, zmin: None, zmax: None, srid: p.srid };
                    b = Some(match b {
                        Some(existing) => existing.expand(sample).change_context(InvalidInput)?,
                        None => sample,
                    });
                }
                Ok(BoundingBox::Spatio(b.expect("a temporal value always has at least one sample")))
            }
            BaseType::Point3D => {
                let mut b: Option<SpatioBox> = None;
                for v in self.sample_values() {
                    let BaseValue::Point3D(p) = v else {
                        return Err(error_stack::Report::new(InvalidInput).attach_printable("expected a Point3D sample"));
                    };
                    let sample = SpatioBox { period, xmin: p.x, xmax: p.x, ymin: p.y, ymax: p.y, zmin: Some(p.z), zmax: Some(p.z), srid: p.srid };
                    b = Some(match b {
                        Some(existing) => existing.expand(sample).change_context(InvalidInput)?,
                        None => sample,
                    });
                }
                Ok(BoundingBox::Spatio(b.expect("a temporal value always has at least one sample")))
            }
            _ => Ok(BoundingBox::Period(period)),
        }
    }

    fn sample_values(&self) -> Box<dyn Iterator<Item = &BaseValue> + '_> {
        match self {
            Self::Instant(i) => Box::new(std::iter::once(i.value())),
            Self::InstantSet(s) => Box::new(s.instants().iter().map(Instant::value)),
            Self::Sequence(s) => Box::new(s.instants().iter().map(Instant::value)),
            Self::SequenceSet(s) => Box::new(s.sequences().iter().flat_map(Sequence::instants).map(Instant::value)),
        }
    }

    /// Evaluates the value at `t`, returning `None` when `t` is outside the
    /// value's domain.
    pub fn value_at_timestamp(&self, t: Timestamp) -> Result<Option<BaseValue>, InvalidInput> {
        Ok(match self {
            Self::Instant(i) => i.value_at_timestamp(t).cloned(),
            Self::InstantSet(s) => s.value_at_timestamp(t).cloned(),
            Self::Sequence(s) => s.value_at_timestamp(t)?,
            Self::SequenceSet(s) => s.value_at_timestamp(t)?,
        })
    }

    #[must_use]
    pub fn at_timestamp(&self, t: Timestamp) -> Option<Self> {
        let v = self.value_at_timestamp(t).ok().flatten()?;
        Some(Self::Instant(Instant::new(t, v)))
    }

    #[must_use]
    pub fn minus_timestamp(&self, t: Timestamp) -> Option<Self> {
        match self {
            Self::Instant(i) => (i.timestamp() != t).then(|| self.clone()),
            Self::InstantSet(s) => {
                let kept: Vec<Instant> = s.instants().iter().filter(|i| i.timestamp() != t).cloned().collect();
                if kept.len() == s.instants().len() {
                    Some(self.clone())
                } else {
                    InstantSet::new(kept).ok().map(Self::InstantSet)
                }
            }
            Self::Sequence(s) if !s.period().contains_timestamp(t) => Some(self.clone()),
            Self::Sequence(_) | Self::SequenceSet(_) => {
                // Splitting a continuous piece at an interior instant would
                // require re-deriving two independent sequences; left to a
                // future `split_at` helper once a caller needs it.
                None
            }
        }
    }

    #[must_use]
    pub fn at_timestampset(&self, set: &TimeSet) -> Option<Self> {
        match self {
            Self::Instant(i) => set.contains(i.timestamp()).then(|| self.clone()),
            Self::InstantSet(s) => {
                let kept: Vec<Instant> = s.instants().iter().filter(|i| set.contains(i.timestamp())).cloned().collect();
                InstantSet::new(kept).ok().map(Self::InstantSet)
            }
            Self::Sequence(s) => {
                let kept: Vec<Instant> =
                    set.as_slice().iter().filter_map(|&t| s.value_at_timestamp(t).ok().flatten().map(|v| Instant::new(t, v))).collect();
                InstantSet::new(kept).ok().map(Self::InstantSet)
            }
            Self::SequenceSet(s) => {
                let kept: Vec<Instant> = set
                    .as_slice()
                    .iter()
                    .filter_map(|&t| s.value_at_timestamp(t).ok().flatten().map(|v| Instant::new(t, v)))
                    .collect();
                InstantSet::new(kept).ok().map(Self::InstantSet)
            }
        }
    }

    #[must_use]
    pub fn minus_timestampset(&self, set: &TimeSet) -> Option<Self> {
        match self {
            Self::Instant(i) => (!set.contains(i.timestamp())).then(|| self.clone()),
            Self::InstantSet(s) => {
                let kept: Vec<Instant> = s.instants().iter().filter(|i| !set.contains(i.timestamp())).cloned().collect();
                InstantSet::new(kept).ok().map(Self::InstantSet)
            }
            Self::Sequence(_) | Self::SequenceSet(_) => {
                // See `minus_timestamp`: puncturing a continuous piece at
                // isolated instants isn't representable by these four
                // variants without a split operation.
                Some(self.clone())
            }
        }
    }

    #[must_use]
    pub fn at_period(&self, period: &Period) -> Option<Self> {
        match self {
            Self::Instant(i) => period.contains_timestamp(i.timestamp()).then(|| self.clone()),
            Self::InstantSet(s) => s.at_period(period).map(Self::InstantSet),
            Self::Sequence(s) => s.at_period(period).map(Self::Sequence),
            Self::SequenceSet(s) => s.at_period(period).map(Self::SequenceSet),
        }
    }

    /// Excluding a period from a continuous piece can leave zero, one, or
    /// two surviving pieces — a hole in the middle splits it in two, which
    /// is why the result may come back as a `SequenceSet` even when `self`
    /// was a single `Sequence`.
    #[must_use]
    pub fn minus_period(&self, period: &Period) -> Option<Self> {
        match self {
            Self::Instant(i) => (!period.contains_timestamp(i.timestamp())).then(|| self.clone()),
            Self::InstantSet(s) => s.minus_period(period).map(Self::InstantSet),
            Self::Sequence(s) => Self::sequences_to_temporal(s.minus_period(period)),
            Self::SequenceSet(s) => s.minus_period(period).map(Self::SequenceSet),
        }
    }

    #[must_use]
    pub fn at_periodset(&self, set: &PeriodSet) -> Option<Self> {
        match self {
            Self::Instant(i) => set.contains_timestamp(i.timestamp()).then(|| self.clone()),
            Self::InstantSet(s) => {
                let kept: Vec<Instant> = s.instants().iter().filter(|i| set.contains_timestamp(i.timestamp())).cloned().collect();
                InstantSet::new(kept).ok().map(Self::InstantSet)
            }
            Self::Sequence(s) => {
                let pieces: Vec<Sequence> = set.as_slice().iter().filter_map(|p| s.at_period(p)).collect();
                Self::sequences_to_temporal(pieces)
            }
            Self::SequenceSet(s) => {
                let pieces: Vec<Sequence> = set
                    .as_slice()
                    .iter()
                    .filter_map(|p| s.at_period(p))
                    .flat_map(|piece_set| piece_set.sequences().to_vec())
                    .collect();
                Self::sequences_to_temporal(pieces)
            }
        }
    }

    #[must_use]
    pub fn minus_periodset(&self, set: &PeriodSet) -> Option<Self> {
        set.as_slice().iter().try_fold(self.clone(), |acc, p| acc.minus_period(p))
    }

    pub(crate) fn sequences_to_temporal(mut pieces: Vec<Sequence>) -> Option<Self> {
        match pieces.len() {
            0 => None,
            1 => Some(Self::Sequence(pieces.remove(0))),
            _ => {
                let mut builder = SequenceSetBuilder::new();
                for piece in pieces {
                    builder = builder.sequence(piece);
                }
                builder.build().ok().map(Self::SequenceSet)
            }
        }
    }
}
