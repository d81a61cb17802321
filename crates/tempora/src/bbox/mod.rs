//! Bounding boxes — component C from `SPEC_FULL.md`.
//!
//! Every temporal value carries a bounding box used to short-circuit
//! overlap and containment tests before falling back to the full
//! synchronization walk (component E). The box's shape depends on the
//! value's base type: a bare time span for `Boolean`/`Text`, a time span
//! plus a numeric range for `Integer`/`Float`, and a time span plus a
//! spatial extent for point types.

use crate::{
    error::{Result, SridMismatch},
    time::{Period, Timestamp},
};

/// The time span a temporal value is defined over. Every [`BoundingBox`]
/// variant carries one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PeriodBox {
    pub min: Timestamp,
    pub max: Timestamp,
}

impl PeriodBox {
    #[must_use]
    pub const fn new(min: Timestamp, max: Timestamp) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_period(period: &Period) -> Self {
        Self { min: period.lower(), max: period.upper() }
    }

    #[must_use]
    pub fn expand(self, other: Self) -> Self {
        Self { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

/// A time span plus the range of values a numeric temporal value takes on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NumericBox {
    pub period: PeriodBox,
    pub min: f64,
    pub max: f64,
}

impl NumericBox {
    #[must_use]
    pub const fn new(period: PeriodBox, min: f64, max: f64) -> Self {
        Self { period, min, max }
    }

    #[must_use]
    pub fn expand(self, other: Self) -> Self {
        Self { period: self.period.expand(other.period), min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.period.intersects(other.period) && self.min <= other.max && other.min <= self.max
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.period.contains(other.period) && self.min <= other.min && other.max <= self.max
    }
}

/// A time span plus a spatial extent, for point-valued temporal values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpatioBox {
    pub period: PeriodBox,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
    pub srid: i32,
}

impl SpatioBox {
    #[must_use]
    pub fn expand(self, other: Self) -> Result<Self, SridMismatch> {
        require_same_srid(self.srid, other.srid)?;
        Ok(Self {
            period: self.period.expand(other.period),
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
            zmin: min_option(self.zmin, other.zmin),
            zmax: max_option(self.zmax, other.zmax),
            srid: self.srid,
        })
    }

    #[must_use]
    pub fn intersects_xy(&self, other: &Self) -> bool {
        self.srid == other.srid
            && self.period.intersects(other.period)
            && self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    #[must_use]
    pub fn contains_xy(&self, other: &Self) -> bool {
        self.srid == other.srid
            && self.period.contains(other.period)
            && self.xmin <= other.xmin
            && other.xmax <= self.xmax
            && self.ymin <= other.ymin
            && other.ymax <= self.ymax
    }
}

fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        _ => None,
    }
}

fn max_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    }
}

fn require_same_srid(a: i32, b: i32) -> Result<(), SridMismatch> {
    if a != b {
        return Err(error_stack::Report::new(SridMismatch).attach_printable(format!("srid {a} does not match srid {b}")));
    }
    Ok(())
}

/// The bounding box of a temporal value, shaped by its base type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BoundingBox {
    Period(PeriodBox),
    Numeric(NumericBox),
    Spatio(SpatioBox),
}

impl BoundingBox {
    #[must_use]
    pub const fn period(&self) -> PeriodBox {
        match self {
            Self::Period(b) => *b,
            Self::Numeric(b) => b.period,
            Self::Spatio(b) => b.period,
        }
    }

    /// Whether `self` and `other` might overlap. `false` is authoritative
    /// (no overlap is possible); `true` only means the boxes intersect and
    /// a full synchronization walk is needed to confirm.
    pub fn may_intersect(&self, other: &Self) -> Result<bool, SridMismatch> {
        Ok(match (self, other) {
            (Self::Period(a), Self::Period(b)) => a.intersects(*b),
            (Self::Numeric(a), Self::Numeric(b)) => a.intersects(*b),
            (Self::Spatio(a), Self::Spatio(b)) => {
                require_same_srid(a.srid, b.srid)?;
                a.intersects_xy(b)
            }
            (a, b) => a.period().intersects(b.period()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(micros: i64) -> Timestamp {
        Timestamp::from_micros(micros)
    }

    #[test]
    fn period_box_expand_and_intersects() {
        let a = PeriodBox::new(ts(0), ts(10));
        let b = PeriodBox::new(ts(5), ts(20));
        assert!(a.intersects(b));
        assert_eq!(a.expand(b), PeriodBox::new(ts(0), ts(20)));

        let c = PeriodBox::new(ts(30), ts(40));
        assert!(!a.intersects(c));
    }

    #[test]
    fn numeric_box_contains() {
        let outer = NumericBox::new(PeriodBox::new(ts(0), ts(100)), 0.0, 100.0);
        let inner = NumericBox::new(PeriodBox::new(ts(10), ts(20)), 10.0, 20.0);
        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
    }

    #[test]
    fn spatio_box_rejects_srid_mismatch() {
        let a = SpatioBox {
            period: PeriodBox::new(ts(0), ts(10)),
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 1.0,
            zmin: None,
            zmax: None,
            srid: 4326,
        };
        let mut b = a;
        b.srid = 3857;
        assert!(a.expand(b).is_err());
    }
}
