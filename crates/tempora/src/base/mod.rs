//! Base-value helpers — component A from `SPEC_FULL.md`.
//!
//! Order, equality, and arithmetic over the base types a temporal value can
//! carry, plus the building blocks (linear-root finding, product-extremum
//! finding) that synchronization (component E) uses to inject turning
//! points and crossings.

mod numeric;
mod point;

pub use self::{
    numeric::{linear_root_fraction, product_extremum_fraction},
    point::{Point2D, Point3D},
};

use crate::error::{DivisionByZero, InvalidInput, Overflow, Result, Unsupported};

/// The runtime tag for a [`BaseValue`]'s underlying type.
///
/// Carried alongside the value itself (rather than inferred from it) so
/// `lift4`-style operators can dispatch on two independent type tags, as
/// `SPEC_FULL.md` §4.E requires.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BaseType {
    Boolean,
    Integer,
    Float,
    Text,
    Point2D,
    Point3D,
    GeogPoint,
}

impl BaseType {
    /// Whether `Linear` interpolation is defined for this type.
    #[must_use]
    pub const fn supports_linear(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Point2D | Self::Point3D | Self::GeogPoint)
    }

    /// Whether this type has a total order (`lt`/`le`/`gt`/`ge`), as opposed
    /// to equality only.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::Boolean | Self::Integer | Self::Float | Self::Text)
    }
}

/// A geographic point: longitude/latitude in degrees, with an optional
/// altitude. Great-circle arithmetic is a collaborator's responsibility
/// (`SPEC_FULL.md` §9, Open Question 3) — the core only stores and
/// linearly interpolates the raw coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeogPoint {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

/// One instantaneous value of a temporal value's base type.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseValue {
    Boolean(bool),
    Integer(i32),
    Float(f64),
    Text(String),
    Point2D(Point2D),
    Point3D(Point3D),
    GeogPoint(GeogPoint),
}

impl BaseValue {
    #[must_use]
    pub fn base_type(&self) -> BaseType {
        match self {
            Self::Boolean(_) => BaseType::Boolean,
            Self::Integer(_) => BaseType::Integer,
            Self::Float(_) => BaseType::Float,
            Self::Text(_) => BaseType::Text,
            Self::Point2D(_) => BaseType::Point2D,
            Self::Point3D(_) => BaseType::Point3D,
            Self::GeogPoint(_) => BaseType::GeogPoint,
        }
    }

    /// The value's position on the real line, for types where that is
    /// meaningful to linear interpolation and root-finding (`Integer` and
    /// `Float`; points are interpolated component-wise instead).
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(f64::from(*i)),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Equality and (where defined) ordering over [`BaseValue`]s of the same
/// type.
pub fn eq(a: &BaseValue, b: &BaseValue) -> bool {
    a == b
}

pub fn ne(a: &BaseValue, b: &BaseValue) -> bool {
    !eq(a, b)
}

fn ordered_pair<'a>(a: &'a BaseValue, b: &'a BaseValue) -> Result<(f64, f64), Unsupported> {
    match (a, b) {
        (BaseValue::Integer(a), BaseValue::Integer(b)) => Ok((f64::from(*a), f64::from(*b))),
        (BaseValue::Float(a), BaseValue::Float(b)) => Ok((*a, *b)),
        (BaseValue::Integer(a), BaseValue::Float(b)) => Ok((f64::from(*a), *b)),
        (BaseValue::Float(a), BaseValue::Integer(b)) => Ok((*a, f64::from(*b))),
        (BaseValue::Boolean(a), BaseValue::Boolean(b)) => Ok((f64::from(*a), f64::from(*b))),
        _ => Err(error_stack::Report::new(Unsupported).attach_printable("ordering is undefined for this type pair")),
    }
}

pub fn lt(a: &BaseValue, b: &BaseValue) -> Result<bool, Unsupported> {
    if let (BaseValue::Text(a), BaseValue::Text(b)) = (a, b) {
        return Ok(a < b);
    }
    ordered_pair(a, b).map(|(a, b)| a < b)
}

pub fn le(a: &BaseValue, b: &BaseValue) -> Result<bool, Unsupported> {
    if let (BaseValue::Text(a), BaseValue::Text(b)) = (a, b) {
        return Ok(a <= b);
    }
    ordered_pair(a, b).map(|(a, b)| a <= b)
}

pub fn gt(a: &BaseValue, b: &BaseValue) -> Result<bool, Unsupported> {
    le(a, b).map(|r| !r)
}

pub fn ge(a: &BaseValue, b: &BaseValue) -> Result<bool, Unsupported> {
    lt(a, b).map(|r| !r)
}

pub fn add(a: &BaseValue, b: &BaseValue) -> Result<BaseValue, Overflow> {
    match (a, b) {
        (BaseValue::Integer(a), BaseValue::Integer(b)) => a
            .checked_add(*b)
            .map(BaseValue::Integer)
            .ok_or_else(|| error_stack::Report::new(Overflow).attach_printable(format!("{a} + {b} overflowed i32"))),
        (BaseValue::Float(a), BaseValue::Float(b)) => numeric::checked_add_f64(*a, *b),
        (BaseValue::Point2D(a), BaseValue::Point2D(b)) => Ok(BaseValue::Point2D(*a + *b)),
        (BaseValue::Point3D(a), BaseValue::Point3D(b)) => Ok(BaseValue::Point3D(*a + *b)),
        _ => Ok(BaseValue::Float(a.as_scalar().unwrap_or_default() + b.as_scalar().unwrap_or_default())),
    }
}

pub fn sub(a: &BaseValue, b: &BaseValue) -> Result<BaseValue, Overflow> {
    match (a, b) {
        (BaseValue::Integer(a), BaseValue::Integer(b)) => a
            .checked_sub(*b)
            .map(BaseValue::Integer)
            .ok_or_else(|| error_stack::Report::new(Overflow).attach_printable(format!("{a} - {b} overflowed i32"))),
        (BaseValue::Float(a), BaseValue::Float(b)) => numeric::checked_sub_f64(*a, *b),
        (BaseValue::Point2D(a), BaseValue::Point2D(b)) => Ok(BaseValue::Point2D(*a - *b)),
        (BaseValue::Point3D(a), BaseValue::Point3D(b)) => Ok(BaseValue::Point3D(*a - *b)),
        _ => Ok(BaseValue::Float(a.as_scalar().unwrap_or_default() - b.as_scalar().unwrap_or_default())),
    }
}

pub fn mul(a: &BaseValue, b: &BaseValue) -> Result<BaseValue, Overflow> {
    match (a, b) {
        (BaseValue::Integer(a), BaseValue::Integer(b)) => a
            .checked_mul(*b)
            .map(BaseValue::Integer)
            .ok_or_else(|| error_stack::Report::new(Overflow).attach_printable(format!("{a} * {b} overflowed i32"))),
        (BaseValue::Float(a), BaseValue::Float(b)) => numeric::checked_mul_f64(*a, *b),
        _ => Ok(BaseValue::Float(a.as_scalar().unwrap_or_default() * b.as_scalar().unwrap_or_default())),
    }
}

pub fn div(a: &BaseValue, b: &BaseValue) -> error_stack::Result<BaseValue, DivisionByZero> {
    match (a, b) {
        (BaseValue::Integer(a), BaseValue::Integer(b)) => {
            if *b == 0 {
                return Err(error_stack::Report::new(DivisionByZero).attach_printable(format!("{a} / 0")));
            }
            Ok(BaseValue::Integer(a / b))
        }
        (BaseValue::Float(a), BaseValue::Float(b)) => numeric::checked_div_f64(*a, *b),
        _ => {
            let (a, b) = (a.as_scalar().unwrap_or_default(), b.as_scalar().unwrap_or_default());
            numeric::checked_div_f64(a, b)
        }
    }
}

/// Euclidean distance between two points of the same dimensionality.
pub fn distance(a: &BaseValue, b: &BaseValue) -> Result<f64, Unsupported> {
    match (a, b) {
        (BaseValue::Point2D(a), BaseValue::Point2D(b)) => Ok(a.distance(*b)),
        (BaseValue::Point3D(a), BaseValue::Point3D(b)) => Ok(a.distance(*b)),
        _ => Err(error_stack::Report::new(Unsupported).attach_printable("distance is only defined between points of matching dimensionality")),
    }
}

/// Linearly interpolates between two base values at fraction `u` in
/// `[0, 1]`. Used by `value_at_timestamp` (component D) on `Linear`
/// segments.
pub fn lerp(a: &BaseValue, b: &BaseValue, u: f64) -> Result<BaseValue, InvalidInput> {
    match (a, b) {
        (BaseValue::Integer(a), BaseValue::Integer(b)) => {
            Ok(BaseValue::Float(f64::from(*a) + u * f64::from(*b - *a)))
        }
        (BaseValue::Float(a), BaseValue::Float(b)) => Ok(BaseValue::Float(a + u * (b - a))),
        (BaseValue::Point2D(a), BaseValue::Point2D(b)) => Ok(BaseValue::Point2D(a.lerp(*b, u))),
        (BaseValue::Point3D(a), BaseValue::Point3D(b)) => Ok(BaseValue::Point3D(a.lerp(*b, u))),
        (BaseValue::GeogPoint(a), BaseValue::GeogPoint(b)) => Ok(BaseValue::GeogPoint(GeogPoint {
            lon: a.lon + u * (b.lon - a.lon),
            lat: a.lat + u * (b.lat - a.lat),
            alt: match (a.alt, b.alt) {
                (Some(a), Some(b)) => Some(a + u * (b - a)),
                _ => None,
            },
        })),
        _ => Err(error_stack::Report::new(InvalidInput).attach_printable("linear interpolation is undefined for this base type")),
    }
}
