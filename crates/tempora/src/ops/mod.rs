//! Operator glue — component G from `SPEC_FULL.md`.
//!
//! A small dispatch table from operator category to the capability object
//! (component E) that carries out the lift. Each `BaseValue` pairing is
//! already handled generically inside `tempora::base`'s free functions, so
//! one [`Lift1`]/[`Lift2`] implementation per operator category covers
//! every base type it applies to; callers that need to reject a
//! type-inappropriate operator (e.g. `and` on floats) see that surface as
//! an [`Unsupported`] error from the underlying `base::` call, not as a
//! missing table entry.

use error_stack::ResultExt as _;

use crate::{
    base::{self, linear_root_fraction, product_extremum_fraction, BaseValue},
    error::Unsupported,
    sync::{Lift1, Lift2, Sample},
    time::Timestamp,
};

/// The operator categories `SPEC_FULL.md` §4.G names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Distance,
}

/// Which `sync::lift*` entry point an operator must be driven through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LiftArity {
    Unary,
    Binary,
}

impl Operator {
    #[must_use]
    pub const fn arity(self) -> LiftArity {
        match self {
            Self::Not => LiftArity::Unary,
            _ => LiftArity::Binary,
        }
    }
}

/// Looks up the [`Lift1`] object for a unary operator. `None` for every
/// operator [`Operator::arity`] reports as [`LiftArity::Binary`].
#[must_use]
pub fn lift1_for(op: Operator) -> Option<Box<dyn Lift1>> {
    match op {
        Operator::Not => Some(Box::new(NotOp)),
        _ => None,
    }
}

/// Looks up the [`Lift2`] object for a binary operator. `None` for
/// [`Operator::Not`].
#[must_use]
pub fn lift2_for(op: Operator) -> Option<Box<dyn Lift2>> {
    match op {
        Operator::And => Some(Box::new(AndOp)),
        Operator::Or => Some(Box::new(OrOp)),
        Operator::Eq => Some(Box::new(ComparisonOp { eval: eq_result, raw: Comparison::Eq })),
        Operator::Ne => Some(Box::new(ComparisonOp { eval: ne_result, raw: Comparison::Ne })),
        Operator::Lt => Some(Box::new(ComparisonOp { eval: base::lt, raw: Comparison::Lt })),
        Operator::Le => Some(Box::new(ComparisonOp { eval: base::le, raw: Comparison::Le })),
        Operator::Gt => Some(Box::new(ComparisonOp { eval: base::gt, raw: Comparison::Gt })),
        Operator::Ge => Some(Box::new(ComparisonOp { eval: base::ge, raw: Comparison::Ge })),
        Operator::Add => Some(Box::new(ArithmeticOp { eval: base::add })),
        Operator::Sub => Some(Box::new(ArithmeticOp { eval: base::sub })),
        Operator::Mul => Some(Box::new(MulOp)),
        Operator::Div => Some(Box::new(DivOp)),
        Operator::Distance => Some(Box::new(DistanceOp)),
        Operator::Not => None,
    }
}

struct NotOp;

impl Lift1 for NotOp {
    fn apply(&self, a: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        match a {
            BaseValue::Boolean(b) => Ok(BaseValue::Boolean(!b)),
            _ => Err(error_stack::Report::new(Unsupported).attach_printable("not is only defined over booleans")),
        }
    }
}

struct AndOp;

impl Lift2 for AndOp {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        match (a, b) {
            (BaseValue::Boolean(a), BaseValue::Boolean(b)) => Ok(BaseValue::Boolean(*a && *b)),
            _ => Err(error_stack::Report::new(Unsupported).attach_printable("and is only defined over booleans")),
        }
    }
}

struct OrOp;

impl Lift2 for OrOp {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        match (a, b) {
            (BaseValue::Boolean(a), BaseValue::Boolean(b)) => Ok(BaseValue::Boolean(*a || *b)),
            _ => Err(error_stack::Report::new(Unsupported).attach_printable("or is only defined over booleans")),
        }
    }
}

fn eq_result(a: &BaseValue, b: &BaseValue) -> error_stack::Result<bool, Unsupported> {
    Ok(base::eq(a, b))
}

fn ne_result(a: &BaseValue, b: &BaseValue) -> error_stack::Result<bool, Unsupported> {
    Ok(base::ne(a, b))
}

#[derive(Copy, Clone)]
enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Wraps one of `base`'s ordering predicates, adding [`Lift2::crossing`]:
/// the root of `a(t) - b(t)` between two synchronized Linear numeric
/// samples, per the worked example in `SPEC_FULL.md` §8 scenario 3. Also
/// reports [`Lift2::crossing_holds_at_equality`] from `raw`, since that's
/// exactly what distinguishes a strict comparison from a non-strict one.
struct ComparisonOp {
    eval: fn(&BaseValue, &BaseValue) -> error_stack::Result<bool, Unsupported>,
    raw: Comparison,
}

impl Lift2 for ComparisonOp {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        (self.eval)(a, b).map(BaseValue::Boolean)
    }

    fn crossing(&self, a_prev: Sample<'_>, a_cur: Sample<'_>, b_prev: Sample<'_>, b_cur: Sample<'_>) -> Option<Timestamp> {
        // Eq/Ne flip at the same root as the other four comparisons; only
        // numeric operands have a meaningful "root of the difference".
        let v0 = a_prev.1.as_scalar()? - b_prev.1.as_scalar()?;
        let v1 = a_cur.1.as_scalar()? - b_cur.1.as_scalar()?;
        let fraction = linear_root_fraction(v0, v1)?;
        Some(fraction_to_timestamp(a_prev.0, a_cur.0, fraction))
    }

    fn crossing_holds_at_equality(&self) -> bool {
        !matches!(self.raw, Comparison::Lt | Comparison::Gt | Comparison::Ne)
    }
}

struct ArithmeticOp {
    eval: fn(&BaseValue, &BaseValue) -> error_stack::Result<BaseValue, crate::error::Overflow>,
}

impl Lift2 for ArithmeticOp {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        (self.eval)(a, b).change_context(Unsupported)
    }
}

/// Per Open Question 2 (`SPEC_FULL.md` §9): the product of two linear
/// segments is quadratic, so it can have an interior extremum the
/// piecewise-linear sample grid would otherwise miss.
struct MulOp;

impl Lift2 for MulOp {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        base::mul(a, b).change_context(Unsupported)
    }

    fn turning_point(&self, a_prev: Sample<'_>, a_cur: Sample<'_>, b_prev: Sample<'_>, b_cur: Sample<'_>) -> Option<Timestamp> {
        let fraction = product_extremum_fraction(a_prev.1.as_scalar()?, a_cur.1.as_scalar()?, b_prev.1.as_scalar()?, b_cur.1.as_scalar()?)?;
        Some(fraction_to_timestamp(a_prev.0, a_cur.0, fraction))
    }
}

/// The quotient of two linear segments has no interior extremum reachable
/// by the product's closed form: its derivative-zero condition doesn't
/// depend on the interpolation fraction at all, so `turning_point` is left
/// `None` here; see DESIGN.md.
struct DivOp;

impl Lift2 for DivOp {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        base::div(a, b).change_context(Unsupported)
    }
}

struct DistanceOp;

impl Lift2 for DistanceOp {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>> {
        base::distance(a, b).map(BaseValue::Float)
    }
}

fn fraction_to_timestamp(t0: Timestamp, t1: Timestamp, fraction: f64) -> Timestamp {
    let span = (t1.as_micros() - t0.as_micros()) as f64;
    Timestamp::from_micros(t0.as_micros() + (span * fraction).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_flips_booleans() {
        let op = lift1_for(Operator::Not).unwrap();
        assert_eq!(op.apply(&BaseValue::Boolean(true)).unwrap(), BaseValue::Boolean(false));
    }

    #[test]
    fn and_rejects_non_boolean_operands() {
        let op = lift2_for(Operator::And).unwrap();
        assert!(op.apply(&BaseValue::Integer(1), &BaseValue::Integer(2)).is_err());
    }

    #[test]
    fn lt_crossing_matches_the_root_of_the_difference() {
        let op = lift2_for(Operator::Lt).unwrap();
        let a_prev = (Timestamp::from_micros(0), &BaseValue::Float(-1.0));
        let a_cur = (Timestamp::from_micros(10), &BaseValue::Float(3.0));
        let b_prev = (Timestamp::from_micros(0), &BaseValue::Float(0.0));
        let b_cur = (Timestamp::from_micros(10), &BaseValue::Float(0.0));
        let t = op.crossing(a_prev, a_cur, b_prev, b_cur).unwrap();
        assert_eq!(t, Timestamp::from_micros(3));
    }

    #[test]
    fn mul_turning_point_matches_the_scenario_in_the_docs() {
        let op = lift2_for(Operator::Mul).unwrap();
        let a_prev = (Timestamp::from_micros(0), &BaseValue::Float(-1.0));
        let a_cur = (Timestamp::from_micros(10), &BaseValue::Float(1.0));
        let b_prev = (Timestamp::from_micros(0), &BaseValue::Float(1.0));
        let b_cur = (Timestamp::from_micros(10), &BaseValue::Float(-1.0));
        let t = op.turning_point(a_prev, a_cur, b_prev, b_cur).unwrap();
        assert_eq!(t, Timestamp::from_micros(5));
    }

    #[test]
    fn div_has_no_turning_point_hook() {
        let op = lift2_for(Operator::Div).unwrap();
        let sample = (Timestamp::from_micros(0), &BaseValue::Float(1.0));
        assert!(op.turning_point(sample, sample, sample, sample).is_none());
    }

    #[test]
    fn strict_comparisons_do_not_hold_at_equality() {
        for operator in [Operator::Lt, Operator::Gt, Operator::Ne] {
            let op = lift2_for(operator).unwrap();
            assert!(!op.crossing_holds_at_equality(), "{operator:?} should not hold at equality");
        }
    }

    #[test]
    fn non_strict_comparisons_hold_at_equality() {
        for operator in [Operator::Le, Operator::Ge, Operator::Eq] {
            let op = lift2_for(operator).unwrap();
            assert!(op.crossing_holds_at_equality(), "{operator:?} should hold at equality");
        }
    }

    #[test]
    fn le_crossing_matches_the_same_root_as_lt() {
        let op = lift2_for(Operator::Le).unwrap();
        let a_prev = (Timestamp::from_micros(0), &BaseValue::Float(-2.0));
        let a_cur = (Timestamp::from_micros(10), &BaseValue::Float(2.0));
        let b_prev = (Timestamp::from_micros(0), &BaseValue::Float(0.0));
        let b_cur = (Timestamp::from_micros(10), &BaseValue::Float(0.0));
        let t = op.crossing(a_prev, a_cur, b_prev, b_cur).unwrap();
        assert_eq!(t, Timestamp::from_micros(5));
    }
}
