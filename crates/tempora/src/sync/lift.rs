use crate::{base::BaseValue, error::Unsupported, time::Timestamp};

/// Lifts a unary scalar function onto a temporal value: applied
/// independently at every sample instant, with no cross-instant context
/// needed.
pub trait Lift1 {
    fn apply(&self, a: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>>;
}

/// A sample of one operand at one instant, as seen by [`Lift2`]'s
/// turning-point and crossing hooks.
pub type Sample<'a> = (Timestamp, &'a BaseValue);

/// Lifts a binary scalar function onto a pair of temporal values.
///
/// Beyond pointwise `apply`, a lift can optionally describe how the
/// *continuous* result behaves strictly between two consecutive
/// synchronized instants:
///
/// - [`turning_point`](Self::turning_point) locates a local extremum the
///   piecewise-linear approximation would otherwise miss (used by
///   `mul`/`div`, whose product/quotient of two linear segments is
///   quadratic/hyperbolic).
/// - [`crossing`](Self::crossing) locates the instant a comparison's
///   truth value flips between two linear segments (used by
///   `lt`/`le`/`gt`/`ge`/`eq`/`ne`).
///
/// Both default to `None`: most lifts (`add`, `and`, ...) need neither.
pub trait Lift2 {
    fn apply(&self, a: &BaseValue, b: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>>;

    #[allow(unused_variables)]
    fn turning_point(&self, a_prev: Sample<'_>, a_cur: Sample<'_>, b_prev: Sample<'_>, b_cur: Sample<'_>) -> Option<Timestamp> {
        None
    }

    #[allow(unused_variables)]
    fn crossing(&self, a_prev: Sample<'_>, a_cur: Sample<'_>, b_prev: Sample<'_>, b_cur: Sample<'_>) -> Option<Timestamp> {
        None
    }

    /// Whether the relation [`crossing`](Self::crossing) locates holds when
    /// its two operands are exactly equal — true for `=`/`≤`/`≥`, false for
    /// `≠`/`<`/`>`. Only consulted when `crossing` actually returns a
    /// timestamp; the default is never read otherwise.
    fn crossing_holds_at_equality(&self) -> bool {
        true
    }
}

/// Lifts a ternary scalar function (e.g. `x` bracketed by a `low`/`high`
/// pair) onto three temporal values, evaluated pointwise at instants all
/// three operands are defined at.
pub trait Lift3 {
    fn apply(&self, a: &BaseValue, b: &BaseValue, c: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>>;
}

/// Lifts a quaternary scalar function onto four temporal values, evaluated
/// pointwise. Used for predicates that need two independent base-type tags
/// on each side (e.g. a spatial relationship between two moving pairs).
pub trait Lift4 {
    fn apply(&self, a: &BaseValue, b: &BaseValue, c: &BaseValue, d: &BaseValue) -> Result<BaseValue, error_stack::Report<Unsupported>>;
}
