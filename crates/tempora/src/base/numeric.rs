//! Checked floating-point arithmetic and the root-finding helpers that back
//! turning-point and crossing detection in synchronization (component E).

use crate::{base::BaseValue, error::{DivisionByZero, Overflow, Result}};

pub fn checked_add_f64(a: f64, b: f64) -> Result<BaseValue, Overflow> {
    finite(a + b, "addition")
}

pub fn checked_sub_f64(a: f64, b: f64) -> Result<BaseValue, Overflow> {
    finite(a - b, "subtraction")
}

pub fn checked_mul_f64(a: f64, b: f64) -> Result<BaseValue, Overflow> {
    finite(a * b, "multiplication")
}

pub fn checked_div_f64(a: f64, b: f64) -> error_stack::Result<BaseValue, DivisionByZero> {
    if b == 0.0 {
        return Err(error_stack::Report::new(DivisionByZero).attach_printable(format!("{a} / {b}")));
    }
    Ok(BaseValue::Float(a / b))
}

fn finite(result: f64, op: &'static str) -> Result<BaseValue, Overflow> {
    if result.is_finite() {
        Ok(BaseValue::Float(result))
    } else {
        Err(error_stack::Report::new(Overflow).attach_printable(format!("{op} produced a non-finite result")))
    }
}

/// Finds the fraction `u` in the open interval `(0, 1)` at which a linear
/// function sampled at `v0` (u = 0) and `v1` (u = 1) crosses zero.
///
/// Used by crossing detection (`SPEC_FULL.md` §4.E, Phase 4) to locate the
/// instant at which `a(t) - b(t)` changes sign between two consecutive
/// synchronized instants. Returns `None` when there is no interior root:
/// the segment doesn't cross zero, touches zero only at an endpoint, or is
/// identically zero.
#[must_use]
pub fn linear_root_fraction(v0: f64, v1: f64) -> Option<f64> {
    if v0 == v1 {
        return None;
    }
    let u = v0 / (v0 - v1);
    (u > 0.0 && u < 1.0).then_some(u)
}

/// Finds the fraction `u` in the open interval `(0, 1)` at which the
/// product of two linear segments `a(u) = a0 + (a1 - a0) u` and
/// `b(u) = b0 + (b1 - b0) u` has a turning point (its derivative is zero).
///
/// `product(u)` is quadratic in `u` whenever both segments are non-constant;
/// its derivative is zero at `u = -(da b0 + db a0) / (2 da db)`, where
/// `da = a1 - a0` and `db = b1 - b0`. Returns `None` when either segment is
/// constant (the product is then linear, with no interior extremum) or the
/// computed fraction falls outside `(0, 1)`.
#[must_use]
pub fn product_extremum_fraction(a0: f64, a1: f64, b0: f64, b1: f64) -> Option<f64> {
    let da = a1 - a0;
    let db = b1 - b0;
    if da == 0.0 || db == 0.0 {
        return None;
    }
    let u = -(da * b0 + db * a0) / (2.0 * da * db);
    (u > 0.0 && u < 1.0).then_some(u)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn linear_root_finds_interior_crossing() {
        assert_eq!(linear_root_fraction(-1.0, 1.0), Some(0.5));
    }

    #[test]
    fn linear_root_ignores_non_crossing_segments() {
        assert_eq!(linear_root_fraction(1.0, 2.0), None);
        assert_eq!(linear_root_fraction(0.0, 0.0), None);
    }

    #[test]
    fn product_extremum_matches_symmetric_parabola() {
        // a(u) = -1 + 2u, b(u) = 1 (constant) -> no interior extremum.
        assert_eq!(product_extremum_fraction(-1.0, 1.0, 1.0, 1.0), None);
        // a(u) = -1 + 2u, b(u) = -1 + 2u -> product = (2u - 1)^2, extremum at u = 0.5.
        assert_eq!(product_extremum_fraction(-1.0, 1.0, -1.0, 1.0), Some(0.5));
    }

    proptest! {
        #[test]
        fn linear_root_fraction_is_always_interior_or_absent(v0 in -1e6..1e6, v1 in -1e6..1e6) {
            if let Some(u) = linear_root_fraction(v0, v1) {
                prop_assert!(u > 0.0 && u < 1.0);
                let crossing = v0 + u * (v1 - v0);
                prop_assert!(crossing.abs() < 1e-6 * (v0.abs() + v1.abs() + 1.0));
            }
        }

        #[test]
        fn product_extremum_fraction_is_always_interior_or_absent(
            a0 in -1e3..1e3, a1 in -1e3..1e3, b0 in -1e3..1e3, b1 in -1e3..1e3,
        ) {
            if let Some(u) = product_extremum_fraction(a0, a1, b0, b1) {
                prop_assert!(u > 0.0 && u < 1.0);
            }
        }
    }
}
