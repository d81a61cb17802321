//! Error kinds for the temporal value library.
//!
//! Each kind is a unit struct implementing [`error_stack::Context`]. Callers
//! get an `error_stack::Report<Kind>` with printable attachments describing
//! the offending timestamp or index, rather than a string baked into the
//! error itself.

use core::fmt;

pub type Result<T, C> = error_stack::Result<T, C>;

macro_rules! error_kind {
    ($name:ident, $message:literal) => {
        #[derive(Debug)]
        #[must_use]
        pub struct $name;

        impl fmt::Display for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt.write_str($message)
            }
        }

        impl error_stack::Context for $name {}
    };
}

error_kind!(InvalidInput, "malformed constructor argument or bound-order violation");
error_kind!(InvalidInterpolation, "linear interpolation is undefined for this base type");
error_kind!(OverlapOrAdjacency, "sequence or period set members overlap or are adjacent without normalization");
error_kind!(SridMismatch, "spatial operands use different spatial reference systems");
error_kind!(Overflow, "arithmetic overflowed during lifting");
error_kind!(DivisionByZero, "division by zero during lifting");
error_kind!(Unsupported, "operation is not defined for this combination of inputs");
