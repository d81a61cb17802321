//! Temporal values: types and algebra for data whose attributes change over
//! time.
//!
//! A [`value::Temporal`] pairs a base value type (`base`) with one of four
//! evolution shapes over time (`value`): a single [`Instant`](value::Instant),
//! a set of instants, a continuous [`Sequence`](value::Sequence), or a set of
//! sequences. Scalar functions are lifted onto these shapes by `sync`,
//! consulting period algebra (`time`) and bounding boxes (`bbox`) along the
//! way. `serde_format` renders and parses the MF-JSON, WKB, HexWKB, and WKT
//! wire formats.
//!
//! This crate never installs a [`tracing`] subscriber — instrumentation is
//! plumbing a host application opts into, not policy this crate imposes.

pub mod base;
pub mod bbox;
pub mod error;
pub mod ops;
pub mod serde_format;
pub mod sync;
pub mod time;
pub mod value;

pub use crate::{
    base::{BaseType, BaseValue},
    time::{Period, PeriodSet, TimeSet, Timestamp},
    value::{Interpolation, Temporal},
};
