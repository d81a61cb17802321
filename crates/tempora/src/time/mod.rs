//! Time-domain primitives: timestamps, periods, and their sets.
//!
//! This module is the substrate component B from `SPEC_FULL.md` — the rest
//! of the crate (bounding boxes, temporal value variants, synchronization)
//! is built on top of [`Period`]/[`PeriodSet`].

mod period;
mod periodset;
mod timeset;
mod timestamp;

pub use self::{
    period::{Period, PeriodBound},
    periodset::{periodarr_find_timestamp, periodarr_normalize, PeriodSet},
    timeset::TimeSet,
    timestamp::Timestamp,
};
