use core::{fmt, str::FromStr};

use error_stack::ResultExt as _;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::error::{InvalidInput, Result};

/// A single point in time: a signed count of microseconds since the Unix
/// epoch.
///
/// Storage stays a flat `i64` rather than a wrapped `OffsetDateTime` so that
/// the WKB encoding (an 8-byte little/big-endian integer, see
/// `serde_format::wkb`) is a direct byte reinterpretation. ISO-8601
/// parsing/printing goes through the `time` crate, matching the host
/// database's text representation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const UNIX_EPOCH: Self = Self(0);

    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    #[must_use]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn now() -> Self {
        Self::from_offset_date_time(OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn from_offset_date_time(time: OffsetDateTime) -> Self {
        Self((time.unix_timestamp_nanos() / 1_000) as i64)
    }

    #[must_use]
    pub fn to_offset_date_time(self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1_000)
            .expect("microsecond timestamps always fit in the OffsetDateTime range")
    }

    /// Parses an ISO-8601 timestamp with a `T` separator and explicit offset.
    pub fn parse(text: &str) -> Result<Self, InvalidInput> {
        let time = OffsetDateTime::parse(text, &Iso8601::PARSING)
            .change_context(InvalidInput)
            .attach_printable_lazy(|| format!("could not parse timestamp {text:?}"))?;
        Ok(Self::from_offset_date_time(time))
    }
}

impl FromStr for Timestamp {
    type Err = error_stack::Report<InvalidInput>;

    fn from_str(s: &str) -> Result<Self, InvalidInput> {
        Self::parse(s)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, fmt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .to_offset_date_time()
            .format(&Iso8601::DEFAULT)
            .map_err(|_error| fmt::Error)?;
        fmt.write_str(&formatted)
    }
}
