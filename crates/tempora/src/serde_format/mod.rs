//! Serialization — component F from `SPEC_FULL.md`.
//!
//! Four formats, three of them implemented here (`wkt` is plain
//! `Display`/`FromStr` on [`crate::Temporal`] itself, see `wkt.rs`):
//!
//! - MF-JSON: writer only ([`mfjson::to_mfjson`]).
//! - WKB / HexWKB: reader and writer ([`wkb`]).
//! - WKT: reader and writer, textual.

pub mod mfjson;
pub mod wkb;
mod wkt;

pub use self::{
    mfjson::{mfjson_size_upper_bound, to_mfjson},
    wkb::{from_hexwkb, from_wkb, to_hexwkb, to_wkb, Endianness},
};
