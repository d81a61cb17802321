//! WKB / HexWKB — component F from `SPEC_FULL.md`.
//!
//! A hand-rolled little/big-endian binary codec: one endianness byte, a
//! 2-byte base-type tag, a flag byte packing `Z`/`Geodetic`/`SRID-present`
//! plus the 2-bit interpolation and subtype fields, an optional 4-byte
//! SRID, then per-variant count fields and repeated `(value, timestamp)`
//! records. HexWKB is the same bytes, each doubled into two hex digits.

use crate::{
    base::{BaseType, BaseValue, GeogPoint, Point2D, Point3D},
    error::{InvalidInput, Result},
    time::Timestamp,
    value::{Instant, InstantSet, Interpolation, Sequence, SequenceBuilder, SequenceSetBuilder, Temporal},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

struct Writer {
    endianness: Endianness,
    bytes: Vec<u8>,
}

impl Writer {
    fn new(endianness: Endianness) -> Self {
        Self { endianness, bytes: Vec::new() }
    }

    fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.bytes.extend(match self.endianness {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    fn write_u32(&mut self, v: u32) {
        self.bytes.extend(match self.endianness {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    fn write_i32(&mut self, v: i32) {
        self.bytes.extend(match self.endianness {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    fn write_i64(&mut self, v: i64) {
        self.bytes.extend(match self.endianness {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    fn write_f64(&mut self, v: f64) {
        self.bytes.extend(match self.endianness {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    fn write_timestamp(&mut self, t: Timestamp) {
        self.write_i64(t.as_micros());
    }

    fn write_base_value(&mut self, value: &BaseValue) {
        match value {
            BaseValue::Boolean(b) => self.write_u8(u8::from(*b)),
            BaseValue::Integer(i) => self.write_i32(*i),
            BaseValue::Float(f) => self.write_f64(*f),
            BaseValue::Text(s) => {
                self.write_u32(s.len() as u32);
                self.bytes.extend(s.as_bytes());
            }
            BaseValue::Point2D(p) => {
                self.write_f64(p.x);
                self.write_f64(p.y);
            }
            BaseValue::Point3D(p) => {
                self.write_f64(p.x);
                self.write_f64(p.y);
                self.write_f64(p.z);
            }
            BaseValue::GeogPoint(g) => {
                self.write_f64(g.lon);
                self.write_f64(g.lat);
                if let Some(alt) = g.alt {
                    self.write_f64(alt);
                }
            }
        }
    }
}

struct Reader<'a> {
    endianness: Endianness,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(endianness: Endianness, bytes: &'a [u8]) -> Self {
        Self { endianness, bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], InvalidInput> {
        let end = self.pos.checked_add(n).ok_or_else(|| error_stack::Report::new(InvalidInput).attach_printable("wkb length overflow"))?;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| {
            error_stack::Report::new(InvalidInput).attach_printable(format!("wkb buffer too short at byte {}", self.pos))
        })?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, InvalidInput> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, InvalidInput> {
        let b: [u8; 2] = self.take(2)?.try_into().expect("exactly 2 bytes");
        Ok(match self.endianness {
            Endianness::Little => u16::from_le_bytes(b),
            Endianness::Big => u16::from_be_bytes(b),
        })
    }

    fn read_u32(&mut self) -> Result<u32, InvalidInput> {
        let b: [u8; 4] = self.take(4)?.try_into().expect("exactly 4 bytes");
        Ok(match self.endianness {
            Endianness::Little => u32::from_le_bytes(b),
            Endianness::Big => u32::from_be_bytes(b),
        })
    }

    fn read_i32(&mut self) -> Result<i32, InvalidInput> {
        let b: [u8; 4] = self.take(4)?.try_into().expect("exactly 4 bytes");
        Ok(match self.endianness {
            Endianness::Little => i32::from_le_bytes(b),
            Endianness::Big => i32::from_be_bytes(b),
        })
    }

    fn read_i64(&mut self) -> Result<i64, InvalidInput> {
        let b: [u8; 8] = self.take(8)?.try_into().expect("exactly 8 bytes");
        Ok(match self.endianness {
            Endianness::Little => i64::from_le_bytes(b),
            Endianness::Big => i64::from_be_bytes(b),
        })
    }

    fn read_f64(&mut self) -> Result<f64, InvalidInput> {
        let b: [u8; 8] = self.take(8)?.try_into().expect("exactly 8 bytes");
        Ok(match self.endianness {
            Endianness::Little => f64::from_le_bytes(b),
            Endianness::Big => f64::from_be_bytes(b),
        })
    }

    fn read_timestamp(&mut self) -> Result<Timestamp, InvalidInput> {
        Ok(Timestamp::from_micros(self.read_i64()?))
    }

    fn read_base_value(&mut self, base_type: BaseType, z: bool, srid: i32) -> Result<BaseValue, InvalidInput> {
        Ok(match base_type {
            BaseType::Boolean => BaseValue::Boolean(self.read_u8()? != 0),
            BaseType::Integer => BaseValue::Integer(self.read_i32()?),
            BaseType::Float => BaseValue::Float(self.read_f64()?),
            BaseType::Text => {
                let len = self.read_u32()? as usize;
                let bytes = self.take(len)?;
                BaseValue::Text(
                    core::str::from_utf8(bytes)
                        .map_err(|_error| error_stack::Report::new(InvalidInput).attach_printable("wkb text field is not valid utf-8"))?
                        .to_owned(),
                )
            }
            BaseType::Point2D => BaseValue::Point2D(Point2D::new(self.read_f64()?, self.read_f64()?, srid)),
            BaseType::Point3D => BaseValue::Point3D(Point3D::new(self.read_f64()?, self.read_f64()?, self.read_f64()?, srid)),
            BaseType::GeogPoint => {
                let lon = self.read_f64()?;
                let lat = self.read_f64()?;
                let alt = if z { Some(self.read_f64()?) } else { None };
                BaseValue::GeogPoint(GeogPoint { lon, lat, alt })
            }
        })
    }
}

const TYPE_BOOLEAN: u16 = 1;
const TYPE_INTEGER: u16 = 2;
const TYPE_FLOAT: u16 = 3;
const TYPE_TEXT: u16 = 4;
const TYPE_POINT2D: u16 = 5;
const TYPE_POINT3D: u16 = 6;
const TYPE_GEOGPOINT: u16 = 7;

fn type_tag(base_type: BaseType) -> u16 {
    match base_type {
        BaseType::Boolean => TYPE_BOOLEAN,
        BaseType::Integer => TYPE_INTEGER,
        BaseType::Float => TYPE_FLOAT,
        BaseType::Text => TYPE_TEXT,
        BaseType::Point2D => TYPE_POINT2D,
        BaseType::Point3D => TYPE_POINT3D,
        BaseType::GeogPoint => TYPE_GEOGPOINT,
    }
}

fn base_type_from_tag(tag: u16) -> Result<BaseType, InvalidInput> {
    Ok(match tag {
        TYPE_BOOLEAN => BaseType::Boolean,
        TYPE_INTEGER => BaseType::Integer,
        TYPE_FLOAT => BaseType::Float,
        TYPE_TEXT => BaseType::Text,
        TYPE_POINT2D => BaseType::Point2D,
        TYPE_POINT3D => BaseType::Point3D,
        TYPE_GEOGPOINT => BaseType::GeogPoint,
        other => return Err(error_stack::Report::new(InvalidInput).attach_printable(format!("unknown wkb type tag {other}"))),
    })
}

const SUBTYPE_INSTANT: u8 = 1;
const SUBTYPE_INSTANT_SET: u8 = 2;
const SUBTYPE_SEQUENCE: u8 = 3;
const SUBTYPE_SEQUENCE_SET: u8 = 4;

const FLAG_Z: u8 = 0x01;
const FLAG_GEODETIC: u8 = 0x02;
const FLAG_SRID: u8 = 0x04;

fn interpolation_bits(interpolation: Interpolation) -> u8 {
    match interpolation {
        Interpolation::Discrete => 0,
        Interpolation::Stepwise => 1,
        Interpolation::Linear => 2,
    }
}

fn interpolation_from_bits(bits: u8) -> Result<Interpolation, InvalidInput> {
    Ok(match bits {
        0 => Interpolation::Discrete,
        1 => Interpolation::Stepwise,
        2 => Interpolation::Linear,
        other => return Err(error_stack::Report::new(InvalidInput).attach_printable(format!("unknown wkb interpolation bits {other}"))),
    })
}

fn first_value(value: &Temporal) -> &BaseValue {
    match value {
        Temporal::Instant(i) => i.value(),
        Temporal::InstantSet(s) => s.instants()[0].value(),
        Temporal::Sequence(s) => s.instants()[0].value(),
        Temporal::SequenceSet(s) => s.sequences()[0].instants()[0].value(),
    }
}

fn srid_of(value: &Temporal) -> Option<i32> {
    match first_value(value) {
        BaseValue::Point2D(p) => Some(p.srid),
        BaseValue::Point3D(p) => Some(p.srid),
        _ => None,
    }
}

/// Serializes a temporal value to WKB bytes.
#[must_use]
pub fn to_wkb(value: &Temporal, endianness: Endianness) -> Vec<u8> {
    let base_type = value.base_type();
    let interpolation = value.interpolation();
    let srid = srid_of(value);

    let subtype = match value {
        Temporal::Instant(_) => SUBTYPE_INSTANT,
        Temporal::InstantSet(_) => SUBTYPE_INSTANT_SET,
        Temporal::Sequence(_) => SUBTYPE_SEQUENCE,
        Temporal::SequenceSet(_) => SUBTYPE_SEQUENCE_SET,
    };

    let mut w = Writer::new(endianness);
    w.write_u8(match endianness {
        Endianness::Little => 1,
        Endianness::Big => 0,
    });
    w.write_u16(type_tag(base_type));

    let mut flags = interpolation_bits(interpolation) << 3 | (subtype - 1) << 5;
    if matches!(base_type, BaseType::Point3D) {
        flags |= FLAG_Z;
    }
    if matches!(base_type, BaseType::GeogPoint) {
        flags |= FLAG_GEODETIC;
    }
    if srid.is_some() {
        flags |= FLAG_SRID;
    }
    w.write_u8(flags);
    if let Some(srid) = srid {
        w.write_i32(srid);
    }

    match value {
        Temporal::Instant(i) => {
            w.write_base_value(i.value());
            w.write_timestamp(i.timestamp());
        }
        Temporal::InstantSet(s) => {
            w.write_u32(s.instants().len() as u32);
            for i in s.instants() {
                w.write_base_value(i.value());
                w.write_timestamp(i.timestamp());
            }
        }
        Temporal::Sequence(s) => write_sequence_body(&mut w, s),
        Temporal::SequenceSet(s) => {
            w.write_u32(s.sequences().len() as u32);
            for seq in s.sequences() {
                write_sequence_body(&mut w, seq);
            }
        }
    }
    w.bytes
}

fn write_sequence_body(w: &mut Writer, s: &Sequence) {
    w.write_u32(s.instants().len() as u32);
    w.write_u8(u8::from(s.lower_inc()) | (u8::from(s.upper_inc()) << 1));
    for i in s.instants() {
        w.write_base_value(i.value());
        w.write_timestamp(i.timestamp());
    }
}

/// Parses a temporal value back out of WKB bytes.
pub fn from_wkb(bytes: &[u8]) -> Result<Temporal, InvalidInput> {
    if bytes.is_empty() {
        return Err(error_stack::Report::new(InvalidInput).attach_printable("wkb buffer is empty"));
    }
    let endianness = match bytes[0] {
        1 => Endianness::Little,
        0 => Endianness::Big,
        other => return Err(error_stack::Report::new(InvalidInput).attach_printable(format!("unknown wkb endianness byte {other}"))),
    };
    let mut r = Reader::new(endianness, bytes);
    r.pos = 1;

    let base_type = base_type_from_tag(r.read_u16()?)?;
    let flags = r.read_u8()?;
    let z = flags & FLAG_Z != 0;
    let interpolation = interpolation_from_bits((flags >> 3) & 0b11)?;
    let subtype = ((flags >> 5) & 0b11) + 1;
    let srid = if flags & FLAG_SRID != 0 { r.read_i32()? } else { 0 };

    match subtype {
        SUBTYPE_INSTANT => {
            let value = r.read_base_value(base_type, z, srid)?;
            let timestamp = r.read_timestamp()?;
            Ok(Temporal::Instant(Instant::new(timestamp, value)))
        }
        SUBTYPE_INSTANT_SET => {
            let count = r.read_u32()?;
            let mut instants = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let value = r.read_base_value(base_type, z, srid)?;
                let timestamp = r.read_timestamp()?;
                instants.push(Instant::new(timestamp, value));
            }
            InstantSet::new(instants).map(Temporal::InstantSet)
        }
        SUBTYPE_SEQUENCE => read_sequence_body(&mut r, base_type, z, srid, interpolation).map(Temporal::Sequence),
        SUBTYPE_SEQUENCE_SET => {
            let count = r.read_u32()?;
            let mut builder = SequenceSetBuilder::new();
            for _ in 0..count {
                builder = builder.sequence(read_sequence_body(&mut r, base_type, z, srid, interpolation)?);
            }
            builder.build().map(Temporal::SequenceSet)
        }
        other => Err(error_stack::Report::new(InvalidInput).attach_printable(format!("unknown wkb subtype {other}"))),
    }
}

fn read_sequence_body(r: &mut Reader<'_>, base_type: BaseType, z: bool, srid: i32, interpolation: Interpolation) -> Result<Sequence, InvalidInput> {
    let count = r.read_u32()?;
    let bound_byte = r.read_u8()?;
    let lower_inc = bound_byte & 0x01 != 0;
    let upper_inc = bound_byte & 0x02 != 0;
    let mut builder = SequenceBuilder::new(interpolation).lower_inc(lower_inc).upper_inc(upper_inc);
    for _ in 0..count {
        let value = r.read_base_value(base_type, z, srid)?;
        let timestamp = r.read_timestamp()?;
        builder = builder.instant(timestamp, value);
    }
    builder.build()
}

/// Renders WKB bytes as an uppercase hex string, one nibble pair per byte.
#[must_use]
pub fn to_hexwkb(value: &Temporal, endianness: Endianness) -> String {
    let bytes = to_wkb(value, endianness);
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push_str(&format!("{byte:02X}"));
    }
    hex
}

/// Parses a HexWKB string back into a temporal value.
pub fn from_hexwkb(hex: &str) -> Result<Temporal, InvalidInput> {
    if hex.len() % 2 != 0 {
        return Err(error_stack::Report::new(InvalidInput).attach_printable("hexwkb string has an odd number of digits"));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        let pair = core::str::from_utf8(chunk).expect("ascii hex digits are valid utf-8");
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|_error| error_stack::Report::new(InvalidInput).attach_printable(format!("invalid hex byte {pair:?}")))?;
        bytes.push(byte);
    }
    from_wkb(&bytes)
}
