//! WKT — component F from `SPEC_FULL.md`.
//!
//! A round-trip textual format: `Display` prints one line per base type's
//! point/value syntax, `FromStr` parses it back. Unlike MF-JSON (writer
//! only) and WKB (reader + writer, binary), this is the plain-text
//! counterpart meant for humans and `psql`-style tools.

use core::{fmt, str::FromStr};

use crate::{
    base::{BaseType, BaseValue, GeogPoint, Point2D, Point3D},
    error::{InvalidInput, Result},
    time::Timestamp,
    value::{Instant, InstantSet, Interpolation, SequenceBuilder, SequenceSetBuilder, Temporal},
};

fn write_value(f: &mut fmt::Formatter<'_>, value: &BaseValue) -> fmt::Result {
    match value {
        BaseValue::Boolean(b) => write!(f, "{b}"),
        BaseValue::Integer(i) => write!(f, "{i}"),
        BaseValue::Float(v) => write!(f, "{v}"),
        BaseValue::Text(s) => write!(f, "{s:?}"),
        BaseValue::Point2D(p) => write!(f, "POINT({} {})", p.x, p.y),
        BaseValue::Point3D(p) => write!(f, "POINT Z({} {} {})", p.x, p.y, p.z),
        BaseValue::GeogPoint(g) => match g.alt {
            Some(alt) => write!(f, "POINT Z({} {} {})", g.lon, g.lat, alt),
            None => write!(f, "POINT({} {})", g.lon, g.lat),
        },
    }
}

fn write_instant(f: &mut fmt::Formatter<'_>, i: &Instant) -> fmt::Result {
    write_value(f, i.value())?;
    write!(f, "@{}", i.timestamp())
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(i) => write_instant(f, i),
            Self::InstantSet(s) => {
                write!(f, "{{")?;
                for (idx, i) in s.instants().iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write_instant(f, i)?;
                }
                write!(f, "}}")
            }
            Self::Sequence(s) => {
                write!(f, "{}", if s.lower_inc() { "[" } else { "(" })?;
                for (idx, i) in s.instants().iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write_instant(f, i)?;
                }
                write!(f, "{}", if s.upper_inc() { "]" } else { ")" })
            }
            Self::SequenceSet(s) => {
                write!(f, "{{")?;
                for (idx, seq) in s.sequences().iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", Self::Sequence(seq.clone()))?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn parse_value(base_type: BaseType, text: &str) -> Result<BaseValue, InvalidInput> {
    let bad = || error_stack::Report::new(InvalidInput).attach_printable(format!("could not parse {text:?} as {base_type:?}"));
    Ok(match base_type {
        BaseType::Boolean => BaseValue::Boolean(text.parse().map_err(|_| bad())?),
        BaseType::Integer => BaseValue::Integer(text.parse().map_err(|_| bad())?),
        BaseType::Float => BaseValue::Float(text.parse().map_err(|_| bad())?),
        BaseType::Text => BaseValue::Text(text.trim_matches('"').to_owned()),
        BaseType::Point2D => {
            let (x, y) = parse_point_coords(text).ok_or_else(bad)?;
            BaseValue::Point2D(Point2D::new(x, y, 0))
        }
        BaseType::Point3D => {
            let (x, y, z) = parse_point3d_coords(text).ok_or_else(bad)?;
            BaseValue::Point3D(Point3D::new(x, y, z, 0))
        }
        BaseType::GeogPoint => match parse_point3d_coords(text) {
            Some((lon, lat, alt)) => BaseValue::GeogPoint(GeogPoint { lon, lat, alt: Some(alt) }),
            None => {
                let (lon, lat) = parse_point_coords(text).ok_or_else(bad)?;
                BaseValue::GeogPoint(GeogPoint { lon, lat, alt: None })
            }
        },
    })
}

fn parse_point_coords(text: &str) -> Option<(f64, f64)> {
    let inner = text.strip_prefix("POINT(")?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    Some((parts.next()?.parse().ok()?, parts.next()?.parse().ok()?))
}

fn parse_point3d_coords(text: &str) -> Option<(f64, f64, f64)> {
    let inner = text.strip_prefix("POINT Z(")?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    Some((parts.next()?.parse().ok()?, parts.next()?.parse().ok()?, parts.next()?.parse().ok()?))
}

fn parse_instant(text: &str) -> Result<Instant, InvalidInput> {
    let (value_text, ts_text) = text
        .rsplit_once('@')
        .ok_or_else(|| error_stack::Report::new(InvalidInput).attach_printable(format!("instant {text:?} is missing '@timestamp'")))?;
    let base_type = sniff_base_type(value_text)?;
    let value = parse_value(base_type, value_text)?;
    let timestamp = Timestamp::parse(ts_text)?;
    Ok(Instant::new(timestamp, value))
}

fn sniff_base_type(text: &str) -> Result<BaseType, InvalidInput> {
    if text.starts_with("POINT Z(") {
        return Ok(BaseType::Point3D);
    }
    if text.starts_with("POINT(") {
        return Ok(BaseType::Point2D);
    }
    if text == "true" || text == "false" {
        return Ok(BaseType::Boolean);
    }
    if text.starts_with('"') {
        return Ok(BaseType::Text);
    }
    if text.contains('.') {
        return Ok(BaseType::Float);
    }
    Ok(BaseType::Integer)
}

impl FromStr for Temporal {
    type Err = error_stack::Report<InvalidInput>;

    fn from_str(text: &str) -> Result<Self, InvalidInput> {
        let text = text.trim();
        if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
            let members: Vec<&str> = split_top_level(inner);
            if members.iter().all(|m| {
                let m = m.trim_start();
                m.contains('@') && !m.starts_with('[') && !m.starts_with('(')
            }) {
                let instants = members.iter().map(|m| parse_instant(m.trim())).collect::<Result<Vec<_>, _>>()?;
                return InstantSet::new(instants).map(Self::InstantSet);
            }
            let sequences = members
                .iter()
                .map(|m| match m.trim().parse::<Self>()? {
                    Self::Sequence(s) => Ok(s),
                    _ => Err(error_stack::Report::new(InvalidInput).attach_printable("a sequence set may only contain sequences")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let mut builder = SequenceSetBuilder::new();
            for s in sequences {
                builder = builder.sequence(s);
            }
            return builder.build().map(Self::SequenceSet);
        }

        let lower_inc = text.starts_with('[');
        let upper_inc = text.ends_with(']');
        if !(text.starts_with('[') || text.starts_with('(')) {
            return Ok(Self::Instant(parse_instant(text)?));
        }
        let inner = &text[1..text.len() - 1];
        let members = split_top_level(inner);
        let instants = members.iter().map(|m| parse_instant(m.trim())).collect::<Result<Vec<_>, _>>()?;
        let base_type = instants[0].value().base_type();
        let interpolation = if instants.len() == 1 { Interpolation::Discrete } else if base_type.supports_linear() { Interpolation::Linear } else { Interpolation::Stepwise };
        let mut builder = SequenceBuilder::new(interpolation).lower_inc(lower_inc).upper_inc(upper_inc);
        for i in instants {
            builder = builder.instant(i.timestamp(), i.value);
        }
        builder.build().map(Self::Sequence)
    }
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                out.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}
