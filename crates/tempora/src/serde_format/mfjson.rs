//! MF-JSON — component F from `SPEC_FULL.md`.
//!
//! Writer only. Built with `serde_json::Value` construction rather than
//! `#[derive(Serialize)]`, because the key set (`values` vs `coordinates`,
//! presence of `lower_inc`/`upper_inc`/`sequences`) depends on the runtime
//! variant and base type, not on a fixed Rust shape.

use serde_json::{json, Map, Value};

use crate::{
    base::BaseValue,
    value::{Instant, Interpolation, Sequence, Temporal},
};

fn type_name(value: &Temporal) -> &'static str {
    match value.base_type() {
        crate::base::BaseType::Boolean => "MovingBoolean",
        crate::base::BaseType::Integer => "MovingInteger",
        crate::base::BaseType::Float => "MovingFloat",
        crate::base::BaseType::Text => "MovingText",
        crate::base::BaseType::Point2D | crate::base::BaseType::Point3D => "MovingGeomPoint",
        crate::base::BaseType::GeogPoint => "MovingGeogPoint",
    }
}

fn interpolation_name(interpolation: Interpolation) -> &'static str {
    match interpolation {
        Interpolation::Discrete => "Discrete",
        Interpolation::Stepwise => "Stepwise",
        Interpolation::Linear => "Linear",
    }
}

fn round(v: f64, precision: u8) -> f64 {
    let precision = precision.min(15);
    let factor = 10f64.powi(i32::from(precision));
    (v * factor).round() / factor
}

fn value_or_coordinate(value: &BaseValue, precision: u8) -> Value {
    match value {
        BaseValue::Boolean(b) => json!(b),
        BaseValue::Integer(i) => json!(i),
        BaseValue::Float(f) => json!(round(*f, precision)),
        BaseValue::Text(s) => json!(s),
        BaseValue::Point2D(p) => json!([round(p.x, precision), round(p.y, precision)]),
        BaseValue::Point3D(p) => json!([round(p.x, precision), round(p.y, precision), round(p.z, precision)]),
        BaseValue::GeogPoint(g) => match g.alt {
            Some(alt) => json!([round(g.lon, precision), round(g.lat, precision), round(alt, precision)]),
            None => json!([round(g.lon, precision), round(g.lat, precision)]),
        },
    }
}

fn is_coordinate_shaped(value: &BaseValue) -> bool {
    matches!(value, BaseValue::Point2D(_) | BaseValue::Point3D(_) | BaseValue::GeogPoint(_))
}

fn samples_key(first: &BaseValue) -> &'static str {
    if is_coordinate_shaped(first) {
        "coordinates"
    } else {
        "values"
    }
}

fn instant_samples(map: &mut Map<String, Value>, instants: &[Instant], precision: u8) {
    let key = samples_key(instants[0].value());
    map.insert(key.to_owned(), Value::Array(instants.iter().map(|i| value_or_coordinate(i.value(), precision)).collect()));
    map.insert("datetimes".to_owned(), Value::Array(instants.iter().map(|i| json!(i.timestamp().to_string())).collect()));
}

fn sequence_object(s: &Sequence, precision: u8) -> Value {
    let mut map = Map::new();
    instant_samples(&mut map, s.instants(), precision);
    map.insert("lower_inc".to_owned(), json!(s.lower_inc()));
    map.insert("upper_inc".to_owned(), json!(s.upper_inc()));
    map.insert("interpolations".to_owned(), json!([interpolation_name(s.interpolation())]));
    Value::Object(map)
}

/// An upper bound on the serialized length, used to `String::with_capacity`
/// the output buffer before filling it — the writer's "compute a bound,
/// then fill" contract, even though the buffer is a growable `String`
/// rather than a fixed allocation.
#[must_use]
pub fn mfjson_size_upper_bound(value: &Temporal) -> usize {
    const PER_SAMPLE: usize = 96;
    let samples = match value {
        Temporal::Instant(_) => 1,
        Temporal::InstantSet(s) => s.instants().len(),
        Temporal::Sequence(s) => s.instants().len(),
        Temporal::SequenceSet(s) => s.sequences().iter().map(|seq| seq.instants().len()).sum(),
    };
    128 + samples * PER_SAMPLE
}

/// Serializes a temporal value to MF-JSON text, using up to `precision`
/// decimal digits (clamped to 15) for numeric fields.
#[must_use]
pub fn to_mfjson(value: &Temporal, precision: u8) -> String {
    let mut map = Map::new();
    map.insert("type".to_owned(), json!(type_name(value)));

    match value {
        Temporal::Instant(i) => {
            instant_samples(&mut map, std::slice::from_ref(i), precision);
        }
        Temporal::InstantSet(s) => {
            instant_samples(&mut map, s.instants(), precision);
            map.insert("interpolations".to_owned(), json!(["Discrete"]));
        }
        Temporal::Sequence(s) => {
            instant_samples(&mut map, s.instants(), precision);
            map.insert("lower_inc".to_owned(), json!(s.lower_inc()));
            map.insert("upper_inc".to_owned(), json!(s.upper_inc()));
            map.insert("interpolations".to_owned(), json!([interpolation_name(s.interpolation())]));
        }
        Temporal::SequenceSet(s) => {
            map.insert("sequences".to_owned(), Value::Array(s.sequences().iter().map(|seq| sequence_object(seq, precision)).collect()));
            map.insert("interpolations".to_owned(), json!([interpolation_name(s.interpolation())]));
        }
    }

    let mut out = String::with_capacity(mfjson_size_upper_bound(value));
    out.push_str(&Value::Object(map).to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base::BaseValue, time::Timestamp, value::SequenceBuilder};

    #[test]
    fn instant_has_a_single_sample() {
        let value = Temporal::Instant(Instant::new(Timestamp::from_micros(0), BaseValue::Float(1.5)));
        let text = to_mfjson(&value, 6);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["type"], "MovingFloat");
        assert_eq!(parsed["values"][0], 1.5);
        assert_eq!(parsed["datetimes"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn points_serialize_as_coordinates() {
        let value = Temporal::Instant(Instant::new(Timestamp::from_micros(0), BaseValue::Point2D(crate::base::Point2D::new(1.0, 2.0, 4326))));
        let text = to_mfjson(&value, 6);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["coordinates"][0], json!([1.0, 2.0]));
    }

    #[test]
    fn sequence_set_nests_member_sequences() {
        let a = SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(0.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(10.0))
            .build()
            .unwrap();
        let b = SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(20), BaseValue::Float(0.0))
            .instant(Timestamp::from_micros(30), BaseValue::Float(10.0))
            .build()
            .unwrap();
        let set = crate::value::SequenceSetBuilder::new().sequence(a).sequence(b).build().unwrap();
        let text = to_mfjson(&Temporal::SequenceSet(set), 6);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["sequences"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["sequences"][0]["lower_inc"], true);
    }

    #[test]
    fn float_precision_is_respected() {
        let value = Temporal::Instant(Instant::new(Timestamp::from_micros(0), BaseValue::Float(1.0 / 3.0)));
        let text = to_mfjson(&value, 2);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["values"][0], 0.33);
    }
}
