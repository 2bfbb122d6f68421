//! Lenient field decoding shared by request bodies and stored documents.
//!
//! Numbers arrive as integers, whole floats, or numeric strings; text fields
//! may arrive as numbers or booleans. Both collapse to one Rust type, and
//! anything that cannot be cast is a deserialization error.

use std::fmt;

use serde::de::{Deserializer, Error, Unexpected, Visitor};

/// `value` as an `i64` when it is whole and inside the `i64` range.
pub fn whole_number(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

struct IntegerVisitor;

impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer, a whole number, or a numeric string")
    }

    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_i64<E: Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E: Error>(self, value: f64) -> Result<Self::Value, E> {
        whole_number(value)
            .map(Some)
            .ok_or_else(|| E::invalid_value(Unexpected::Float(value), &self))
    }

    fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Ok(parsed) = trimmed.parse::<i64>() {
            return Ok(Some(parsed));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(whole_number)
            .map(Some)
            .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
    }
}

/// `deserialize_with` target for optional integer fields.
pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    deserializer.deserialize_option(IntegerVisitor)
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, or boolean")
    }

    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_string<E: Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_i64<E: Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_u64<E: Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_f64<E: Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_bool<E: Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }
}

/// `deserialize_with` target for optional text fields.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    deserializer.deserialize_option(TextVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "integer")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "text")]
        label: Option<String>,
    }

    fn decode(value: serde_json::Value) -> Result<Fields, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn integers_accept_whole_floats_and_numeric_strings() {
        for raw in [json!(3), json!(3.0), json!("3"), json!(" 3.0 "), json!("3e0")] {
            assert_eq!(decode(json!({ "count": raw })).unwrap().count, Some(3), "{raw}");
        }
    }

    #[test]
    fn integers_treat_null_empty_and_missing_as_absent() {
        assert_eq!(decode(json!({ "count": null })).unwrap().count, None);
        assert_eq!(decode(json!({ "count": "" })).unwrap().count, None);
        assert_eq!(decode(json!({})).unwrap().count, None);
    }

    #[test]
    fn integers_reject_fractions_words_and_overflow() {
        for raw in [
            json!(2.5),
            json!("2.5"),
            json!("three"),
            json!(true),
            json!([1]),
            json!(1e300),
            json!(u64::MAX),
        ] {
            assert!(decode(json!({ "count": raw })).is_err(), "{raw}");
        }
    }

    #[test]
    fn whole_number_bounds() {
        assert_eq!(whole_number(-9_223_372_036_854_775_808.0), Some(i64::MIN));
        assert_eq!(whole_number(9_223_372_036_854_775_808.0), None);
        assert_eq!(whole_number(f64::NAN), None);
        assert_eq!(whole_number(f64::INFINITY), None);
    }

    #[test]
    fn text_casts_scalars_and_rejects_structures() {
        assert_eq!(decode(json!({ "label": 42 })).unwrap().label.as_deref(), Some("42"));
        assert_eq!(decode(json!({ "label": 2.5 })).unwrap().label.as_deref(), Some("2.5"));
        assert_eq!(decode(json!({ "label": true })).unwrap().label.as_deref(), Some("true"));
        assert_eq!(decode(json!({ "label": null })).unwrap().label, None);
        assert!(decode(json!({ "label": { "a": 1 } })).is_err());
    }
}
