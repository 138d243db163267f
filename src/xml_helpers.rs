//! Attribute readers for quick-xml start tags.
//!
//! Values are entity-decoded. Missing, undecodable or unparsable values
//! read as `None`.

use std::str::FromStr;

use quick_xml::events::BytesStart;

/// Decoded value of the attribute named exactly `key` (prefix included).
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.into_owned()))
}

/// Attribute parsed with [`FromStr`], surrounding whitespace ignored.
pub fn attr_parse<T: FromStr>(e: &BytesStart, key: &[u8]) -> Option<T> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_parse(e, key)
}

/// Finite `f64` attribute. `NaN` and infinities read as `None`.
pub fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_parse(e, key).filter(|v: &f64| v.is_finite())
}

/// OOXML boolean: `1` and `true` are true, anything else false.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.trim(), "1" | "true"))
}

/// The `val` attribute that font and format child elements carry.
pub fn attr_val(e: &BytesStart) -> Option<String> {
    attr_string(e, b"val")
}

pub fn attr_val_f64(e: &BytesStart) -> Option<f64> {
    attr_f64(e, b"val")
}
