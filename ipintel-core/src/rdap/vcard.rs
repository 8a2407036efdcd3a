//! Minimal jCard (RFC 7095) reader for RDAP entity names.
//!
//! A jCard is `["vcard", [[name, params, type, value, ...], ...]]`. Only the
//! formatted-name property is needed here.

use serde_json::Value;

/// Returns the value of the first `fn` property, if it is a non-empty string.
///
/// Only the first `fn` property is considered; a malformed one is not skipped
/// in favour of a later one.
pub fn formatted_name(vcard: &Value) -> Option<String> {
    property_value(vcard, "fn")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(String::from)
}

fn property_value<'a>(vcard: &'a Value, name: &str) -> Option<&'a Value> {
    let properties = vcard.as_array()?.get(1)?.as_array()?;
    properties
        .iter()
        .filter_map(Value::as_array)
        .find(|prop| prop.first().and_then(Value::as_str) == Some(name))
        .and_then(|prop| prop.get(3))
}
