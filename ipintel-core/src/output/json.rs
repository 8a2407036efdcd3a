use serde::Serialize;

/// Pretty-printed JSON; serialization failures are rendered as an error object
/// so a view is always produced.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({ "error": e.to_string() }).to_string()
    })
}
