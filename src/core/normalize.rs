use crate::models::GuestMatch;
use serde_json::Value;

/// Keys under which a registry may wrap its result list, in precedence order
const LIST_KEYS: [&str; 4] = ["results", "matches", "guests", "data"];

/// Extract the list of raw guest records from a search response body
///
/// Accepts a bare array or an object wrapping one under a known key.
/// Any other shape means "no matches".
pub fn extract_results(body: &Value) -> &[Value] {
    if let Some(items) = body.as_array() {
        return items;
    }
    LIST_KEYS
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Normalize a whole search response into guest matches
///
/// Entries that are not JSON objects are skipped.
pub fn normalize_results(body: &Value) -> Vec<GuestMatch> {
    extract_results(body)
        .iter()
        .filter(|item| item.is_object())
        .map(normalize_guest)
        .collect()
}

/// Map one upstream guest record onto the canonical shape
///
/// Field precedence (first present, non-null key wins):
/// - id: `id`, `guest_id`, `guestId` (numbers are stringified)
/// - firstName: `first_name`, `firstName`
/// - lastName: `last_name`, `lastName`
/// - dob: `dob`, `date_of_birth`, `dateOfBirth`
/// - zip: `zip`, `postal_code`, `postalCode`
/// - phone, email: same key in both conventions
pub fn normalize_guest(raw: &Value) -> GuestMatch {
    GuestMatch {
        id: pick(raw, &["id", "guest_id", "guestId"]),
        first_name: pick(raw, &["first_name", "firstName"]).unwrap_or_default(),
        last_name: pick(raw, &["last_name", "lastName"]).unwrap_or_default(),
        dob: pick(raw, &["dob", "date_of_birth", "dateOfBirth"]).unwrap_or_default(),
        zip: pick(raw, &["zip", "postal_code", "postalCode"]).unwrap_or_default(),
        phone: pick(raw, &["phone"]).unwrap_or_default(),
        email: pick(raw, &["email"]).unwrap_or_default(),
    }
}

/// Read an identifier-like value (string or number) from a response body
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn pick(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(key))
        .find(|value| !value.is_null())
        .and_then(scalar_string)
}
