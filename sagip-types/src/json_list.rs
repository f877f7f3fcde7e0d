//! List fields (`services`, `category`, `imageUrls`) are stored as JSON-encoded
//! strings. Depending on the endpoint they come back either still encoded or
//! already decoded, so everything that reads them accepts both.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes a list that may be a JSON array or a string holding one.
/// Null, blank strings and unparsable strings all become an empty list.
pub fn parse(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(item_to_string).collect(),
        Value::String(s) => {
            if s.trim().is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Vec<Value>>(&s) {
                Ok(items) => items.into_iter().map(item_to_string).collect(),
                Err(e) => {
                    log::warn!("Ignoring malformed JSON list `{s}`: {e}");
                    Vec::new()
                }
            }
        }
        other => {
            log::warn!("Expected a JSON list, got `{other}`");
            Vec::new()
        }
    }
}

/// Encodes a list the way the database stores it.
pub fn encode(items: &[String]) -> String {
    // a Vec<String> always serializes
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn item_to_string(item: Value) -> String {
    match item {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse(Value::deserialize(deserializer)?))
}

pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.map(parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_accepts_arrays_and_encoded_strings() {
        assert_eq!(parse(json!(["Water", "Medical"])), vec!["Water", "Medical"]);
        assert_eq!(
            parse(json!("[\"Water\",\"Medical\"]")),
            vec!["Water", "Medical"]
        );
    }

    #[test]
    fn test_parse_degrades_to_empty() {
        assert!(parse(Value::Null).is_empty());
        assert!(parse(json!("")).is_empty());
        assert!(parse(json!("not json")).is_empty());
        assert!(parse(json!(42)).is_empty());
    }

    #[test]
    fn test_non_string_items_are_stringified() {
        assert_eq!(parse(json!([1, "two"])), vec!["1", "two"]);
    }

    #[test]
    fn test_encode_matches_storage_format() {
        let items = vec!["Water".to_string(), "Medical".to_string()];
        assert_eq!(encode(&items), r#"["Water","Medical"]"#);
        assert_eq!(encode(&[]), "[]");
    }
}
