// Naming conventions - snake_case rows <-> camelCase DTOs
//
// Keys are rewritten letter by letter and the conversion recurses into nested
// objects and arrays. Scalars, including date/timestamp strings, pass through.
// Fields named in `opaque` keep their value verbatim. The opaque list always
// holds row-side (snake_case) names: row -> DTO checks the key before it is
// converted, DTO -> row checks it after, so both directions agree.

use serde_json::{Map, Value};

/// `key_points` -> `keyPoints`
pub fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}

/// `keyPoints` -> `key_points`
pub fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a row-shaped value into DTO keys
pub fn convert_keys_to_camel_case(value: Value, opaque: &[&str]) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| convert_keys_to_camel_case(item, opaque))
                .collect(),
        ),
        Value::Object(map) => {
            let converted: Map<String, Value> = map
                .into_iter()
                .map(|(key, value)| {
                    let value = if opaque.contains(&key.as_str()) {
                        value
                    } else {
                        convert_keys_to_camel_case(value, opaque)
                    };
                    (snake_to_camel(&key), value)
                })
                .collect();
            Value::Object(converted)
        }
        other => other,
    }
}

/// Convert a DTO-shaped value into row keys
pub fn convert_keys_to_snake_case(value: Value, opaque: &[&str]) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| convert_keys_to_snake_case(item, opaque))
                .collect(),
        ),
        Value::Object(map) => {
            let converted: Map<String, Value> = map
                .into_iter()
                .map(|(key, value)| {
                    let snake_key = camel_to_snake(&key);
                    let value = if opaque.contains(&snake_key.as_str()) {
                        value
                    } else {
                        convert_keys_to_snake_case(value, opaque)
                    };
                    (snake_key, value)
                })
                .collect();
            Value::Object(converted)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("user_id"), "userId");
        assert_eq!(snake_to_camel("decisions_made"), "decisionsMade");
        assert_eq!(snake_to_camel("id"), "id");
        // only `_` followed by a lowercase letter is rewritten
        assert_eq!(snake_to_camel("address_1"), "address_1");
        assert_eq!(snake_to_camel("trailing_"), "trailing_");
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("userId"), "user_id");
        assert_eq!(camel_to_snake("confidenceScore"), "confidence_score");
        assert_eq!(camel_to_snake("createdAt"), "created_at");
        assert_eq!(camel_to_snake("title"), "title");
    }

    #[test]
    fn test_nested_objects_and_arrays_are_converted() {
        let row = json!({
            "user_id": "u1",
            "agenda": {
                "created_at": "2024-03-01T10:00:00Z",
                "categories": [{"category": "Updates", "items": [{"is_done": false}]}]
            },
            "key_points": ["a", "b"]
        });

        let dto = convert_keys_to_camel_case(row, &[]);
        assert_eq!(
            dto,
            json!({
                "userId": "u1",
                "agenda": {
                    "createdAt": "2024-03-01T10:00:00Z",
                    "categories": [{"category": "Updates", "items": [{"isDone": false}]}]
                },
                "keyPoints": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_timestamps_pass_through_unchanged() {
        let row = json!({"completed_at": "2024-05-01T08:30:00.123456+00:00"});
        let dto = convert_keys_to_camel_case(row, &[]);
        assert_eq!(dto["completedAt"], json!("2024-05-01T08:30:00.123456+00:00"));
    }

    #[test]
    fn test_round_trip_keeps_row_keys_and_opaque_payload() {
        let row = json!({
            "id": "t1",
            "user_id": "u1",
            "context_id": "c1",
            "paragraphs": [{"num_words": 3, "speaker": 0, "sentences": [{"text": "hi", "start": 0.0, "end": 1.0}]}],
            "action_details": {"label_name": "Work", "UI_shape": {"someKey": 1}},
            "created_at": "2024-01-01T00:00:00Z"
        });
        let opaque = ["paragraphs", "action_details"];

        let dto = convert_keys_to_camel_case(row.clone(), &opaque);
        assert_eq!(dto["paragraphs"], row["paragraphs"]);
        assert_eq!(dto["actionDetails"], row["action_details"]);
        assert_eq!(dto["contextId"], json!("c1"));

        let back = convert_keys_to_snake_case(dto, &opaque);
        assert_eq!(back, row);
    }

    #[test]
    fn test_opaque_check_uses_row_name_in_both_directions() {
        // the DTO key `actionDetails` maps to the opaque row column `action_details`
        let dto = json!({"actionDetails": {"folderId": "x"}});
        let row = convert_keys_to_snake_case(dto, &["action_details"]);
        assert_eq!(row, json!({"action_details": {"folderId": "x"}}));

        let dto = convert_keys_to_camel_case(row, &["action_details"]);
        assert_eq!(dto, json!({"actionDetails": {"folderId": "x"}}));
    }
}
