//! Strict-mode JSON schemas generated from Rust types.
//!
//! `schemars` produces draft-07 schemas with `$ref`s into a `definitions`
//! map. Strict structured output wants every object closed
//! (`additionalProperties: false`), every property listed in `required`,
//! and no references, so the generated schema is rewritten accordingly.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Types usable as a structured response.
///
/// Blanket-implemented for anything that is `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Schema in the shape strict structured output accepts.
    fn openai_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        close_objects(&mut value);
        inline_refs(&mut value);
        strip_numeric_keywords(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    /// Schema name for this type.
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type") == Some(&Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                if let Some(Value::Object(props)) = map.get("properties") {
                    let keys: Vec<Value> = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".to_string(), Value::Array(keys));
                }
            }
            for (_, v) in map.iter_mut() {
                close_objects(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

/// Drop `format`/`minimum` from numeric schemas (`usize` fields emit
/// `"format": "uint", "minimum": 0.0`, which strict mode rejects).
fn strip_numeric_keywords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let numeric = matches!(
                map.get("type").and_then(Value::as_str),
                Some("integer") | Some("number")
            );
            if numeric {
                map.remove("format");
                map.remove("minimum");
            }
            for (_, v) in map.iter_mut() {
                strip_numeric_keywords(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_numeric_keywords),
        _ => {}
    }
}

fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_with(value, &defs);
    }
}

fn inline_refs_with(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(def) = target {
                *value = def;
                inline_refs_with(value, definitions);
                return;
            }

            for (_, v) in map.iter_mut() {
                inline_refs_with(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs_with(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct Verdict {
        is_correct: bool,
        exact_quote: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Verdicts {
        items: Vec<Verdict>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Indexed {
        index: usize,
        format: String,
    }

    #[test]
    fn test_optional_fields_still_required() {
        let schema = Verdict::openai_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();

        assert!(required.contains(&"isCorrect"));
        assert!(required.contains(&"exactQuote"));
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn test_nested_types_inlined() {
        let schema = Verdicts::openai_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("definitions"));
        assert!(!obj.contains_key("$schema"));

        let item = &schema["properties"]["items"]["items"];
        assert!(item.get("$ref").is_none());
        assert_eq!(item["type"], "object");
        assert_eq!(item["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn test_unsigned_keywords_removed() {
        let schema = Indexed::openai_schema();
        let index = &schema["properties"]["index"];

        assert_eq!(index["type"], "integer");
        assert!(index.get("format").is_none());
        assert!(index.get("minimum").is_none());
        assert!(schema["properties"].get("format").is_some());
    }
}
