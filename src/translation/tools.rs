// Tool translation and schema sanitization
// Author: kelexine (https://github.com/kelexine)

use crate::models::chat::ChatTool;
use crate::models::gemini::{
    CodeExecution, FunctionCall, FunctionDeclaration, FunctionResponse, Part, Tool,
};
use serde_json::{json, Value};
use tracing::debug;

/// Translate neutral tools to Gemini tools.
///
/// All function tools share one `Tool` entry; code execution gets its own.
/// An empty tool list yields no entries, never an empty `Tool`.
pub fn translate_tools(tools: &[ChatTool]) -> Vec<Tool> {
    let mut declarations = Vec::new();
    let mut code_execution = false;

    for tool in tools {
        match tool {
            ChatTool::Function {
                name,
                description,
                parameters,
            } => declarations.push(FunctionDeclaration {
                name: name.clone(),
                description: description.clone().unwrap_or_default(),
                parameters: parameters.clone().map(sanitize_schema),
            }),
            ChatTool::CodeExecution => code_execution = true,
        }
    }

    let mut translated = Vec::new();
    if !declarations.is_empty() {
        debug!("Declaring {} functions", declarations.len());
        translated.push(Tool {
            function_declarations: Some(declarations),
            code_execution: None,
        });
    }
    if code_execution {
        translated.push(Tool {
            function_declarations: None,
            code_execution: Some(CodeExecution::default()),
        });
    }
    translated
}

/// Sanitize a JSON schema for the OpenAPI subset Gemini accepts.
pub fn sanitize_schema(schema: Value) -> Value {
    const FORBIDDEN: &[&str] = &[
        // JSON Schema meta keywords
        "$schema",
        "$id",
        "$ref",
        "$comment",
        "definitions",
        "$defs",
        // Range constraints not supported
        "exclusiveMinimum",
        "exclusiveMaximum",
        "multipleOf",
        // Object constraints not supported
        "additionalProperties",
        "propertyNames",
        "patternProperties",
        "additionalItems",
        "default",
        "examples",
        "const",
        "pattern",
        "contentMediaType",
        "contentEncoding",
    ];

    let schema = clean(schema, FORBIDDEN, false);
    ensure_type_fields(schema)
}

/// Remove forbidden keywords and unsupported `format`s. Keys directly below
/// `properties` are property names, not keywords, and are kept.
fn clean(value: Value, forbidden: &[&str], property_names: bool) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, value)| {
                    property_names
                        || !(forbidden.contains(&key.as_str())
                            || (key == "format" && !supported_format(value)))
                })
                .map(|(key, value)| {
                    let below_properties = !property_names && key == "properties";
                    let value = clean(value, forbidden, below_properties);
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| clean(v, forbidden, false))
                .collect(),
        ),
        other => other,
    }
}

fn supported_format(format: &Value) -> bool {
    matches!(
        format.as_str(),
        Some("enum" | "date-time" | "int32" | "int64" | "float" | "double")
    )
}

/// Objects with `properties` but no `type` are typed as `object`.
fn ensure_type_fields(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if !map.contains_key("type")
                && !map.contains_key("anyOf")
                && map.contains_key("properties")
            {
                map.insert("type".to_string(), json!("object"));
            }

            Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, ensure_type_fields(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(ensure_type_fields).collect()),
        other => other,
    }
}

/// Neutral function call → Gemini `functionCall` part.
pub fn translate_function_call(call_id: Option<String>, name: String, arguments: Value) -> Part {
    Part::FunctionCall {
        function_call: FunctionCall {
            id: call_id,
            name,
            args: arguments,
        },
        thought_signature: None,
    }
}

/// Neutral function result → Gemini `functionResponse` part. The API wants
/// an object; other values are wrapped as `{"output": value}`.
pub fn translate_function_result(call_id: Option<String>, name: String, result: Value) -> Part {
    let response = match result {
        Value::Object(_) => result,
        other => json!({ "output": other }),
    };

    Part::FunctionResponse {
        function_response: FunctionResponse {
            id: call_id,
            name,
            response,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sanitization() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "name": { "type": "string", "format": "email" },
                "when": { "type": "string", "format": "date-time" }
            },
            "additionalProperties": false,
            "exclusiveMinimum": 0,
            "$ref": "#/definitions/foo"
        });

        let sanitized = sanitize_schema(schema);

        assert!(sanitized.get("$schema").is_none());
        assert!(sanitized.get("exclusiveMinimum").is_none());
        assert!(sanitized.get("$ref").is_none());
        assert!(sanitized.get("additionalProperties").is_none());
        assert!(sanitized["properties"]["name"].get("format").is_none());
        assert_eq!(sanitized["properties"]["when"]["format"], "date-time");
    }

    #[test]
    fn test_property_named_like_keyword_is_kept() {
        let schema = json!({
            "properties": {
                "default": { "type": "string", "default": "x" },
                "nested": { "$schema": "removed", "properties": { "a": { "type": "integer" } } }
            }
        });

        let sanitized = sanitize_schema(schema);
        let properties = &sanitized["properties"];

        assert_eq!(sanitized["type"], "object");
        assert!(properties.get("default").is_some());
        assert!(properties["default"].get("default").is_none());
        assert!(properties["nested"].get("$schema").is_none());
        assert_eq!(properties["nested"]["type"], "object");
    }

    #[test]
    fn test_translate_tools_groups_functions() {
        let tools = vec![
            ChatTool::Function {
                name: "get_weather".to_string(),
                description: Some("Weather for a city".to_string()),
                parameters: Some(json!({ "type": "object", "properties": {} })),
            },
            ChatTool::CodeExecution,
            ChatTool::Function {
                name: "get_time".to_string(),
                description: None,
                parameters: None,
            },
        ];

        let translated = translate_tools(&tools);
        assert_eq!(translated.len(), 2);
        let declarations = translated[0].function_declarations.as_ref().unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1].name, "get_time");
        assert!(translated[1].code_execution.is_some());

        assert!(translate_tools(&[]).is_empty());
    }

    #[test]
    fn test_function_result_wrapped() {
        let part = translate_function_result(None, "f".to_string(), json!("sunny"));
        match part {
            Part::FunctionResponse { function_response } => {
                assert_eq!(function_response.response, json!({ "output": "sunny" }));
            }
            other => panic!("unexpected part {:?}", other),
        }
    }
}
