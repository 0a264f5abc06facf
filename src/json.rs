// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use crate::value::{StringValue, Value};

pub use serde_json::{json, Value as JsonValue};

pub fn stringify(value: &Value) -> Result<String, String> {
    serde_json::to_string(&sanitize(value))
        .map_err(|err| format!("JSON serialization failed: {}", err))
}

pub fn sanitize(value: &Value) -> JsonValue {
    match value {
        Value::Unit => JsonValue::Null,
        Value::Boolean(value) => JsonValue::Bool(*value),
        Value::Int(value) => JsonValue::Number((*value).into()),
        Value::String(value) => JsonValue::String(String::from(value.get())),
    }
}

pub fn parse(input: &str) -> Result<Value, String> {
    deserialize(input).and_then(hydrate)
}

pub fn deserialize(input: &str) -> Result<JsonValue, String> {
    serde_json::from_str(input).map_err(|err| format!("JSON deserialization failed: {}", err))
}

pub fn hydrate(value: JsonValue) -> Result<Value, String> {
    match value {
        JsonValue::Null => Ok(Value::Unit),
        JsonValue::Bool(value) => Ok(Value::Boolean(value)),
        JsonValue::Number(value) => match value.as_i64() {
            Some(value) => Ok(Value::Int(value)),
            None => Err(format!(
                "JSON deserialization encountered invalid number: {}",
                value
            )),
        },
        JsonValue::String(value) => Ok(Value::String(StringValue::new(value))),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(String::from(
            "JSON deserialization encountered unsupported structure",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{hydrate, json, parse, sanitize, stringify};
    use crate::value::Value;

    #[test]
    fn sanitize_values() {
        assert_eq!(sanitize(&Value::Unit), json!(null));
        assert_eq!(sanitize(&Value::Boolean(true)), json!(true));
        assert_eq!(sanitize(&Value::Int(-4)), json!(-4));
        assert_eq!(sanitize(&Value::string("Ben")), json!("Ben"));
    }

    #[test]
    fn stringify_values() {
        assert_eq!(stringify(&Value::Int(123)).unwrap(), "123");
        assert_eq!(stringify(&Value::string("Ben SIR ")).unwrap(), "\"Ben SIR \"");
    }

    #[test]
    fn parse_values() {
        assert_eq!(parse("null").unwrap(), Value::Unit);
        assert_eq!(parse("-4").unwrap(), Value::Int(-4));
        assert_eq!(parse("\"Ben\"").unwrap(), Value::string("Ben"));
        assert!(parse("3.5").unwrap_err().contains("invalid number"));
        assert!(hydrate(json!([1, 2, 3]))
            .unwrap_err()
            .contains("unsupported structure"));
    }
}
