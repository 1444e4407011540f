//! Type conversion of resolved values

use crate::error::{BeansError, BeansResult};
use crate::types::TypeHandle;
use crate::value::Value;

/// Converts resolved values into declared target types
pub trait TypeConverter: Send + Sync {
    fn convert_if_necessary(&self, value: Value, target: &TypeHandle) -> BeansResult<Value>;
}

/// Converter for textual literals into the built-in scalar types
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTypeConverter;

impl SimpleTypeConverter {
    /// Create a converter for the built-in scalar types
    pub fn new() -> Self {
        Self
    }
}

fn mismatch(value: &Value, target: &TypeHandle, message: impl Into<String>) -> BeansError {
    BeansError::TypeMismatch {
        value: value.to_string(),
        required_type: target.name().to_string(),
        message: message.into(),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl TypeConverter for SimpleTypeConverter {
    fn convert_if_necessary(&self, value: Value, target: &TypeHandle) -> BeansResult<Value> {
        if target.is_assignable_from(&value) {
            return Ok(value);
        }

        match (&value, target) {
            (Value::Text(text), TypeHandle::Bool) => parse_bool(text)
                .map(Value::Bool)
                .ok_or_else(|| mismatch(&value, target, "not a boolean literal")),
            (Value::Text(text), TypeHandle::Int) => text
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| mismatch(&value, target, e.to_string())),
            (Value::Text(text), TypeHandle::Float) => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| mismatch(&value, target, e.to_string())),
            (Value::Text(text), TypeHandle::Char) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(mismatch(&value, target, "expected exactly one character")),
                }
            }
            (Value::Int(number), TypeHandle::Float) => Ok(Value::Float(*number as f64)),
            (Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Char(_), TypeHandle::Text) => {
                Ok(Value::Text(value.to_string()))
            }
            _ => Err(mismatch(
                &value,
                target,
                format!("no conversion from {}", value.kind()),
            )),
        }
    }
}
