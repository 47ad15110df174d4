//! Lenient field readers and the document writer.

use serde_json::{Map, Value};

use crate::damage::DamageType;
use crate::stack::StackKind;

/// Borrowed view of one configuration value.
///
/// Every accessor returns `None` when the value has the wrong shape, so
/// modules keep their defaults for invalid input.
#[derive(Clone, Copy, Debug)]
pub struct FieldValue<'a>(&'a Value);

impl<'a> FieldValue<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> &'a Value {
        self.0
    }

    /// Numbers, or strings that parse as numbers.
    pub fn as_f32(&self) -> Option<f32> {
        let value = match self.0 {
            Value::Number(n) => n.as_f64().map(|v| v as f32),
            Value::String(s) => s.trim().parse::<f32>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self.0 {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|v| v as i64))
                .and_then(|v| i32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i32().and_then(|v| u32::try_from(v).ok()).or_else(|| match self.0 {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            _ => None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.0 {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Some(true),
                "false" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.0.as_str()
    }

    /// `"Bullet | Weakspot"` or `["Bullet", "Weakspot"]`.
    pub fn as_mask(&self) -> Option<DamageType> {
        match self.0 {
            Value::String(s) => Some(DamageType::parse_mask(s)),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(DamageType::parse_mask)
                    .fold(DamageType::empty(), |mask, flag| mask | flag),
            ),
            _ => None,
        }
    }

    pub fn as_stack_kind(&self) -> Option<StackKind> {
        self.as_str().and_then(StackKind::parse)
    }
}

/// Builds one module document.
#[derive(Debug, Default)]
pub struct DocumentWriter {
    fields: Map<String, Value>,
}

impl DocumentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(&mut self, key: &str, value: f32) -> &mut Self {
        self.value(key, Value::from(f64::from(value)))
    }

    pub fn integer(&mut self, key: &str, value: i64) -> &mut Self {
        self.value(key, Value::from(value))
    }

    pub fn boolean(&mut self, key: &str, value: bool) -> &mut Self {
        self.value(key, Value::Bool(value))
    }

    pub fn string(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.value(key, Value::String(value.into()))
    }

    pub fn value(&mut self, key: &str, value: Value) -> &mut Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn finish(self) -> Value {
        Value::Object(self.fields)
    }
}
