use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// A contact form submission as received on the wire.
///
/// Fields are read by key from a JSON object and accept any JSON value.
/// Missing, `null`, `false`, `0` and `""` are treated as absent; other strings
/// are kept verbatim and other values are rendered the way a browser would
/// interpolate them. An array body has no named fields, so every field is absent.
#[derive(Debug, Clone, Default)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// A submission whose three fields are all present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendEmailResponse {
    pub message: String,
    #[serde(rename = "messageId")]
    pub message_id: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl<'de> Deserialize<'de> for ContactSubmission {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(mut map) => {
                let mut field = |key: &str| map.remove(key).and_then(truthy);
                Ok(Self {
                    name: field("name"),
                    email: field("email"),
                    message: field("message"),
                })
            }
            Value::Array(_) => Ok(Self::default()),
            other => Err(de::Error::custom(format!(
                "expected a JSON object, found {}",
                kind(&other)
            ))),
        }
    }
}

fn truthy(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(interpolated(&other)),
    }
}

/// Text of a non-string value as browser string interpolation produces it.
fn interpolated(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(interpolated).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl ContactSubmission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        Self {
            name: non_empty(name.into()),
            email: non_empty(email.into()),
            message: non_empty(message.into()),
        }
    }

    pub fn validate(self) -> Result<ValidSubmission> {
        match (self.name, self.email, self.message) {
            (Some(name), Some(email), Some(message)) => Ok(ValidSubmission {
                name,
                email,
                message,
            }),
            _ => Err(AppError::MissingFields),
        }
    }
}
