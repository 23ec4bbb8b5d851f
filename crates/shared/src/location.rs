use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Validation failure for one feature's `properties` object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("properties must be a JSON object")]
    NotAnObject,

    #[error("required property \"{0}\" must be a non-empty string")]
    MissingRequiredField(&'static str),
}

/// Validated, read-only view over one GeoJSON feature's `properties`.
///
/// Construction rejects the feature outright when `city`, `name`, or `url`
/// is missing, non-string, or blank after trimming. A feature that fails
/// validation is an error, never a silently defaulted entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInfo {
    pub city: String,
    pub name: String,
    pub url: String,
    /// Optional; empty string when the feature carries no address.
    pub address: String,
    weekdays: Vec<String>,
}

impl LocationInfo {
    /// Parse and validate a raw `properties` value.
    ///
    /// Pure function of its input; the only side effect is a warning event
    /// when `weekdays` has an unusable shape.
    pub fn parse(properties: &Value) -> Result<Self, LocationError> {
        let object = properties.as_object().ok_or(LocationError::NotAnObject)?;

        let city = required_string(object, "city")?;
        let name = required_string(object, "name")?;
        let url = required_string(object, "url")?;

        let address = match object.get("address") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => String::new(),
        };

        let weekdays = parse_weekdays(object.get("weekdays"));

        Ok(Self {
            city,
            name,
            url,
            address,
            weekdays,
        })
    }

    pub fn weekdays(&self) -> &[String] {
        &self.weekdays
    }

    /// A feature's weekdays double as its filter categories.
    pub fn categories(&self) -> &[String] {
        &self.weekdays
    }
}

impl fmt::Display for LocationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.name, self.city)?;
        if !self.weekdays.is_empty() {
            write!(f, " ({})", self.weekdays.join(", "))?;
        }
        Ok(())
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<String, LocationError> {
    match object.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(LocationError::MissingRequiredField(field)),
    }
}

/// Lenient weekdays parsing, kept for data-file compatibility: anything
/// false-y means "no weekdays", a non-array shape degrades to the same with
/// a diagnostic instead of failing the load.
fn parse_weekdays(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    if is_falsy(value) {
        return Vec::new();
    }
    match value {
        Value::Array(days) => days.iter().map(stringify_day).collect(),
        other => {
            tracing::warn!(value = %other, "weekdays property is not an array, using empty list");
            Vec::new()
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false))
        || value.as_f64() == Some(0.0)
        || value.as_str() == Some("")
}

fn stringify_day(day: &Value) -> String {
    match day {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
