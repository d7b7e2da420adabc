//! Pure conversion of a raw device payload into a [`TelemetryRecord`].
//!
//! Nothing here logs, writes or reads shared state; the same inputs always
//! produce the same record or the same error.

use serde_json::{Map, Value};

use crate::domain::TelemetryRecord;
use crate::error::NormalizeError;
use crate::validators::{parse_delivery_timestamp, validate_device_id};

/// Payload field names as published by the sensor firmware
pub mod fields {
    pub const SOIL_HUMIDITY: &str = "soil_humidity";
    pub const TEMP: &str = "temp";
    pub const HUMIDITY: &str = "humidity";
    pub const WATERED_FLAG: &str = "watered_flag";
    pub const ERROR: &str = "error";
    pub const SUCCESS: &str = "success";
    pub const ATTEMPT: &str = "attempt";
}

/// Magnitudes at or above this cannot be written as a DynamoDB number
pub const MAX_STORABLE_MAGNITUDE: f64 = 1e126;
/// Non-zero magnitudes below this cannot be written as a DynamoDB number
pub const MIN_STORABLE_MAGNITUDE: f64 = 1e-130;

/// Decode a message body into a JSON payload
pub fn parse_payload(body: &str) -> Result<Value, NormalizeError> {
    serde_json::from_str(body)
        .map_err(|e| NormalizeError::malformed("payload", format!("body is not valid JSON: {}", e)))
}

/// Normalize one raw event into a canonical telemetry record
///
/// `soil_humidity` is required and rounded to one decimal place; `temp` and
/// `humidity` are rounded to whole units; the remaining fields are copied
/// as-is, whatever their JSON type. A field appears in the record only if it
/// appears in the payload. Numbers outside the storable range are rejected
/// here so they never surface as a write failure.
/// Any timestamp inside the payload is ignored in favour of
/// `delivery_timestamp`.
pub fn normalize(
    payload: &Value,
    device_id: &str,
    delivery_timestamp: &str,
) -> Result<TelemetryRecord, NormalizeError> {
    validate_device_id(device_id)?;
    let timestamp = parse_delivery_timestamp(delivery_timestamp)?;

    let object = payload
        .as_object()
        .ok_or_else(|| NormalizeError::malformed("payload", "payload must be a JSON object"))?;

    let soil_humidity = match optional_field(object, fields::SOIL_HUMIDITY, "a number", as_f64)? {
        Some(value) => storable(fields::SOIL_HUMIDITY, round_to_tenth(value))?,
        None => {
            return Err(NormalizeError::malformed(
                fields::SOIL_HUMIDITY,
                "field is required",
            ))
        }
    };

    let temp = optional_field(object, fields::TEMP, "a number", as_f64)?
        .map(|value| storable(fields::TEMP, round_half_up(value)))
        .transpose()?;
    let humidity = optional_field(object, fields::HUMIDITY, "a number", as_f64)?
        .map(|value| storable(fields::HUMIDITY, round_half_up(value)))
        .transpose()?;

    let watered_flag = pass_through(object, fields::WATERED_FLAG)?;
    let error = pass_through(object, fields::ERROR)?;
    let success = pass_through(object, fields::SUCCESS)?;
    let attempt = pass_through(object, fields::ATTEMPT)?;

    Ok(TelemetryRecord {
        timestamp,
        soil_humidity,
        temp,
        humidity,
        watered_flag,
        error,
        success,
        attempt,
    })
}

/// Round to the nearest whole number, halves toward positive infinity
/// (`44.5 -> 45`, `-2.5 -> -2`)
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Round to one decimal place (`12.34 -> 12.3`, `12.35 -> 12.4`)
pub fn round_to_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Look up a field; absent and `null` both mean "not reported"
fn optional_field<T>(
    object: &Map<String, Value>,
    name: &'static str,
    expected: &str,
    extract: impl Fn(&Value) -> Option<T>,
) -> Result<Option<T>, NormalizeError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => extract(value).map(Some).ok_or_else(|| {
            NormalizeError::malformed(name, format!("expected {}, got {}", expected, value))
        }),
    }
}

/// Copy a field verbatim; only numbers nested in it are range-checked
fn pass_through(
    object: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<Value>, NormalizeError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            check_numbers(name, value)?;
            Ok(Some(value.clone()))
        }
    }
}

fn check_numbers(name: &'static str, value: &Value) -> Result<(), NormalizeError> {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(n) => storable(name, n).map(|_| ()),
            None => Ok(()),
        },
        Value::Array(items) => items.iter().try_for_each(|item| check_numbers(name, item)),
        Value::Object(map) => map.values().try_for_each(|item| check_numbers(name, item)),
        _ => Ok(()),
    }
}

fn storable(name: &'static str, value: f64) -> Result<f64, NormalizeError> {
    let magnitude = value.abs();
    if value.is_finite()
        && magnitude < MAX_STORABLE_MAGNITUDE
        && (magnitude == 0.0 || magnitude >= MIN_STORABLE_MAGNITUDE)
    {
        Ok(value)
    } else {
        Err(NormalizeError::malformed(name, "value is out of numeric range"))
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}
