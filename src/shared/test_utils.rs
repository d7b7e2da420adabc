//! Test utilities for property-based testing
//!
//! Generators for device ids, delivery timestamps and sensor payloads, used
//! by the proptest suites under `tests/`.

pub mod generators {
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    /// Generate a valid device id (printable ASCII, 1-64 chars)
    pub fn device_id() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z0-9][A-Za-z0-9_:.-]{0,63}")
            .expect("Valid regex for device_id")
    }

    /// Generate an invalid device id (blank, too long or containing control chars)
    pub fn invalid_device_id() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("".to_string()),
            Just("   ".to_string()),
            Just("device\n01".to_string()),
            Just("device\t01".to_string()),
            prop::string::string_regex("[a-z]{2049,2100}").expect("Valid regex"),
        ]
    }

    /// Generate a delivery timestamp between 2020-01-01 and 2030-12-31 (RFC3339, Z suffix)
    pub fn delivery_timestamp() -> impl Strategy<Value = String> {
        (1577836800000i64..1924991999000i64).prop_map(|ms| {
            chrono::DateTime::from_timestamp_millis(ms)
                .expect("timestamp within chrono range")
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        })
    }

    /// Generate a string that is not an RFC3339 timestamp
    pub fn invalid_delivery_timestamp() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("".to_string()),
            Just("2024-03-01".to_string()),
            Just("10:00:00Z".to_string()),
            Just("2024-02-30T10:00:00Z".to_string()),
            Just("1709287200000".to_string()),
            Just("not a timestamp".to_string()),
            Just("1969-12-31T23:59:59Z".to_string()),
        ]
    }

    /// Soil humidity reading in percent
    pub fn soil_humidity() -> impl Strategy<Value = f64> {
        0.0..100.0f64
    }

    /// Air temperature in degrees Celsius
    pub fn temp() -> impl Strategy<Value = f64> {
        -40.0..85.0f64
    }

    /// Relative humidity in percent
    pub fn humidity() -> impl Strategy<Value = f64> {
        0.0..100.0f64
    }

    /// Device error field: either a flag or a short message
    pub fn error_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            prop::string::string_regex("[a-z ]{1,32}")
                .expect("Valid regex")
                .prop_map(Value::String),
        ]
    }

    /// Generate a valid payload: `soil_humidity` always, each optional field independently
    pub fn payload() -> impl Strategy<Value = Value> {
        (
            soil_humidity(),
            prop::option::of(temp()),
            prop::option::of(humidity()),
            prop::option::of(any::<bool>()),
            prop::option::of(error_value()),
            prop::option::of(any::<bool>()),
            prop::option::of(0u32..10),
        )
            .prop_map(
                |(soil, temp, humidity, watered_flag, error, success, attempt)| {
                    let mut object = Map::new();
                    object.insert("soil_humidity".to_string(), json!(soil));
                    if let Some(t) = temp {
                        object.insert("temp".to_string(), json!(t));
                    }
                    if let Some(h) = humidity {
                        object.insert("humidity".to_string(), json!(h));
                    }
                    if let Some(w) = watered_flag {
                        object.insert("watered_flag".to_string(), json!(w));
                    }
                    if let Some(e) = error {
                        object.insert("error".to_string(), e);
                    }
                    if let Some(s) = success {
                        object.insert("success".to_string(), json!(s));
                    }
                    if let Some(a) = attempt {
                        object.insert("attempt".to_string(), json!(a));
                    }
                    Value::Object(object)
                },
            )
    }

    /// Generate a payload whose `soil_humidity` is missing or not a number
    pub fn payload_without_soil_humidity() -> impl Strategy<Value = Value> {
        let bad_value = prop_oneof![
            Just(Value::Null),
            Just(json!("42.5")),
            Just(json!(true)),
            Just(json!([42.5])),
            Just(json!({"value": 42.5})),
        ];

        (payload(), prop::option::of(bad_value)).prop_map(|(mut payload, bad)| {
            if let Some(object) = payload.as_object_mut() {
                match bad {
                    Some(value) => {
                        object.insert("soil_humidity".to_string(), value);
                    }
                    None => {
                        object.remove("soil_humidity");
                    }
                }
            }
            payload
        })
    }
}

pub mod helpers {
    /// Count the decimal places needed to print a value exactly
    pub fn decimal_places(value: f64) -> usize {
        let text = value.to_string();
        text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
    }
}
