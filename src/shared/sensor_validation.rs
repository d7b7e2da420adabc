use crate::domain::TelemetryRecord;

pub const TEMP_MIN_C: f64 = -40.0;
pub const TEMP_MAX_C: f64 = 85.0;
pub const HUMIDITY_MIN_PCT: f64 = 0.0;
pub const HUMIDITY_MAX_PCT: f64 = 100.0;
pub const SOIL_HUMIDITY_MIN_PCT: f64 = 0.0;
pub const SOIL_HUMIDITY_MAX_PCT: f64 = 100.0;

/// A stored value that lies outside what the sensor can physically report
#[derive(Debug, Clone, PartialEq)]
pub struct RangeAdvisory {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

fn check(field: &'static str, value: Option<f64>, min: f64, max: f64) -> Option<RangeAdvisory> {
    match value {
        Some(v) if v < min || v > max => Some(RangeAdvisory {
            field,
            value: v,
            min,
            max,
        }),
        _ => None,
    }
}

/// List out-of-range values in a record. Advisory only; records are
/// stored regardless.
pub fn range_advisories(record: &TelemetryRecord) -> Vec<RangeAdvisory> {
    [
        check(
            "soil_humidity",
            Some(record.soil_humidity),
            SOIL_HUMIDITY_MIN_PCT,
            SOIL_HUMIDITY_MAX_PCT,
        ),
        check("temp", record.temp, TEMP_MIN_C, TEMP_MAX_C),
        check("humidity", record.humidity, HUMIDITY_MIN_PCT, HUMIDITY_MAX_PCT),
    ]
    .into_iter()
    .flatten()
    .collect()
}
