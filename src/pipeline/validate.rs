use std::ops::RangeInclusive;

use crate::error::ValidationError;

/// Physically plausible bounds for a DHT11 class sensor, inclusive.
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = -50.0..=100.0;
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Accepts or rejects a decoded reading. Pure, ordered rules; the
/// first failing rule determines the rejection reason.
pub fn validate(temperature: f64, humidity: f64) -> Result<(), ValidationError> {
    if !temperature.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "temperature",
            value: temperature,
        });
    }
    if !humidity.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "humidity",
            value: humidity,
        });
    }
    if !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(ValidationError::OutOfRange {
            field: "temperature",
            value: temperature,
            min: *TEMPERATURE_RANGE.start(),
            max: *TEMPERATURE_RANGE.end(),
        });
    }
    if !HUMIDITY_RANGE.contains(&humidity) {
        return Err(ValidationError::OutOfRange {
            field: "humidity",
            value: humidity,
            min: *HUMIDITY_RANGE.start(),
            max: *HUMIDITY_RANGE.end(),
        });
    }
    Ok(())
}
