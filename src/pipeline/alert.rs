use sqlx::PgPool;
use tracing::warn;

use crate::models::plant::{self as plant_model};

/// The `[min, max]` comfort bounds of a plant. A dimension only alerts
/// when both of its bounds are set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComfortEnvelope {
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
}

impl ComfortEnvelope {
    pub fn temperature_alert(&self, temperature: f64) -> bool {
        matches!((self.temp_min, self.temp_max),
            (Some(min), Some(max)) if temperature < min || temperature > max)
    }

    pub fn humidity_alert(&self, humidity: f64) -> bool {
        matches!((self.humidity_min, self.humidity_max),
            (Some(min), Some(max)) if humidity < min || humidity > max)
    }
}

/// Outcome of comparing one reading against the comfort envelope of
/// the plant associated with its sensor. The two dimensions are
/// independent; both may fire on the same reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertResult {
    /// Name of the evaluated plant; `None` means no alert context.
    pub plant: Option<String>,
    pub temperature: bool,
    pub humidity: bool,
}

impl AlertResult {
    pub fn any(&self) -> bool {
        self.temperature || self.humidity
    }
}

/// Evaluates a committed reading. Read-only and infallible towards the
/// caller: a failed plant lookup degrades to "no alert determinable"
/// and never undoes the measurement.
pub async fn evaluate(
    conn: &PgPool,
    sensor_id: i32,
    temperature: f64,
    humidity: f64,
) -> AlertResult {
    match plant_model::get_by_sensor(conn, sensor_id).await {
        Ok(Some(plant)) => {
            let envelope = plant.envelope();
            AlertResult {
                temperature: envelope.temperature_alert(temperature),
                humidity: envelope.humidity_alert(humidity),
                plant: Some(plant.name().clone()),
            }
        }
        Ok(None) => AlertResult::default(),
        Err(e) => {
            warn!(sensor_id = sensor_id, "No alert determinable: {}", e);
            AlertResult::default()
        }
    }
}
