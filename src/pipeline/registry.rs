use sqlx::PgPool;
use tracing::info;

use crate::error::DBError;
use crate::models::sensor::{self as sensor_model, SensorDao};

/// Resolves a sensor by its natural key, provisioning it on first
/// sight with default fields (no location, active).
///
/// The observer loop processes messages strictly one at a time, so two
/// in-flight creations for the same name cannot race here. An
/// out-of-band writer still can hit the unique constraint, in which
/// case the failed insert rolls back and the name is re-queried before
/// surfacing the failure.
pub async fn resolve_or_create(conn: &PgPool, name: &str) -> Result<SensorDao, DBError> {
    if let Some(sensor) = sensor_model::get_by_name(conn, name).await? {
        return Ok(sensor);
    }

    match sensor_model::insert(conn, name).await {
        Ok(sensor) => {
            info!(sensor_id = sensor.id(), name = %name, "Registered new sensor");
            Ok(sensor)
        }
        Err(insert_err) => match sensor_model::get_by_name(conn, name).await? {
            Some(sensor) => Ok(sensor),
            None => Err(insert_err),
        },
    }
}
