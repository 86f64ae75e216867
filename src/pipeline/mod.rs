use sqlx::PgPool;
use tracing::debug;

use crate::error::IngestError;
use crate::models::measurement::{self as measurement_model, MeasurementDao};
use crate::models::sensor::SensorDao;

pub mod alert;
pub mod decode;
pub mod registry;
pub mod validate;

#[cfg(test)]
mod test;

/// The result of one fully ingested message.
#[derive(Debug)]
pub struct Ingested {
    pub sensor: SensorDao,
    pub measurement: MeasurementDao,
    pub alert: alert::AlertResult,
}

/// Runs one raw message through decode, validation, sensor resolution,
/// the transactional write and alert evaluation.
///
/// The topic is informational only; the payload carries the sensor
/// name. Each stage failure maps onto one [`IngestError`] variant so
/// the observer loop can log the dropped message with its reason.
/// Alert evaluation runs strictly after the commit and cannot fail the
/// message anymore.
pub async fn process_message(
    conn: &PgPool,
    topic: &str,
    payload: &[u8],
) -> Result<Ingested, IngestError> {
    let reading = decode::decode_payload(payload)?;
    debug!(topic = topic, device_id = %reading.device_id, "Decoded reading: {:?}", reading);

    validate::validate(reading.temperature, reading.humidity)?;

    let sensor = registry::resolve_or_create(conn, &reading.name)
        .await
        .map_err(IngestError::Registry)?;

    let measurement =
        measurement_model::insert(conn, sensor.id(), reading.temperature, reading.humidity)
            .await
            .map_err(IngestError::Persistence)?;

    let alert = alert::evaluate(conn, sensor.id(), reading.temperature, reading.humidity).await;

    Ok(Ingested {
        sensor,
        measurement,
        alert,
    })
}
