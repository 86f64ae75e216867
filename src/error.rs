use std::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DBError {
    #[error(transparent)]
    SQLError(#[from] sqlx::Error),
    #[error("Did not find sensor: {0}")]
    SensorNotFound(i32),
}

#[derive(Debug, Error)]
pub enum MqttError {
    #[error("Send failed: {0}")]
    Send(#[from] rumqttc::ClientError),
    #[error("Observer channel closed")]
    Channel(),
}

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("No delimiter splits payload into 4 fields: {0:?}")]
    FieldCount(String),
    #[error("Invalid {field} value: {value:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },
    #[error("Empty sensor name: {0:?}")]
    EmptyName(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Non-finite {field}: {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Per-message failure taxonomy of the ingestion pipeline.
///
/// Every variant is recovered locally by the observer loop: the message
/// gets logged and dropped, the loop keeps consuming.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Sensor resolution failed: {0}")]
    Registry(#[source] DBError),
    #[error("Persisting measurement failed: {0}")]
    Persistence(#[source] DBError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub enum ObserverError {
    NotFound(Box<dyn error::Error + Send + Sync>),
    Internal(Box<dyn error::Error + Send + Sync>),
}

impl From<DBError> for ObserverError {
    fn from(err: DBError) -> Self {
        match err {
            DBError::SensorNotFound(_) => ObserverError::NotFound(Box::from(err)),
            DBError::SQLError(_) => ObserverError::Internal(Box::from(err)),
        }
    }
}

impl From<MqttError> for ObserverError {
    fn from(err: MqttError) -> Self {
        ObserverError::Internal(Box::from(err))
    }
}
