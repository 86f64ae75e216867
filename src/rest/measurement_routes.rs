use std::sync::Arc;

use warp::Filter;

use super::build_response;
use crate::observer::TelemetryObserver;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1_000;

pub fn routes(
    observer: &Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    latest_measurements(observer.clone())
        .or(sensor_measurements(observer.clone()))
        .or(list_measurements(observer.clone()))
}

#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
    sensor_id: Option<i32>,
}

impl HistoryQuery {
    pub(crate) fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// GET /api/measurements?limit=&sensor_id=
///
/// Measurement history, chronological, newest `limit` rows
fn list_measurements(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "measurements"))
        .and(warp::query::<HistoryQuery>())
        .and_then(
            |observer: Arc<TelemetryObserver>, query: HistoryQuery| async move {
                let resp = observer
                    .measurements(query.sensor_id, query.limit())
                    .await
                    .map(dto::to_measurement_dtos);
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /api/measurements/latest
///
/// Latest measurement per sensor with its plant context and the alert
/// flags recomputed against the comfort envelope
fn latest_measurements(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "measurements" / "latest"))
        .and_then(|observer: Arc<TelemetryObserver>| async move {
            let resp = observer.latest_measurements().await.map(|mut records| {
                records
                    .drain(..)
                    .map(dto::LatestMeasurementDto::from)
                    .collect::<Vec<_>>()
            });
            build_response(resp)
        })
        .boxed()
}

/// GET /api/measurements/sensor/:id?limit=
///
/// History of one sensor, 404 on unknown sensor ids
fn sensor_measurements(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "measurements" / "sensor" / i32))
        .and(warp::query::<HistoryQuery>())
        .and_then(
            |observer: Arc<TelemetryObserver>, sensor_id: i32, query: HistoryQuery| async move {
                let resp = observer
                    .sensor_measurements(sensor_id, query.limit())
                    .await
                    .map(dto::to_measurement_dtos);
                build_response(resp)
            },
        )
        .boxed()
}

pub mod dto {
    use chrono::NaiveDateTime;
    use serde::Serialize;

    use crate::models::measurement::{LatestMeasurementRecord, MeasurementDao};

    #[derive(Debug, Serialize)]
    pub struct MeasurementDto {
        pub sensor_id: i32,
        pub captured_at: NaiveDateTime,
        pub temperature: f64,
        pub humidity: f64,
    }

    pub fn to_measurement_dtos(mut daos: Vec<MeasurementDao>) -> Vec<MeasurementDto> {
        daos.drain(..)
            .map(|m| MeasurementDto {
                sensor_id: m.sensor_id(),
                captured_at: m.captured_at(),
                temperature: m.temperature(),
                humidity: m.humidity(),
            })
            .collect()
    }

    #[derive(Debug, Serialize)]
    pub struct LatestMeasurementDto {
        pub sensor: LatestSensorDto,
        pub plant: Option<LatestPlantDto>,
        pub measurement: LatestReadingDto,
    }

    #[derive(Debug, Serialize)]
    pub struct LatestSensorDto {
        pub id: i32,
        pub name: String,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize)]
    pub struct LatestPlantDto {
        pub name: String,
        pub temp_min: Option<f64>,
        pub temp_max: Option<f64>,
        pub humidity_min: Option<f64>,
        pub humidity_max: Option<f64>,
    }

    #[derive(Debug, Serialize)]
    pub struct LatestReadingDto {
        pub temperature: f64,
        pub humidity: f64,
        pub captured_at: NaiveDateTime,
        pub alert_temperature: bool,
        pub alert_humidity: bool,
    }

    impl From<LatestMeasurementRecord> for LatestMeasurementDto {
        fn from(record: LatestMeasurementRecord) -> Self {
            // same envelope rule as the ingestion path, applied at read time
            let envelope = record.envelope();
            let alert_temperature = envelope.temperature_alert(record.temperature);
            let alert_humidity = envelope.humidity_alert(record.humidity);

            let plant = record.plant_name.map(|name| LatestPlantDto {
                name,
                temp_min: record.temp_min,
                temp_max: record.temp_max,
                humidity_min: record.humidity_min,
                humidity_max: record.humidity_max,
            });

            LatestMeasurementDto {
                sensor: LatestSensorDto {
                    id: record.sensor_id,
                    name: record.sensor_name,
                    location: record.sensor_location,
                },
                plant,
                measurement: LatestReadingDto {
                    temperature: record.temperature,
                    humidity: record.humidity,
                    captured_at: record.captured_at,
                    alert_temperature,
                    alert_humidity,
                },
            }
        }
    }
}
