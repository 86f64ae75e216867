use std::sync::Arc;

use warp::Filter;

use super::build_response;
use crate::observer::TelemetryObserver;

pub fn routes(
    observer: &Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    health(observer.clone())
        .or(sensor_stats(observer.clone()))
        .or(stats(observer.clone()))
}

/// GET /api/health
fn health(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "health"))
        .and_then(|observer: Arc<TelemetryObserver>| async move {
            let ret = dto::HealthyDto {
                healthy: true,
                mqtt_broker: observer.mqtt_broker(),
                database_state: observer.check_db().await,
                sensor_count: observer.sensor_count().await,
            };
            build_response(Ok(ret))
        })
        .boxed()
}

/// GET /api/stats
///
/// System wide counters and min/avg/max per dimension
fn stats(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "stats"))
        .and_then(|observer: Arc<TelemetryObserver>| async move {
            let resp = observer.stats().await.map(dto::StatsDto::from);
            build_response(resp)
        })
        .boxed()
}

/// GET /api/stats/sensor/:id
fn sensor_stats(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "stats" / "sensor" / i32))
        .and_then(|observer: Arc<TelemetryObserver>, sensor_id: i32| async move {
            let resp = observer
                .sensor_stats(sensor_id)
                .await
                .map(dto::SensorStatsDto::from);
            build_response(resp)
        })
        .boxed()
}

pub mod dto {
    use serde::Serialize;

    use crate::models::measurement::StatsRecord;
    use crate::observer::query::{SensorStats, SystemStats};

    #[derive(Debug, Serialize)]
    pub struct HealthyDto {
        pub healthy: bool,
        pub mqtt_broker: Option<String>,
        pub database_state: String,
        pub sensor_count: i64,
    }

    #[derive(Debug, Serialize)]
    pub struct DimensionStatsDto {
        pub avg: Option<f64>,
        pub min: Option<f64>,
        pub max: Option<f64>,
    }

    #[derive(Debug, Serialize)]
    pub struct StatsDto {
        pub active_sensors: i64,
        pub plants: i64,
        pub total_measurements: i64,
        pub temperature: DimensionStatsDto,
        pub humidity: DimensionStatsDto,
    }

    #[derive(Debug, Serialize)]
    pub struct SensorStatsDto {
        pub sensor_id: i32,
        pub sensor_name: String,
        pub plant: Option<String>,
        pub total_measurements: i64,
        pub temperature: DimensionStatsDto,
        pub humidity: DimensionStatsDto,
    }

    fn dimensions(record: &StatsRecord) -> (DimensionStatsDto, DimensionStatsDto) {
        (
            DimensionStatsDto {
                avg: record.temperature_avg,
                min: record.temperature_min,
                max: record.temperature_max,
            },
            DimensionStatsDto {
                avg: record.humidity_avg,
                min: record.humidity_min,
                max: record.humidity_max,
            },
        )
    }

    impl From<SystemStats> for StatsDto {
        fn from(stats: SystemStats) -> Self {
            let (temperature, humidity) = dimensions(&stats.measurements);
            StatsDto {
                active_sensors: stats.active_sensors,
                plants: stats.plants,
                total_measurements: stats.measurements.total(),
                temperature,
                humidity,
            }
        }
    }

    impl From<SensorStats> for SensorStatsDto {
        fn from(stats: SensorStats) -> Self {
            let (temperature, humidity) = dimensions(&stats.measurements);
            SensorStatsDto {
                sensor_id: stats.sensor.id(),
                sensor_name: stats.sensor.name().clone(),
                plant: stats.plant,
                total_measurements: stats.measurements.total(),
                temperature,
                humidity,
            }
        }
    }
}
