use std::sync::Arc;

use warp::Filter;

use super::build_response;
use crate::observer::TelemetryObserver;

pub fn routes(
    observer: &Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    list_plants(observer.clone())
}

/// GET /api/plants
///
/// All plants with their sensor association and threshold ranges
fn list_plants(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "plants"))
        .and_then(|observer: Arc<TelemetryObserver>| async move {
            let resp = observer.plants().await.map(|mut plants| {
                plants
                    .drain(..)
                    .map(dto::PlantDto::from)
                    .collect::<Vec<_>>()
            });
            build_response(resp)
        })
        .boxed()
}

pub mod dto {
    use serde::Serialize;

    use crate::models::plant::PlantOverviewRecord;

    #[derive(Debug, Serialize)]
    pub struct PlantDto {
        pub id: i32,
        pub name: String,
        pub sensor: Option<PlantSensorDto>,
        pub ranges: RangesDto,
    }

    #[derive(Debug, Serialize)]
    pub struct PlantSensorDto {
        pub id: i32,
        pub name: String,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize)]
    pub struct RangesDto {
        pub temp_min: Option<f64>,
        pub temp_max: Option<f64>,
        pub humidity_min: Option<f64>,
        pub humidity_max: Option<f64>,
    }

    impl From<PlantOverviewRecord> for PlantDto {
        fn from(record: PlantOverviewRecord) -> Self {
            let sensor = match (record.sensor_id, record.sensor_name) {
                (Some(id), Some(name)) => Some(PlantSensorDto {
                    id,
                    name,
                    location: record.sensor_location,
                }),
                _ => None,
            };
            PlantDto {
                id: record.id,
                name: record.name,
                sensor,
                ranges: RangesDto {
                    temp_min: record.temp_min,
                    temp_max: record.temp_max,
                    humidity_min: record.humidity_min,
                    humidity_max: record.humidity_max,
                },
            }
        }
    }
}
