use std::sync::Arc;

use warp::Filter;

use super::build_response;
use crate::observer::TelemetryObserver;

pub fn routes(
    observer: &Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    list_sensors(observer.clone())
}

/// GET /api/sensors
///
/// All registered sensors, auto-provisioned ones included
fn list_sensors(
    observer: Arc<TelemetryObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "sensors"))
        .and_then(|observer: Arc<TelemetryObserver>| async move {
            let resp = observer.sensors().await.map(|mut sensors| {
                sensors
                    .drain(..)
                    .map(|s| dto::SensorDto {
                        id: s.id(),
                        name: s.name().clone(),
                        location: s.location().cloned(),
                        active: s.active(),
                    })
                    .collect::<Vec<_>>()
            });
            build_response(resp)
        })
        .boxed()
}

pub mod dto {
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    pub struct SensorDto {
        pub id: i32,
        pub name: String,
        pub location: Option<String>,
        pub active: bool,
    }
}
