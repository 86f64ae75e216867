use std::sync::Arc;

use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::{Filter, Reply};

use crate::error::ObserverError;
use crate::observer::TelemetryObserver;

mod measurement_routes;
mod metric_routes;
mod plant_routes;
mod sensor_routes;

#[derive(Debug, serde::Serialize)]
struct ErrorResponseDto {
    error: String,
}

pub(crate) fn build_response<T: serde::Serialize>(
    resp: Result<T, ObserverError>,
) -> Result<warp::reply::Response, warp::Rejection> {
    match resp {
        Ok(data) => Ok(warp::reply::json(&data).into_response()),
        Err(ObserverError::NotFound(err)) => {
            warn!("{}", err);
            let dto = ErrorResponseDto {
                error: format!("{}", err),
            };
            Ok(warp::reply::with_status(warp::reply::json(&dto), StatusCode::NOT_FOUND)
                .into_response())
        }
        Err(ObserverError::Internal(err)) => {
            error!("{}", err);
            Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

pub async fn dispatch_server(observer: Arc<TelemetryObserver>, port: u16) {
    let routes = metric_routes::routes(&observer)
        .or(sensor_routes::routes(&observer))
        .or(plant_routes::routes(&observer))
        .or(measurement_routes::routes(&observer));

    info!("Starting webserver at 0.0.0.0:{}", port);
    warp::serve(routes).run(([0, 0, 0, 0], port)).await;
}
