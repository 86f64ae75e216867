use super::TelemetryObserver;
use crate::error::ObserverError;
use crate::models::{
    self,
    measurement::{self as measurement_model, LatestMeasurementRecord, MeasurementDao, StatsRecord},
    plant::{self as plant_model, PlantOverviewRecord},
    sensor::{self as sensor_model, SensorDao},
};

/// System-wide counters plus per-dimension measurement statistics.
pub struct SystemStats {
    pub active_sensors: i64,
    pub plants: i64,
    pub measurements: StatsRecord,
}

pub struct SensorStats {
    pub sensor: SensorDao,
    pub plant: Option<String>,
    pub measurements: StatsRecord,
}

/// Read side consumed by the REST routes. Everything here is a plain
/// query over the same pool the ingestion path writes through.
impl TelemetryObserver {
    pub fn mqtt_broker(&self) -> Option<String> {
        self.mqtt_client.broker()
    }

    pub async fn check_db(&self) -> String {
        match models::check_schema(&self.db_conn).await {
            Ok(_) => "ok".to_owned(),
            Err(e) => format!("error: {}", e),
        }
    }

    pub async fn sensor_count(&self) -> i64 {
        sensor_model::count(&self.db_conn).await.unwrap_or(0)
    }

    pub async fn sensors(&self) -> Result<Vec<SensorDao>, ObserverError> {
        Ok(sensor_model::read(&self.db_conn).await?)
    }

    pub async fn plants(&self) -> Result<Vec<PlantOverviewRecord>, ObserverError> {
        Ok(plant_model::read(&self.db_conn).await?)
    }

    pub async fn measurements(
        &self,
        sensor_id: Option<i32>,
        limit: i64,
    ) -> Result<Vec<MeasurementDao>, ObserverError> {
        Ok(measurement_model::get_recent(&self.db_conn, sensor_id, limit).await?)
    }

    pub async fn sensor_measurements(
        &self,
        sensor_id: i32,
        limit: i64,
    ) -> Result<Vec<MeasurementDao>, ObserverError> {
        // surfaces SensorNotFound for unknown ids
        sensor_model::get(&self.db_conn, sensor_id).await?;
        Ok(measurement_model::get_recent(&self.db_conn, Some(sensor_id), limit).await?)
    }

    pub async fn latest_measurements(
        &self,
    ) -> Result<Vec<LatestMeasurementRecord>, ObserverError> {
        Ok(measurement_model::get_latest_per_sensor(&self.db_conn).await?)
    }

    pub async fn stats(&self) -> Result<SystemStats, ObserverError> {
        let active_sensors = sensor_model::count_active(&self.db_conn).await?;
        let plants = plant_model::count(&self.db_conn).await?;
        let measurements = measurement_model::get_stats(&self.db_conn).await?;
        Ok(SystemStats {
            active_sensors,
            plants,
            measurements,
        })
    }

    pub async fn sensor_stats(&self, sensor_id: i32) -> Result<SensorStats, ObserverError> {
        let sensor = sensor_model::get(&self.db_conn, sensor_id).await?;
        let plant = plant_model::get_by_sensor(&self.db_conn, sensor_id).await?;
        let measurements = measurement_model::get_sensor_stats(&self.db_conn, sensor_id).await?;
        Ok(SensorStats {
            sensor,
            plant: plant.map(|p| p.name().clone()),
            measurements,
        })
    }
}
