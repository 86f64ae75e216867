use chrono::NaiveDateTime;

use crate::error::DBError;
use crate::pipeline::alert::ComfortEnvelope;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct MeasurementDao {
    pub(crate) id: i32,
    pub(crate) sensor_id: i32,
    pub(crate) captured_at: NaiveDateTime,
    pub(crate) temperature: f64,
    pub(crate) humidity: f64,
}

impl MeasurementDao {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn sensor_id(&self) -> i32 {
        self.sensor_id
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }
}

/// Commits one immutable measurement row in its own transaction.
///
/// The capture timestamp is assigned here, never taken from the wire.
/// On any failure the transaction rolls back and no partial row stays
/// visible.
pub async fn insert(
    conn: &sqlx::PgPool,
    sensor_id: i32,
    temperature: f64,
    humidity: f64,
) -> Result<MeasurementDao, DBError> {
    let mut tx = conn.begin().await?;
    let dao = sqlx::query_as::<_, MeasurementDao>(
        r#"INSERT INTO measurements (sensor_id, captured_at, temperature, humidity)
            VALUES ($1, $2, $3, $4) RETURNING *"#,
    )
    .bind(sensor_id)
    .bind(chrono::Utc::now().naive_utc())
    .bind(temperature)
    .bind(humidity)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(dao)
}

/// READ measurements, newest first, returned chronologically.
pub async fn get_recent(
    conn: &sqlx::PgPool,
    sensor_id: Option<i32>,
    limit: i64,
) -> Result<Vec<MeasurementDao>, DBError> {
    let mut rows = if let Some(sensor_id) = sensor_id {
        sqlx::query_as::<_, MeasurementDao>(
            r#"SELECT * FROM measurements WHERE sensor_id = $1
                ORDER BY captured_at DESC LIMIT $2"#,
        )
        .bind(sensor_id)
        .bind(limit)
        .fetch_all(conn)
        .await?
    } else {
        sqlx::query_as::<_, MeasurementDao>(
            "SELECT * FROM measurements ORDER BY captured_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(conn)
        .await?
    };
    rows.reverse();
    Ok(rows)
}

/// Latest measurement of each sensor, joined with its optional plant.
#[derive(sqlx::FromRow, Debug)]
pub struct LatestMeasurementRecord {
    pub(crate) sensor_id: i32,
    pub(crate) sensor_name: String,
    pub(crate) sensor_location: Option<String>,
    pub(crate) captured_at: NaiveDateTime,
    pub(crate) temperature: f64,
    pub(crate) humidity: f64,
    pub(crate) plant_name: Option<String>,
    pub(crate) temp_min: Option<f64>,
    pub(crate) temp_max: Option<f64>,
    pub(crate) humidity_min: Option<f64>,
    pub(crate) humidity_max: Option<f64>,
}

impl LatestMeasurementRecord {
    pub fn envelope(&self) -> ComfortEnvelope {
        ComfortEnvelope {
            temp_min: self.temp_min,
            temp_max: self.temp_max,
            humidity_min: self.humidity_min,
            humidity_max: self.humidity_max,
        }
    }
}

pub async fn get_latest_per_sensor(
    conn: &sqlx::PgPool,
) -> Result<Vec<LatestMeasurementRecord>, DBError> {
    Ok(sqlx::query_as::<_, LatestMeasurementRecord>(
        r#"SELECT s.id as sensor_id, s.name as sensor_name, s.location as sensor_location,
                m.captured_at, m.temperature, m.humidity,
                p.name as plant_name, p.temp_min, p.temp_max, p.humidity_min, p.humidity_max
            FROM sensors s
            JOIN measurements m ON (m.sensor_id = s.id)
            LEFT JOIN plants p ON (p.sensor_id = s.id)
            JOIN (
                SELECT sensor_id, MAX(captured_at) as last_captured
                FROM measurements GROUP BY sensor_id
            ) latest ON (latest.sensor_id = m.sensor_id AND latest.last_captured = m.captured_at)
            ORDER BY s.id ASC"#,
    )
    .fetch_all(conn)
    .await?)
}

/// Count/min/avg/max per dimension.
#[derive(sqlx::FromRow, Debug, Default)]
pub struct StatsRecord {
    pub(crate) total: Option<i64>,
    pub(crate) temperature_avg: Option<f64>,
    pub(crate) temperature_min: Option<f64>,
    pub(crate) temperature_max: Option<f64>,
    pub(crate) humidity_avg: Option<f64>,
    pub(crate) humidity_min: Option<f64>,
    pub(crate) humidity_max: Option<f64>,
}

impl StatsRecord {
    pub fn total(&self) -> i64 {
        self.total.unwrap_or(0)
    }
}

const STATS_COLUMNS: &str = r#"count(id) as total,
    AVG(temperature) as temperature_avg, MIN(temperature) as temperature_min, MAX(temperature) as temperature_max,
    AVG(humidity) as humidity_avg, MIN(humidity) as humidity_min, MAX(humidity) as humidity_max"#;

pub async fn get_stats(conn: &sqlx::PgPool) -> Result<StatsRecord, DBError> {
    Ok(
        sqlx::query_as::<_, StatsRecord>(&format!("SELECT {} FROM measurements", STATS_COLUMNS))
            .fetch_one(conn)
            .await?,
    )
}

pub async fn get_sensor_stats(
    conn: &sqlx::PgPool,
    sensor_id: i32,
) -> Result<StatsRecord, DBError> {
    Ok(sqlx::query_as::<_, StatsRecord>(&format!(
        "SELECT {} FROM measurements WHERE sensor_id = $1",
        STATS_COLUMNS
    ))
    .bind(sensor_id)
    .fetch_one(conn)
    .await?)
}
