use crate::error::DBError;
use crate::pipeline::alert::ComfortEnvelope;

/// A monitored plant with its optional comfort envelope.
///
/// Plants are managed out-of-band by administration; the ingestion
/// path only ever reads them.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PlantDao {
    pub(crate) name: String,
    pub(crate) temp_min: Option<f64>,
    pub(crate) temp_max: Option<f64>,
    pub(crate) humidity_min: Option<f64>,
    pub(crate) humidity_max: Option<f64>,
}

impl PlantDao {
    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn envelope(&self) -> ComfortEnvelope {
        ComfortEnvelope {
            temp_min: self.temp_min,
            temp_max: self.temp_max,
            humidity_min: self.humidity_min,
            humidity_max: self.humidity_max,
        }
    }
}

/// Plant joined with its sensor, for the read-side overview.
#[derive(sqlx::FromRow, Debug)]
pub struct PlantOverviewRecord {
    pub(crate) id: i32,
    pub(crate) name: String,
    pub(crate) sensor_id: Option<i32>,
    pub(crate) sensor_name: Option<String>,
    pub(crate) sensor_location: Option<String>,
    pub(crate) temp_min: Option<f64>,
    pub(crate) temp_max: Option<f64>,
    pub(crate) humidity_min: Option<f64>,
    pub(crate) humidity_max: Option<f64>,
}

/// The plant associated with a sensor, zero or one.
pub async fn get_by_sensor(
    conn: &sqlx::PgPool,
    sensor_id: i32,
) -> Result<Option<PlantDao>, DBError> {
    Ok(
        sqlx::query_as::<_, PlantDao>("SELECT * FROM plants WHERE sensor_id = $1 LIMIT 1")
            .bind(sensor_id)
            .fetch_optional(conn)
            .await?,
    )
}

/// READ plants
pub async fn read(conn: &sqlx::PgPool) -> Result<Vec<PlantOverviewRecord>, DBError> {
    Ok(sqlx::query_as::<_, PlantOverviewRecord>(
        r#"SELECT p.id, p.name, p.sensor_id, s.name as sensor_name, s.location as sensor_location,
                p.temp_min, p.temp_max, p.humidity_min, p.humidity_max
            FROM plants p
            LEFT JOIN sensors s ON (p.sensor_id = s.id)
            ORDER BY p.id ASC"#,
    )
    .fetch_all(conn)
    .await?)
}

pub async fn count(conn: &sqlx::PgPool) -> Result<i64, DBError> {
    let record =
        sqlx::query_as::<_, super::CountRecord>("SELECT count(*) as count FROM plants")
            .fetch_one(conn)
            .await?;
    Ok(record.count())
}
