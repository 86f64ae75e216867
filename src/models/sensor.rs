use super::CountRecord;
use crate::error::DBError;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SensorDao {
    pub(crate) id: i32,
    pub(crate) name: String,
    pub(crate) location: Option<String>,
    pub(crate) active: bool,
}

impl SensorDao {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn location(&self) -> Option<&String> {
        self.location.as_ref()
    }

    pub fn active(&self) -> bool {
        self.active
    }
}

/// Exact, case-sensitive match on the unique sensor name.
pub async fn get_by_name(conn: &sqlx::PgPool, name: &str) -> Result<Option<SensorDao>, DBError> {
    Ok(
        sqlx::query_as::<_, SensorDao>("SELECT * FROM sensors WHERE name = $1")
            .bind(name)
            .fetch_optional(conn)
            .await?,
    )
}

pub async fn get(conn: &sqlx::PgPool, sensor_id: i32) -> Result<SensorDao, DBError> {
    sqlx::query_as::<_, SensorDao>("SELECT * FROM sensors WHERE id = $1")
        .bind(sensor_id)
        .fetch_optional(conn)
        .await?
        .ok_or(DBError::SensorNotFound(sensor_id))
}

pub async fn insert(conn: &sqlx::PgPool, name: &str) -> Result<SensorDao, DBError> {
    Ok(sqlx::query_as::<_, SensorDao>(
        "INSERT INTO sensors (name, active) VALUES ($1, TRUE) RETURNING *",
    )
    .bind(name)
    .fetch_one(conn)
    .await?)
}

/// READ sensors
pub async fn read(conn: &sqlx::PgPool) -> Result<Vec<SensorDao>, DBError> {
    Ok(
        sqlx::query_as::<_, SensorDao>("SELECT * FROM sensors ORDER BY id ASC")
            .fetch_all(conn)
            .await?,
    )
}

pub async fn count(conn: &sqlx::PgPool) -> Result<i64, DBError> {
    let record =
        sqlx::query_as::<_, CountRecord>("SELECT count(*) as count FROM sensors")
            .fetch_one(conn)
            .await?;
    Ok(record.count())
}

pub async fn count_active(conn: &sqlx::PgPool) -> Result<i64, DBError> {
    let record = sqlx::query_as::<_, CountRecord>(
        "SELECT count(*) as count FROM sensors WHERE active = TRUE",
    )
    .fetch_one(conn)
    .await?;
    Ok(record.count())
}

#[cfg(test)]
pub async fn delete(conn: &sqlx::PgPool, remove_id: i32) -> Result<(), DBError> {
    sqlx::query("DELETE FROM measurements WHERE sensor_id = $1")
        .bind(remove_id)
        .execute(conn)
        .await?;
    sqlx::query("DELETE FROM sensors WHERE id = $1")
        .bind(remove_id)
        .execute(conn)
        .await?;
    Ok(())
}
