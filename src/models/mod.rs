use std::time::Duration;

use crate::config::Config;
use crate::error::DBError;

pub async fn establish_db_connection(config: &Config) -> Option<sqlx::PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        // a stuck query must fail instead of stalling the message loop
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .ok()
}

pub async fn check_schema(conn: &sqlx::PgPool) -> Result<(), DBError> {
    sqlx::query("SELECT count(*) FROM sensors")
        .fetch_one(conn)
        .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
pub(crate) struct CountRecord {
    pub count: Option<i64>,
}

impl CountRecord {
    pub fn count(self) -> i64 {
        self.count.unwrap_or(0)
    }
}

pub mod measurement;
pub mod plant;
pub mod sensor;

#[cfg(test)]
mod test;
