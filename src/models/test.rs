//! Database CRUD tests, run with `cargo test -- --ignored` against a
//! postgres reachable through DATABASE_URL.

use super::measurement;
use super::plant;
use super::sensor;

async fn test_conn() -> sqlx::PgPool {
    dotenv::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let conn = sqlx::postgres::PgPoolOptions::new()
        .connect(&database_url)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&conn).await.unwrap();
    conn
}

fn unique_name(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap()
    )
}

#[tokio::test]
#[ignore]
async fn crud_sensors() {
    let conn = test_conn().await;
    let name = unique_name("crud");

    // create
    let created = sensor::insert(&conn, &name).await.unwrap();
    assert_eq!(&name, created.name());
    assert!(created.active());
    assert!(created.location().is_none());

    // read
    let resolved = sensor::get_by_name(&conn, &name).await.unwrap().unwrap();
    assert_eq!(created.id(), resolved.id());
    assert!(!sensor::read(&conn).await.unwrap().is_empty());

    // duplicate names must violate the unique constraint
    assert!(sensor::insert(&conn, &name).await.is_err());

    // delete
    sensor::delete(&conn, created.id()).await.unwrap();
    assert!(sensor::get_by_name(&conn, &name).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn crud_measurements() {
    let conn = test_conn().await;
    let sensor = sensor::insert(&conn, &unique_name("data")).await.unwrap();

    // create
    let first = measurement::insert(&conn, sensor.id(), 21.5, 55.0)
        .await
        .unwrap();
    let second = measurement::insert(&conn, sensor.id(), 22.0, 54.0)
        .await
        .unwrap();
    assert!(first.captured_at() <= second.captured_at());

    // read, chronological order
    let rows = measurement::get_recent(&conn, Some(sensor.id()), 100)
        .await
        .unwrap();
    assert_eq!(2, rows.len());
    assert_eq!(21.5, rows[0].temperature());
    assert_eq!(22.0, rows[1].temperature());

    // stats
    let stats = measurement::get_sensor_stats(&conn, sensor.id())
        .await
        .unwrap();
    assert_eq!(2, stats.total());
    assert_eq!(Some(21.5), stats.temperature_min);
    assert_eq!(Some(22.0), stats.temperature_max);

    sensor::delete(&conn, sensor.id()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn read_latest_per_sensor() {
    let conn = test_conn().await;
    let sensor = sensor::insert(&conn, &unique_name("latest")).await.unwrap();
    measurement::insert(&conn, sensor.id(), 20.0, 50.0)
        .await
        .unwrap();
    measurement::insert(&conn, sensor.id(), 23.0, 52.0)
        .await
        .unwrap();

    let latest = measurement::get_latest_per_sensor(&conn).await.unwrap();
    let row = latest
        .iter()
        .find(|r| r.sensor_id == sensor.id())
        .expect("sensor missing from latest overview");
    assert_eq!(23.0, row.temperature);
    assert!(row.plant_name.is_none());

    sensor::delete(&conn, sensor.id()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn read_plants_with_sensor() {
    let conn = test_conn().await;
    let sensor = sensor::insert(&conn, &unique_name("plant")).await.unwrap();
    sqlx::query(
        r#"INSERT INTO plants (name, sensor_id, temp_min, temp_max)
            VALUES ($1, $2, 18.0, 28.0)"#,
    )
    .bind("Mint")
    .bind(sensor.id())
    .execute(&conn)
    .await
    .unwrap();

    let resolved = plant::get_by_sensor(&conn, sensor.id()).await.unwrap().unwrap();
    assert_eq!("Mint", resolved.name());
    let envelope = resolved.envelope();
    assert_eq!(Some(18.0), envelope.temp_min);
    assert_eq!(None, envelope.humidity_min);

    let overview = plant::read(&conn).await.unwrap();
    let row = overview
        .iter()
        .find(|p| p.sensor_id == Some(sensor.id()))
        .expect("plant missing from overview");
    assert_eq!(sensor.name(), row.sensor_name.as_ref().unwrap());

    sqlx::query("DELETE FROM plants WHERE sensor_id = $1")
        .bind(sensor.id())
        .execute(&conn)
        .await
        .unwrap();
    sensor::delete(&conn, sensor.id()).await.unwrap();
}
