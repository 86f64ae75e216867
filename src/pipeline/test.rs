use super::alert::{AlertResult, ComfortEnvelope};
use super::decode::{decode_payload, DecodedReading};
use super::validate::validate;
use crate::error::{DecodeError, ValidationError};

/*
 * Decoder
 */

#[test]
fn test_decode_primary_delimiter() {
    let reading = decode_payload(b"GreenhouseA-X01773374-25.50-60.30").unwrap();
    assert_eq!(
        reading,
        DecodedReading {
            name: "GreenhouseA".to_owned(),
            device_id: "X01773374".to_owned(),
            temperature: 25.5,
            humidity: 60.3,
        }
    );
}

#[test]
fn test_decode_fallback_delimiters() {
    for payload in [
        "GreenhouseA;X01;25.5;60.3",
        "GreenhouseA,X01,25.5,60.3",
        "GreenhouseA X01 25.5 60.3",
    ] {
        let reading = decode_payload(payload.as_bytes()).unwrap();
        assert_eq!("GreenhouseA", reading.name);
        assert_eq!(25.5, reading.temperature);
        assert_eq!(60.3, reading.humidity);
    }
}

#[test]
fn test_decode_comma_decimal_separator() {
    let reading = decode_payload(b"B-X2-19,5-45,2").unwrap();
    assert_eq!(19.5, reading.temperature);
    assert_eq!(45.2, reading.humidity);
}

#[test]
fn test_decode_trims_whitespace() {
    let reading = decode_payload(b"  GreenhouseA-X01-25.5-60.3\r\n").unwrap();
    assert_eq!("GreenhouseA", reading.name);
}

#[test]
fn test_decode_replaces_invalid_utf8() {
    // broken bytes in the device field must not fail the whole payload
    let reading = decode_payload(b"GreenhouseA-\xff\xfe-25.5-60.3").unwrap();
    assert_eq!("GreenhouseA", reading.name);
    assert_eq!(25.5, reading.temperature);
}

#[test]
fn test_decode_field_count_failure() {
    for payload in [&b"garbage"[..], b"", b"A-X1-25.5", b"A-X1-25.5-60.3-extra"] {
        let err = decode_payload(payload).unwrap_err();
        assert!(matches!(err, DecodeError::FieldCount(_)), "{:?}", payload);
    }
}

#[test]
fn test_decode_rejects_empty_name() {
    // a nameless reading must never reach sensor provisioning
    for payload in [&b"-X1-25.5-60.3"[..], b";X1;25.5;60.3", b" -X1-25.5-60.3"] {
        let err = decode_payload(payload).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyName(_)), "{:?}", payload);
    }
}

#[test]
fn test_decode_invalid_number_failure() {
    let err = decode_payload(b"A;X1;warm;60.3").unwrap_err();
    assert_eq!(
        DecodeError::InvalidNumber {
            field: "temperature",
            value: "warm".to_owned(),
        },
        err
    );

    let err = decode_payload(b"A;X1;25.5;wet").unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidNumber {
            field: "humidity",
            ..
        }
    ));
}

#[test]
fn test_decode_is_pure() {
    let payload = b"GreenhouseA-X01-25.5-60.3";
    assert_eq!(decode_payload(payload), decode_payload(payload));
    assert_eq!(decode_payload(b"garbage"), decode_payload(b"garbage"));
}

/*
 * Validator
 */

#[test]
fn test_validate_rejects_non_finite() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            validate(value, 50.0),
            Err(ValidationError::NotFinite {
                field: "temperature",
                ..
            })
        ));
        assert!(matches!(
            validate(20.0, value),
            Err(ValidationError::NotFinite {
                field: "humidity",
                ..
            })
        ));
    }
}

#[test]
fn test_validate_first_rule_wins() {
    // non-finite temperature is reported before the bad humidity
    assert!(matches!(
        validate(f64::NAN, 500.0),
        Err(ValidationError::NotFinite {
            field: "temperature",
            ..
        })
    ));
}

#[test]
fn test_validate_temperature_bounds_inclusive() {
    assert!(validate(-50.0, 50.0).is_ok());
    assert!(validate(0.0, 50.0).is_ok());
    assert!(validate(100.0, 50.0).is_ok());

    for value in [-50.1, 100.1, 999.0] {
        assert!(matches!(
            validate(value, 50.0),
            Err(ValidationError::OutOfRange {
                field: "temperature",
                ..
            })
        ));
    }
}

#[test]
fn test_validate_humidity_bounds_inclusive() {
    assert!(validate(20.0, 0.0).is_ok());
    assert!(validate(20.0, 100.0).is_ok());

    for value in [-0.1, 100.1] {
        assert!(matches!(
            validate(20.0, value),
            Err(ValidationError::OutOfRange {
                field: "humidity",
                ..
            })
        ));
    }
}

/*
 * Comfort envelope
 */

#[test]
fn test_envelope_without_bounds_never_alerts() {
    let envelope = ComfortEnvelope::default();
    assert!(!envelope.temperature_alert(999.0));
    assert!(!envelope.humidity_alert(-10.0));
}

#[test]
fn test_envelope_partial_bounds_never_alert() {
    let envelope = ComfortEnvelope {
        temp_min: Some(18.0),
        ..Default::default()
    };
    assert!(!envelope.temperature_alert(-40.0));
}

#[test]
fn test_envelope_temperature_alert() {
    let envelope = ComfortEnvelope {
        temp_min: Some(18.0),
        temp_max: Some(28.0),
        humidity_min: Some(40.0),
        humidity_max: Some(60.0),
    };
    assert!(envelope.temperature_alert(35.0));
    assert!(!envelope.humidity_alert(50.0));

    // bounds are part of the comfort range
    assert!(!envelope.temperature_alert(18.0));
    assert!(!envelope.temperature_alert(28.0));
    assert!(envelope.temperature_alert(17.9));
}

#[test]
fn test_envelope_dimensions_are_independent() {
    let envelope = ComfortEnvelope {
        temp_min: Some(18.0),
        temp_max: Some(28.0),
        humidity_min: Some(40.0),
        humidity_max: Some(60.0),
    };
    assert!(envelope.temperature_alert(35.0));
    assert!(envelope.humidity_alert(20.0));

    let result = AlertResult {
        plant: Some("Basil".to_owned()),
        temperature: true,
        humidity: true,
    };
    assert!(result.any());
    assert!(!AlertResult::default().any());
}

/*
 * Database backed, run with `cargo test -- --ignored` against a
 * migrated postgres from DATABASE_URL
 */

mod db {
    use super::super::{alert, process_message, registry};
    use crate::error::IngestError;
    use crate::models::measurement as measurement_model;

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

    // underscore separated so the name survives the payload delimiters
    fn unique_name(prefix: &str) -> String {
        format!("{}_{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap())
    }

    #[tokio::test]
    #[ignore]
    async fn test_registry_is_idempotent() {
        let conn = test_conn().await;
        let name = unique_name("registry");

        let first = registry::resolve_or_create(&conn, &name).await.unwrap();
        let second = registry::resolve_or_create(&conn, &name).await.unwrap();
        let third = registry::resolve_or_create(&conn, &name).await.unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(first.id(), third.id());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sensors WHERE name = $1")
            .bind(&name)
            .fetch_one(&conn)
            .await
            .unwrap();
        assert_eq!(1, count.0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_persistence_failure_leaves_no_rows() {
        let conn = test_conn().await;
        let before: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM measurements")
            .fetch_one(&conn)
            .await
            .unwrap();

        // unknown sensor id violates the foreign key
        let result = measurement_model::insert(&conn, -1, 20.0, 50.0).await;
        assert!(result.is_err());

        let after: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM measurements")
            .fetch_one(&conn)
            .await
            .unwrap();
        assert_eq!(before.0, after.0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_alert_for_plant_out_of_range() {
        let conn = test_conn().await;
        let name = unique_name("alerting");
        let sensor = registry::resolve_or_create(&conn, &name).await.unwrap();
        sqlx::query(
            r#"INSERT INTO plants (name, sensor_id, temp_min, temp_max, humidity_min, humidity_max)
                VALUES ($1, $2, 18.0, 28.0, 40.0, 60.0)"#,
        )
        .bind("Basil")
        .bind(sensor.id())
        .execute(&conn)
        .await
        .unwrap();

        let result = alert::evaluate(&conn, sensor.id(), 35.0, 50.0).await;
        assert_eq!(Some("Basil".to_owned()), result.plant);
        assert!(result.temperature);
        assert!(!result.humidity);
    }

    #[tokio::test]
    #[ignore]
    async fn test_process_message_sequence() {
        let conn = test_conn().await;
        let topic = "garden/sensors/data";
        let name_a = unique_name("seq_a");
        let name_b = unique_name("seq_b");

        // one good reading for a fresh sensor
        let first = process_message(&conn, topic, format!("{}-X1-25.5-60.3", name_a).as_bytes())
            .await
            .unwrap();
        assert_eq!(25.5, first.measurement.temperature());
        assert_eq!(60.3, first.measurement.humidity());
        assert!(first.alert.plant.is_none());

        // undecodable
        let second = process_message(&conn, topic, b"garbage").await;
        assert!(matches!(second, Err(IngestError::Decode(_))));

        // implausible temperature
        let third =
            process_message(&conn, topic, format!("{}-X1-999-60.3", name_a).as_bytes()).await;
        assert!(matches!(third, Err(IngestError::Validation(_))));

        // comma decimals, second fresh sensor
        let fourth = process_message(&conn, topic, format!("{}-X2-19,5-45,2", name_b).as_bytes())
            .await
            .unwrap();
        assert_eq!(19.5, fourth.measurement.temperature());
        assert_eq!(45.2, fourth.measurement.humidity());
        assert_ne!(first.sensor.id(), fourth.sensor.id());

        for (name, expected) in [(&name_a, 1i64), (&name_b, 1i64)] {
            let count: (i64,) = sqlx::query_as(
                r#"SELECT COUNT(*) FROM measurements m
                    JOIN sensors s ON (m.sensor_id = s.id) WHERE s.name = $1"#,
            )
            .bind(name)
            .fetch_one(&conn)
            .await
            .unwrap();
            assert_eq!(expected, count.0, "measurements of {}", name);
        }
    }
}
