use std::env;

/// Process configuration, loaded once at startup and passed by reference
/// into the observer and webserver. Immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_client_id: String,
    pub mqtt_topic: String,
    pub server_port: u16,
}

impl Config {
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let mqtt_host = env::var("MQTT_HOST").unwrap_or_else(|_| "localhost".to_owned());
        let mqtt_port = env::var("MQTT_PORT")
            .unwrap_or_else(|_| "1883".to_owned())
            .parse()
            .expect("MQTT_PORT must be a port number");
        let mqtt_client_id =
            env::var("MQTT_CLIENT_ID").unwrap_or_else(|_| "jardin-backend".to_owned());
        let mqtt_topic =
            env::var("MQTT_TOPIC").unwrap_or_else(|_| "garden/sensors/data".to_owned());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_owned())
            .parse()
            .expect("SERVER_PORT must be a port number");

        Config {
            database_url,
            mqtt_host,
            mqtt_port,
            mqtt_client_id,
            mqtt_topic,
            server_port,
        }
    }

    pub fn broker_addr(&self) -> String {
        format!("{}:{}", self.mqtt_host, self.mqtt_port)
    }
}
