use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::mqtt::MqttTelemetryClient;
use crate::pipeline;

pub mod query;


pub enum TelemetryEvent {
    /// One raw inbound message: subscribed topic plus payload bytes.
    Message { topic: String, payload: Vec<u8> },
    Reconnected,
    Shutdown,
}

pub type TelemetrySender = UnboundedSender<TelemetryEvent>;

/// Owns the transport and the database handle, and drives the
/// per-message ingestion pipeline one message at a time.
pub struct TelemetryObserver {
    pub(crate) mqtt_client: MqttTelemetryClient,
    pub(crate) db_conn: PgPool,
    sender: TelemetrySender,
    receiver: Mutex<UnboundedReceiver<TelemetryEvent>>,
}

impl TelemetryObserver {
    pub fn new(config: &Config, db_conn: PgPool) -> Arc<Self> {
        let (sender, receiver) = unbounded_channel::<TelemetryEvent>();
        let mqtt_client = MqttTelemetryClient::new(config, sender.clone());

        Arc::new(TelemetryObserver {
            mqtt_client,
            db_conn,
            sender,
            receiver: Mutex::new(receiver),
        })
    }

    pub async fn init(&self) {
        self.mqtt_client.connect().await;
    }

    pub fn shutdown_handle(&self) -> TelemetrySender {
        self.sender.clone()
    }

    /// Consumes telemetry events until shutdown.
    ///
    /// Each message runs through the full pipeline before the next one
    /// is taken off the channel; every per-message failure is caught
    /// right here, logged with its payload and dropped. A bad sensor
    /// must never take down monitoring of good sensors.
    ///
    /// Returns whether the loop ended on an explicit shutdown request.
    pub async fn dispatch_receive_loop(self: Arc<TelemetryObserver>) -> bool {
        let receiver_res = self.receiver.try_lock();
        if receiver_res.is_err() {
            error!("dispatch_receive_loop() already called!");
            return false;
        }
        let mut receiver = receiver_res.unwrap();

        info!("Start capturing sensor telemetry");
        while let Some(event) = receiver.recv().await {
            match event {
                TelemetryEvent::Message { topic, payload } => {
                    self.handle_message(&topic, &payload).await;
                }
                TelemetryEvent::Reconnected => {
                    info!("Reconnected to MQTT broker, channel resubscribed");
                }
                TelemetryEvent::Shutdown => {
                    info!("Shutting down telemetry loop");
                    if let Err(e) = self.mqtt_client.disconnect().await {
                        warn!("Failed disconnecting MQTT client: {}", e);
                    }
                    return true;
                }
            }
        }
        error!("Telemetry event channel closed");
        false
    }

    async fn handle_message(&self, topic: &str, payload: &[u8]) {
        match pipeline::process_message(&self.db_conn, topic, payload).await {
            Ok(ingested) => {
                info!(
                    sensor_id = ingested.sensor.id(),
                    sensor = %ingested.sensor.name(),
                    measurement_id = ingested.measurement.id(),
                    "Stored measurement: {:.2} C, {:.2} %",
                    ingested.measurement.temperature(),
                    ingested.measurement.humidity(),
                );
                if ingested.alert.any() {
                    let plant = ingested.alert.plant.as_deref().unwrap_or("unknown");
                    if ingested.alert.temperature {
                        warn!(plant = %plant, "Temperature alert: out of comfort range");
                    }
                    if ingested.alert.humidity {
                        warn!(plant = %plant, "Humidity alert: out of comfort range");
                    }
                }
            }
            Err(e) => {
                warn!(
                    topic = topic,
                    payload = %String::from_utf8_lossy(payload),
                    "Dropped message: {}",
                    e
                );
            }
        }
    }
}

static TERMINATED: AtomicU32 = AtomicU32::new(0);

/// First SIGINT requests a clean shutdown through the observer
/// channel, the second one force kills.
pub fn register_sigint_handler(shutdown: TelemetrySender) {
    ctrlc::set_handler(move || {
        let count = TERMINATED.fetch_add(1, Ordering::Relaxed);
        if count >= 1 {
            info!("Force killing");
            std::process::exit(0);
        }

        info!("Shutdown requested");
        if shutdown.send(TelemetryEvent::Shutdown).is_err() {
            std::process::exit(0);
        }
    })
    .unwrap();
}
