use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, Publish, QoS};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::MqttError;
use crate::observer::{TelemetryEvent, TelemetrySender};


/// MQTT transport wrapper around rumqttc.
///
/// Owns the broker connection, keeps the channel subscription alive
/// across reconnects and forwards every inbound publish to the
/// observer loop. Reconnect backoff itself is left to rumqttc, this
/// client only keeps polling.
pub struct MqttTelemetryClient {
    inner: Arc<MqttClientInner>,
}

struct MqttClientInner {
    cli: AsyncClient,
    event_loop: Mutex<Option<EventLoop>>,
    broker: String,
    topic: String,
    is_connected: AtomicBool,
    ever_connected: AtomicBool,
    sender: TelemetrySender,
}

impl MqttTelemetryClient {
    pub fn new(config: &Config, sender: TelemetrySender) -> Self {
        let mut options =
            MqttOptions::new(&config.mqtt_client_id, &config.mqtt_host, config.mqtt_port);
        options.set_keep_alive(Duration::from_secs(5));
        let (cli, event_loop) = AsyncClient::new(options, 16);

        MqttTelemetryClient {
            inner: Arc::new(MqttClientInner {
                cli,
                event_loop: Mutex::new(Some(event_loop)),
                broker: config.broker_addr(),
                topic: config.mqtt_topic.clone(),
                is_connected: AtomicBool::new(false),
                ever_connected: AtomicBool::new(false),
                sender,
            }),
        }
    }

    /// Spawns the event loop task. Idempotent, the second call is a
    /// logged no-op.
    pub async fn connect(&self) {
        let event_loop_opt = self.inner.event_loop.lock().unwrap().take();
        let Some(mut event_loop) = event_loop_opt else {
            warn!("MQTT event loop already dispatched");
            return;
        };

        let inner = self.inner.clone();
        info!(broker = %inner.broker, "Connecting to MQTT broker");
        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => inner.on_connected().await,
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        debug!(topic = %publish.topic, "Received {} payload bytes", publish.payload.len());
                        if let Err(e) = MqttClientInner::forward_publish(&inner.sender, publish) {
                            error!("Failed forwarding message: {}", e);
                        }
                    }
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                        inner.is_connected.store(false, Ordering::Relaxed);
                        info!(broker = %inner.broker, "Disconnected from MQTT broker");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let was_connected = inner.is_connected.swap(false, Ordering::Relaxed);
                        if was_connected {
                            error!(broker = %inner.broker, "Lost MQTT connection: {}", e);
                        } else {
                            warn!(broker = %inner.broker, "Failed connecting MQTT broker: {}", e);
                        }
                        tokio::time::sleep(Duration::from_secs(3)).await;
                    }
                }
            }
            debug!("Ended MQTT event loop task");
        });
    }

    pub fn broker(&self) -> Option<String> {
        if self.inner.is_connected.load(Ordering::Relaxed) {
            Some(self.inner.broker.clone())
        } else {
            None
        }
    }

    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.inner.cli.disconnect().await?;
        Ok(())
    }
}

impl MqttClientInner {
    async fn on_connected(&self) {
        info!(broker = %self.broker, "Connected to MQTT broker");
        self.is_connected.store(true, Ordering::Relaxed);

        if let Err(e) = self.cli.subscribe(&self.topic, QoS::AtLeastOnce).await {
            error!(topic = %self.topic, "Failed subscribing channel: {}", e);
        } else {
            info!(topic = %self.topic, "Subscribed channel");
        }

        if self.ever_connected.swap(true, Ordering::Relaxed) {
            let _ = self.sender.send(TelemetryEvent::Reconnected);
        }
    }

    /// Hands the raw publish over to the observer loop; payload bytes
    /// stay untouched until the decoder sees them.
    fn forward_publish(sender: &TelemetrySender, publish: Publish) -> Result<(), MqttError> {
        sender
            .send(TelemetryEvent::Message {
                topic: publish.topic,
                payload: publish.payload.to_vec(),
            })
            .map_err(|_| MqttError::Channel())
    }
}
