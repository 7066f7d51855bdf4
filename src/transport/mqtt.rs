use std::time::Duration;

use anyhow::Context;
use log::{debug, warn};
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS,
};
use tokio::time::{sleep, timeout};

use crate::config::BrokerConfig;

use super::adapter::{Transport, TransportEvent};

/// Capacity of the client request queue (subscribe, disconnect).
const REQUEST_CAPACITY: usize = 10;

/// Pause before the event loop retries after losing an
/// established connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on flushing the DISCONNECT packet at shutdown.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// MQTT v3.1.1 transport backed by `rumqttc`.
///
/// The network connection is opened lazily by the event loop on
/// the first `next_event` call; the CONNACK is surfaced as
/// `Connected(code)`.
///
/// Failure handling:
/// - Broker unreachable before the first CONNACK → `Err` (fatal)
/// - Broker refuses the connection → `Connected(code != 0)`
/// - Connection lost after a CONNACK → `Disconnected(1)`, then
///   the event loop reconnects after `RECONNECT_DELAY`
///
pub struct MqttTransport {
    client: AsyncClient,
    eventloop: EventLoop,
    host: String,
    connected: bool,
    ever_connected: bool,
    reconnect_pending: bool,
}

impl MqttTransport {
    pub fn connect(cfg: &BrokerConfig) -> Self {
        let mut options = MqttOptions::new(cfg.client_id.clone(), cfg.host.clone(), cfg.port);
        options.set_keep_alive(Duration::from_secs(cfg.keepalive_secs));

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        Self {
            client,
            eventloop,
            host: format!("{}:{}", cfg.host, cfg.port),
            connected: false,
            ever_connected: false,
            reconnect_pending: false,
        }
    }
}

#[async_trait::async_trait]
impl Transport for MqttTransport {

    fn name(&self) -> &'static str {
        "mqtt"
    }

    async fn subscribe(&mut self, topic: &str) -> anyhow::Result<()> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .with_context(|| format!("failed to subscribe to {}", topic))
    }

    async fn next_event(&mut self) -> anyhow::Result<TransportEvent> {
        loop {
            if self.reconnect_pending {
                sleep(RECONNECT_DELAY).await;
                self.reconnect_pending = false;
            }

            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    self.connected = true;
                    self.ever_connected = true;
                    return Ok(TransportEvent::Connected(return_code(ack.code)));
                }

                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    return Ok(TransportEvent::Message {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    });
                }

                Ok(Event::Incoming(Packet::Disconnect)) => {
                    self.connected = false;
                    self.reconnect_pending = true;
                    return Ok(TransportEvent::Disconnected(1));
                }

                // Acks, pings and outgoing notifications
                Ok(_) => {}

                Err(ConnectionError::ConnectionRefused(code)) => {
                    return Ok(TransportEvent::Connected(return_code(code)));
                }

                Err(e) if !self.ever_connected => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("failed to connect to MQTT broker at {}", self.host)));
                }

                Err(e) => {
                    warn!("[{}] connection error: {}", self.name(), e);
                    self.reconnect_pending = true;

                    if self.connected {
                        self.connected = false;
                        return Ok(TransportEvent::Disconnected(1));
                    }
                }
            }
        }
    }

    async fn disconnect(&mut self) -> anyhow::Result<()> {
        self.client
            .disconnect()
            .await
            .context("failed to request disconnect")?;

        // The request only reaches the broker once the event loop runs.
        let eventloop = &mut self.eventloop;
        let flush = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        };

        let flushed = timeout(DISCONNECT_TIMEOUT, flush).await.is_ok();
        if !flushed {
            debug!("[{}] disconnect flush timed out", self.name());
        }

        self.connected = false;
        Ok(())
    }
}

/// Maps a CONNACK return code to its MQTT 3.1.1 numeric value.
fn return_code(code: ConnectReturnCode) -> u8 {
    match code {
        ConnectReturnCode::Success => 0,
        ConnectReturnCode::RefusedProtocolVersion => 1,
        ConnectReturnCode::BadClientId => 2,
        ConnectReturnCode::ServiceUnavailable => 3,
        ConnectReturnCode::BadUserNamePassword => 4,
        ConnectReturnCode::NotAuthorized => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_codes_follow_mqtt_311() {
        assert_eq!(return_code(ConnectReturnCode::Success), 0);
        assert_eq!(return_code(ConnectReturnCode::BadClientId), 2);
        assert_eq!(return_code(ConnectReturnCode::NotAuthorized), 5);
    }

    #[tokio::test]
    async fn unreachable_broker_is_fatal() {
        let cfg = BrokerConfig {
            host: "127.0.0.1".into(),
            // Reserved port, nothing listens here
            port: 9,
            keepalive_secs: 5,
            client_id: "test".into(),
        };
        let mut transport = MqttTransport::connect(&cfg);

        let err = transport.next_event().await.unwrap_err();
        assert!(err.to_string().contains("failed to connect to MQTT broker"));
    }
}
