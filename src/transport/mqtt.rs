//! MQTT event source backed by `rumqttc`.

use super::{EventSource, InboundMessage, SessionState, forward};
use crate::config::BrokerSettings;
use crate::errors::{AppError, AppResult};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const REQUEST_CAPACITY: usize = 10;
const RECONNECT_PAUSE: Duration = Duration::from_secs(1);

pub struct MqttSource {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
}

impl MqttSource {
    pub fn new(broker: &BrokerSettings) -> Self {
        let mut options = MqttOptions::new(&broker.client_id, &broker.host, broker.port);
        options.set_credentials(&broker.username, &broker.password);
        options.set_keep_alive(Duration::from_secs(broker.keep_alive_secs));

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        Self {
            client,
            eventloop,
            topic: broker.topic.clone(),
        }
    }
}

impl EventSource for MqttSource {
    async fn run(
        mut self,
        session: &mut SessionState,
        tx: mpsc::Sender<InboundMessage>,
        cancel: CancellationToken,
    ) -> AppResult<()> {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                ev = self.eventloop.poll() => ev,
            };

            match event {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    log::info!("Connected to broker (session present: {})", ack.session_present);
                    if session.on_connect(ack.session_present) {
                        self.client
                            .subscribe(&self.topic, QoS::AtMostOnce)
                            .await
                            .map_err(|e| AppError::Transport(e.to_string()))?;
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(_))) => {
                    log::info!("Subscribed to '{}'", self.topic);
                    session.on_subscribed();
                }
                Ok(Event::Incoming(Packet::Publish(p))) => {
                    session.delivered += 1;
                    let msg = InboundMessage {
                        topic: p.topic.clone(),
                        payload: p.payload.to_vec(),
                        retained: p.retain,
                    };
                    // A full channel must not hold up shutdown.
                    if !forward(&tx, msg, &cancel).await {
                        break;
                    }
                }
                Ok(Event::Incoming(Packet::Disconnect)) => session.on_disconnect(),
                Ok(_) => {}
                Err(e) => {
                    session.on_disconnect();
                    log::warn!("MQTT connection error: {}", e);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(RECONNECT_PAUSE) => {}
                    }
                }
            }
        }

        if let Err(e) = self.client.try_disconnect() {
            log::debug!("Disconnect request not queued: {}", e);
        }
        Ok(())
    }
}
