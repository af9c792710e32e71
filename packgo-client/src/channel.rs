//! Notification channel client
//!
//! 1. Connect WebSocket (`?token=` on the upgrade request)
//! 2. Wait for `connected`, then register the configured identity
//! 3. Forward every `notification` frame to the consumer
//! 4. Reconnect with exponential backoff on disconnect and register again
//!
//! Delivery is at-most-once: events emitted while disconnected are lost.
//! [`ConnectionState`] tells the UI when that may be happening.

use futures::{SinkExt, StreamExt};
use shared::Notification;
use shared::channel::{ClientEvent, Registration, ServerEvent};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::ChannelConfig;
use crate::error::{ChannelError, ChannelResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Exponential backoff with an optional attempt budget
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    /// 0 means unlimited
    max_attempts: u32,
    attempts: u32,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            initial,
            max,
            max_attempts,
            attempts: 0,
            current: initial,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(
            config.reconnect_delay,
            config.max_reconnect_delay,
            config.max_reconnect_attempts,
        )
    }

    /// Delay before the next attempt, or `None` once the budget is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.max_attempts != 0 && self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current = self.initial;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Observable channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    /// Transport is up but the identity is not registered yet
    Connected,
    /// Notifications are being delivered
    Registered,
    /// Waiting to reconnect; events may be missed
    Disconnected,
    /// Reconnect budget spent, the channel has stopped
    Exhausted,
    /// Server refused the registration, the channel has stopped
    Rejected,
}

enum SessionEnd {
    Disconnected,
    Rejected(String),
    Shutdown,
    ConsumerGone,
}

pub struct NotificationChannel {
    config: ChannelConfig,
    state_tx: watch::Sender<ConnectionState>,
}

impl NotificationChannel {
    pub fn new(config: ChannelConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self { config, state_tx }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Subscribe to connection state changes
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    /// Main run loop: connect, register, forward, reconnect
    ///
    /// Returns `Ok(())` on shutdown or when `events` has no receiver left,
    /// [`ChannelError::Rejected`] when the server refuses the registration
    /// and [`ChannelError::ReconnectExhausted`] once the backoff budget is spent.
    pub async fn run(
        &self,
        events: mpsc::Sender<Notification>,
        shutdown: CancellationToken,
    ) -> ChannelResult<()> {
        let mut backoff = Backoff::from_config(&self.config);
        let endpoint = self.config.endpoint();
        tracing::info!(identity = %self.config.identity, url = %self.config.url, "Notification channel started");

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            self.set_state(ConnectionState::Connecting);
            let connected = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = tokio_tungstenite::connect_async(endpoint.as_str()) => result,
            };

            match connected {
                Ok((ws, _response)) => {
                    match self.run_session(ws, &events, &shutdown, &mut backoff).await {
                        SessionEnd::Disconnected => {}
                        SessionEnd::Shutdown | SessionEnd::ConsumerGone => break,
                        SessionEnd::Rejected(reason) => {
                            self.set_state(ConnectionState::Rejected);
                            tracing::error!("Channel registration rejected: {reason}");
                            return Err(ChannelError::Rejected(reason));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(attempts = backoff.attempts(), "Channel connect failed: {e}");
                }
            }

            self.set_state(ConnectionState::Disconnected);
            let Some(delay) = backoff.next_delay() else {
                self.set_state(ConnectionState::Exhausted);
                tracing::error!(
                    attempts = backoff.attempts(),
                    "Notification channel gave up reconnecting"
                );
                return Err(ChannelError::ReconnectExhausted(backoff.attempts()));
            };
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Reconnecting");

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {},
            }
        }

        self.set_state(ConnectionState::Disconnected);
        tracing::info!("Notification channel stopped");
        Ok(())
    }

    /// Run a single WebSocket session until disconnect or shutdown
    async fn run_session(
        &self,
        ws: WsStream,
        events: &mpsc::Sender<Notification>,
        shutdown: &CancellationToken,
        backoff: &mut Backoff,
    ) -> SessionEnd {
        let (mut ws_sink, mut ws_stream) = ws.split();
        self.set_state(ConnectionState::Connected);
        let mut registered = false;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = ws_sink.close().await;
                    return SessionEnd::Shutdown;
                }

                msg = ws_stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let event: ServerEvent = match serde_json::from_str(&text) {
                                Ok(event) => event,
                                Err(e) => {
                                    tracing::warn!("Invalid channel frame: {e}");
                                    continue;
                                }
                            };
                            match event {
                                ServerEvent::Connected(info) => {
                                    tracing::debug!(connection_id = %info.connection_id, "Channel connected");
                                    let registration: Registration = self.config.identity.clone().into();
                                    if let Err(e) = send_event(&mut ws_sink, &ClientEvent::Register(registration)).await {
                                        tracing::warn!("Register failed: {e}");
                                        return SessionEnd::Disconnected;
                                    }
                                }
                                ServerEvent::Registered(registration) => {
                                    tracing::info!(account_id = %registration.account_id, role = %registration.role, "Channel registered");
                                    registered = true;
                                    backoff.reset();
                                    self.set_state(ConnectionState::Registered);
                                }
                                ServerEvent::Notification(notification) => {
                                    if events.send(notification).await.is_err() {
                                        tracing::info!("Notification consumer dropped, closing channel");
                                        let _ = ws_sink.close().await;
                                        return SessionEnd::ConsumerGone;
                                    }
                                }
                                ServerEvent::Error(fault) if !registered => {
                                    let _ = ws_sink.close().await;
                                    return SessionEnd::Rejected(fault.message);
                                }
                                ServerEvent::Error(fault) => {
                                    tracing::warn!("Channel error from server: {}", fault.message);
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_sink.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Channel closed by server");
                            return SessionEnd::Disconnected;
                        }
                        Some(Err(e)) => {
                            tracing::warn!("Channel error: {e}");
                            return SessionEnd::Disconnected;
                        }
                        None => {
                            tracing::info!("Channel stream ended");
                            return SessionEnd::Disconnected;
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

async fn send_event<S>(ws_sink: &mut S, event: &ClientEvent) -> ChannelResult<()>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(event)?;
    ws_sink.send(Message::Text(json.into())).await?;
    Ok(())
}
