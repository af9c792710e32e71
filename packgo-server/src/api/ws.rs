//! Notification channel endpoint
//!
//! GET {CHANNEL_PATH}?token=<JWT>
//! Auth: JWT in the query string (browser WebSockets cannot set headers)
//!
//! Protocol:
//! - Server → Client: ServerEvent (Connected, Registered, Notification, Error)
//! - Client → Server: ClientEvent (Register)
//!
//! Nothing is delivered before the client registers. The registration must
//! name the identity the token was issued for.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Duration;

use shared::channel::{ChannelFault, ClientEvent, ConnectionInfo, ServerEvent};
use shared::error::AppError;
use shared::{Identity, Notification};

use crate::auth;
use crate::live::{NotificationHub, Subscription};
use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// GET {CHANNEL_PATH}?token=<JWT>
pub async fn handle_channel_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let token = query.token.ok_or_else(AppError::not_authenticated)?;
    let identity: Identity = auth::verify_token(&token, &state.jwt_secret)?.into();

    Ok(ws.on_upgrade(move |socket| channel_session(socket, state.hub, identity)))
}

async fn channel_session(socket: WebSocket, hub: NotificationHub, identity: Identity) {
    let (mut sink, mut stream) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(
        connection_id = %connection_id,
        account_id = %identity.account_id,
        role = %identity.role,
        "Channel connected"
    );

    let hello = ServerEvent::Connected(ConnectionInfo {
        connection_id: connection_id.clone(),
    });
    if send_event(&mut sink, &hello).await.is_err() {
        return;
    }

    let mut subscription: Option<Subscription> = None;

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            received = next_notification(&mut subscription, &connection_id) => {
                match received {
                    Some(notification) => {
                        if send_event(&mut sink, &ServerEvent::Notification(notification)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(ClientEvent::Register(registration)) => {
                                let requested: Identity = registration.clone().into();
                                if requested != identity {
                                    tracing::warn!(
                                        connection_id = %connection_id,
                                        account_id = %identity.account_id,
                                        requested = %requested,
                                        "Registration does not match session"
                                    );
                                    fault("registration does not match the session token")
                                } else {
                                    if subscription.is_none() {
                                        subscription = Some(hub.register(&identity));
                                        tracing::info!(
                                            connection_id = %connection_id,
                                            account_id = %identity.account_id,
                                            role = %identity.role,
                                            "Channel registered"
                                        );
                                    }
                                    ServerEvent::Registered(registration)
                                }
                            }
                            Err(e) => fault(&format!("unrecognized frame: {e}")),
                        };
                        if send_event(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    drop(subscription);
    hub.unregister(&identity);

    tracing::info!(
        connection_id = %connection_id,
        account_id = %identity.account_id,
        "Channel disconnected"
    );
}

fn fault(message: &str) -> ServerEvent {
    ServerEvent::Error(ChannelFault {
        message: message.to_string(),
    })
}

/// Next notification for a registered connection; pending forever before registration
async fn next_notification(
    subscription: &mut Option<Subscription>,
    connection_id: &str,
) -> Option<Notification> {
    let Some(sub) = subscription.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        let received = match sub.admin.as_mut() {
            Some(admin) => tokio::select! {
                r = sub.personal.recv() => r,
                r = admin.recv() => r,
            },
            None => sub.personal.recv().await,
        };
        match received {
            Ok(notification) => return Some(notification),
            Err(RecvError::Lagged(n)) => {
                tracing::warn!(connection_id, lagged = n, "Channel subscriber lagged, notifications skipped");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

async fn send_event<S>(sink: &mut S, event: &ServerEvent) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
