//! Notification channel over a real socket

mod common;

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use common::{TestApp, admin, company, customer, test_app, token};
use shared::channel::{ClientEvent, Registration, ServerEvent};
use shared::order::UpdateOrderRequest;
use shared::{Identity, NotificationType, OrderStatus};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(2);

async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, identity: &Identity) -> Socket {
    let url = format!("ws://{addr}/ws?token={}", token(identity));
    let (socket, _) = connect_async(url).await.unwrap();
    socket
}

async fn next_event(socket: &mut Socket) -> ServerEvent {
    loop {
        let frame = timeout(WAIT, socket.next())
            .await
            .expect("timed out waiting for a frame")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn register(socket: &mut Socket, registration: Registration) -> ServerEvent {
    let frame = serde_json::to_string(&ClientEvent::Register(registration)).unwrap();
    socket.send(Message::Text(frame.into())).await.unwrap();
    next_event(socket).await
}

#[tokio::test]
async fn connect_register_and_receive_confirmation() {
    let app = test_app();
    app.seed("o-1", OrderStatus::Pending).await;
    let addr = serve(&app).await;

    let mut socket = connect(addr, &customer()).await;
    assert!(matches!(next_event(&mut socket).await, ServerEvent::Connected(_)));
    assert_eq!(
        register(&mut socket, customer().into()).await,
        ServerEvent::Registered(customer().into())
    );
    // registering twice is harmless
    assert!(matches!(
        register(&mut socket, customer().into()).await,
        ServerEvent::Registered(_)
    ));

    let req = UpdateOrderRequest {
        status: Some(OrderStatus::Confirmed),
        confirmed_date: Some("2025-06-01".parse().unwrap()),
        ..Default::default()
    };
    let mutation = app.state.orders.update(&company(), "o-1", req).await.unwrap();
    mutation.effects.unwrap().await.unwrap();

    match next_event(&mut socket).await {
        ServerEvent::Notification(n) => {
            assert_eq!(n.kind, NotificationType::OrderConfirmed);
            assert_eq!(n.order_id, "o-1");
        }
        other => panic!("expected notification, got {other:?}"),
    }
}

#[tokio::test]
async fn unregistered_connection_receives_nothing() {
    let app = test_app();
    app.seed("o-1", OrderStatus::Pending).await;
    let addr = serve(&app).await;

    let mut socket = connect(addr, &customer()).await;
    assert!(matches!(next_event(&mut socket).await, ServerEvent::Connected(_)));

    let mutation = app.state.orders.delete(&customer(), "o-1").await.unwrap();
    let report = mutation.effects.unwrap().await.unwrap();
    assert_eq!(report.failed, 0);

    assert!(timeout(Duration::from_millis(200), socket.next()).await.is_err());
}

#[tokio::test]
async fn admin_connection_receives_mirror() {
    let app = test_app();
    app.seed("o-1", OrderStatus::Pending).await;
    let addr = serve(&app).await;

    let mut socket = connect(addr, &admin()).await;
    next_event(&mut socket).await;
    register(&mut socket, admin().into()).await;

    let mutation = app.state.orders.delete(&customer(), "o-1").await.unwrap();
    mutation.effects.unwrap().await.unwrap();

    match next_event(&mut socket).await {
        ServerEvent::Notification(n) => assert_eq!(n.kind, NotificationType::OrderCancelled),
        other => panic!("expected notification, got {other:?}"),
    }
}

#[tokio::test]
async fn registration_must_match_token() {
    let app = test_app();
    let addr = serve(&app).await;

    let mut socket = connect(addr, &customer()).await;
    next_event(&mut socket).await;

    let reply = register(&mut socket, Identity::new("cust-1", shared::Role::Admin).into()).await;
    assert!(matches!(reply, ServerEvent::Error(_)));
    assert!(!app.state.hub.is_online(&customer()));
}

#[tokio::test]
async fn disconnect_unregisters_identity() {
    let app = test_app();
    let addr = serve(&app).await;

    let mut socket = connect(addr, &customer()).await;
    next_event(&mut socket).await;
    register(&mut socket, customer().into()).await;
    assert!(app.state.hub.is_online(&customer()));

    socket.close(None).await.unwrap();
    drop(socket);

    let hub = app.state.hub.clone();
    timeout(WAIT, async move {
        while hub.is_online(&customer()) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn bad_token_is_refused() {
    let app = test_app();
    let addr = serve(&app).await;
    let url = format!("ws://{addr}/ws?token=not-a-jwt");
    assert!(connect_async(url).await.is_err());
}
