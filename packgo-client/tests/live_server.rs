//! End to end: packgo-server emits, the client channel delivers into the store

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use packgo_client::{
    ChannelConfig, ConnectionState, MemoryStorage, NotificationCenter, NotificationChannel,
    NotificationStore, StoreConfig,
};
use packgo_server::db::{MemoryAccountDirectory, MemoryOrderRepository, OrderRepository};
use packgo_server::email::LogMailer;
use packgo_server::{AppState, Config, api};
use shared::order::Order;
use shared::{Identity, NotificationTarget, NotificationType, Role};

const SECRET: &str = "client-test-secret";
const WAIT: Duration = Duration::from_secs(3);

fn pending_order() -> Order {
    serde_json::from_value(json!({
        "id": "o-1",
        "customerId": "cust-1",
        "companyId": "comp-1",
        "companyAccountId": "acc-comp-1",
        "origin": { "street": "Hauptstr. 1", "postalCode": "10115", "city": "Berlin", "country": "DE" },
        "destination": { "street": "Marienplatz 2", "postalCode": "80331", "city": "München", "country": "DE" },
        "preferredDates": ["2025-06-01", "2025-06-02"],
        "helpers": 2,
        "estimatedHours": 5,
        "totalPrice": 450.0,
        "status": "pending",
        "createdAt": "2025-05-20T09:00:00Z",
        "updatedAt": "2025-05-20T09:00:00Z"
    }))
    .unwrap()
}

#[tokio::test]
async fn cancellation_reaches_the_customer_store() {
    let repo = MemoryOrderRepository::new();
    repo.insert(&pending_order()).await.unwrap();
    let state = AppState::from_parts(
        Arc::new(repo),
        Arc::new(MemoryAccountDirectory::new()),
        Arc::new(LogMailer),
        SECRET,
    );
    let router = api::create_router(state.clone(), &Config::development(SECRET));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let customer = Identity::new("cust-1", Role::User);
    let token = packgo_server::auth::create_token("cust-1", Role::User, SECRET).unwrap();
    let channel = NotificationChannel::new(ChannelConfig::new(
        format!("ws://{addr}/ws"),
        token,
        customer.clone(),
    ));
    let mut channel_state = channel.state();

    let store = NotificationStore::load(
        MemoryStorage::new(),
        StoreConfig::default(),
        chrono::Utc::now(),
    )
    .unwrap();
    let center = NotificationCenter::new(store);

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(16);
    let channel_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { channel.run(tx, shutdown).await })
    };
    let center_task = {
        let center = center.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { center.run(rx, shutdown).await })
    };

    timeout(WAIT, channel_state.wait_for(|s| *s == ConnectionState::Registered))
        .await
        .unwrap()
        .unwrap();
    assert!(state.hub.is_online(&customer));

    let mutation = state.orders.delete(&customer, "o-1").await.unwrap();
    mutation.effects.unwrap().await.unwrap();

    let store = center.store();
    timeout(WAIT, async {
        while store.lock().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    {
        let store = store.lock();
        let entry = &store.entries()[0];
        assert_eq!(entry.notification.kind, NotificationType::OrderCancelled);
        assert_eq!(entry.notification.target, Some(NotificationTarget::User));
        assert_eq!(entry.notification.order_id, "o-1");
        assert!(!entry.read);
        assert_eq!(store.unread_count(Role::User), 1);
    }

    shutdown.cancel();
    channel_task.await.unwrap().unwrap();
    center_task.await.unwrap();
}
