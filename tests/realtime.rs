mod common;

use futures::{Stream, StreamExt};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use barq_motors::entities::message::SenderType;
use barq_motors::error::ServiceError;
use barq_motors::realtime::{subscribe_to_messages, MessageHub};
use barq_motors::services::{
    content::MessageContent,
    customers::{self, NewCustomer},
    messages::{self, MessageFilter, MessageView, NewMessage},
    orders::{self, NewOrder},
};

use common::test_db;

/// Creates a customer with one order and returns `(customer_id, order_id)`.
async fn open_thread(db: &DatabaseConnection) -> (i32, i32) {
    let customer = customers::create_customer(
        db,
        NewCustomer {
            name: "Sahar Ahmadi".to_string(),
            phone: "799000111".to_string(),
            country_code: "+93".to_string(),
            location: "Herat".to_string(),
            lat: None,
            lng: None,
        },
    )
    .await
    .unwrap();
    let order = orders::create_order(
        db,
        NewOrder {
            customer_id: customer.id,
            product_id: None,
            product_name: "Barq S1".to_string(),
            quantity: 1,
            total_price: 1500.0,
            color: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    (customer.id, order.id)
}

async fn say(db: &DatabaseConnection, customer_id: i32, order_id: i32, body: &str) -> MessageView {
    messages::send_message(
        db,
        NewMessage {
            customer_id,
            order_id: Some(order_id),
            sender_type: SenderType::Customer,
            content: MessageContent::Text {
                body: body.to_string(),
            },
        },
    )
    .await
    .unwrap()
}

async fn next_id<S>(feed: &mut S) -> i32
where
    S: Stream<Item = Result<MessageView, ServiceError>> + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), feed.next())
        .await
        .expect("Timed out waiting for a message")
        .expect("Feed ended")
        .unwrap()
        .id
}

async fn assert_quiet<S>(feed: &mut S)
where
    S: Stream<Item = Result<MessageView, ServiceError>> + Unpin,
{
    let extra = tokio::time::timeout(Duration::from_millis(200), feed.next()).await;
    assert!(extra.is_err(), "unexpected extra message");
}

#[tokio::test]
async fn test_out_of_order_publishes_deliver_every_message() {
    let db = Arc::new(test_db().await);
    let hub = MessageHub::new();
    let (customer_id, order_id) = open_thread(&db).await;
    let first = say(&db, customer_id, order_id, "Salam").await;

    let mut feed = Box::pin(subscribe_to_messages(
        db.clone(),
        &hub,
        MessageFilter::order(order_id),
        0,
    ));
    assert_eq!(next_id(&mut feed).await, first.id);

    let second = say(&db, customer_id, order_id, "Is it in stock?").await;
    let third = say(&db, customer_id, order_id, "In red?").await;
    hub.publish(third.clone());
    hub.publish(second.clone());

    assert_eq!(next_id(&mut feed).await, second.id);
    assert_eq!(next_id(&mut feed).await, third.id);
    assert_quiet(&mut feed).await;
}

#[tokio::test]
async fn test_lagging_subscriber_catches_up_from_the_database() {
    let db = Arc::new(test_db().await);
    let hub = MessageHub::with_capacity(1);
    let (customer_id, order_id) = open_thread(&db).await;
    let first = say(&db, customer_id, order_id, "Salam").await;

    let mut feed = Box::pin(subscribe_to_messages(
        db.clone(),
        &hub,
        MessageFilter::order(order_id),
        0,
    ));
    assert_eq!(next_id(&mut feed).await, first.id);

    let mut expected = Vec::new();
    for n in 0..4 {
        let message = say(&db, customer_id, order_id, &format!("message {n}")).await;
        expected.push(message.id);
        hub.publish(message);
    }

    let mut received = Vec::new();
    for _ in 0..expected.len() {
        received.push(next_id(&mut feed).await);
    }
    assert_eq!(received, expected);
    assert_quiet(&mut feed).await;
}

#[tokio::test]
async fn test_dropping_the_feed_releases_its_topic() {
    let db = Arc::new(test_db().await);
    let hub = MessageHub::new();
    let (_, order_id) = open_thread(&db).await;

    let feed = subscribe_to_messages(db.clone(), &hub, MessageFilter::order(order_id), 0);
    assert_eq!(hub.topic_count(), 1);

    drop(feed);
    assert_eq!(hub.topic_count(), 0);
}
