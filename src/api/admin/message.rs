use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::{begin, finish, message_stream, post_message, respond, ApiQuery};
use crate::entities::message::SenderType;
use crate::realtime::MessageHub;
use crate::services::{
    content::ContentInput,
    customers,
    messages::{self, MessageFilter, NewMessage},
    orders,
};

pub fn admin_message_router() -> Router {
    Router::new()
        .route("/messages/conversations", get(get_conversations))
        .route(
            "/messages/orders/:id",
            get(get_order_messages).post(reply_to_order),
        )
        .route("/messages/orders/:id/read", post(mark_order_read))
        .route(
            "/messages/customers/:id",
            get(get_customer_messages).post(reply_to_customer),
        )
        .route("/messages/customers/:id/read", post(mark_customer_read))
        .route("/messages/stream", get(stream_messages))
}

#[derive(Clone, Debug, Deserialize)]
struct ReplyPayload {
    content: ContentInput,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct StreamQuery {
    customer_id: Option<i32>,
    order_id: Option<i32>,
    after: Option<i32>,
}

async fn get_conversations(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(messages::list_conversations(db.as_ref()).await)
}

async fn get_order_messages(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(messages::get_order_messages(db.as_ref(), id).await)
}

async fn reply_to_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(hub): Extension<Arc<MessageHub>>,
    Json(payload): Json<ReplyPayload>,
) -> Response {
    let order = match orders::get_order(db.as_ref(), id).await {
        Ok(order) => order,
        Err(err) => return err.into_response(),
    };

    post_message(
        &db,
        &hub,
        NewMessage {
            customer_id: order.customer_id,
            order_id: Some(order.id),
            sender_type: SenderType::Admin,
            content: payload.content.into(),
        },
    )
    .await
}

/// Marks the customer's messages in the order thread as read.
async fn mark_order_read(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = match orders::get_order(&txn, id).await {
        Ok(_) => messages::mark_read(&txn, &MessageFilter::order(id), SenderType::Admin)
            .await
            .map(|updated| json!({ "updated": updated })),
        Err(err) => Err(err),
    };
    finish(txn, result, StatusCode::OK).await
}

/// Every message of one customer, across orders and general chat.
async fn get_customer_messages(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    if let Err(err) = customers::get_customer(db.as_ref(), id).await {
        return err.into_response();
    }
    let filter = MessageFilter {
        customer_id: Some(id),
        order_id: None,
    };
    respond(messages::get_messages(db.as_ref(), &filter).await)
}

/// Reply outside any order thread.
async fn reply_to_customer(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(hub): Extension<Arc<MessageHub>>,
    Json(payload): Json<ReplyPayload>,
) -> Response {
    post_message(
        &db,
        &hub,
        NewMessage {
            customer_id: id,
            order_id: None,
            sender_type: SenderType::Admin,
            content: payload.content.into(),
        },
    )
    .await
}

async fn mark_customer_read(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let filter = MessageFilter {
        customer_id: Some(id),
        order_id: None,
    };
    let result = match customers::get_customer(&txn, id).await {
        Ok(_) => messages::mark_read(&txn, &filter, SenderType::Admin)
            .await
            .map(|updated| json!({ "updated": updated })),
        Err(err) => Err(err),
    };
    finish(txn, result, StatusCode::OK).await
}

/// Live inbox feed. Without filters it carries every message.
async fn stream_messages(
    ApiQuery(query): ApiQuery<StreamQuery>,
    headers: HeaderMap,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(hub): Extension<Arc<MessageHub>>,
) -> Response {
    let filter = MessageFilter {
        customer_id: query.customer_id,
        order_id: query.order_id,
    };
    message_stream(db, &hub, filter, query.after, &headers)
}
