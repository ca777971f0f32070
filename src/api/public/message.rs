use axum::{
    extract::Extension,
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
    messages::{self, MessageFilter, NewMessage},
};

pub fn message_router() -> Router {
    Router::new()
        .route("/messages", get(get_messages).post(send_message))
        .route("/messages/read", post(mark_read))
        .route("/messages/stream", get(stream_messages))
}

/// A buyer's thread: every message of the customer, or only those of one
/// order.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ThreadQuery {
    pub customer_id: i32,
    pub order_id: Option<i32>,
    pub after: Option<i32>,
}

impl ThreadQuery {
    fn filter(&self) -> MessageFilter {
        MessageFilter {
            customer_id: Some(self.customer_id),
            order_id: self.order_id,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SendMessagePayload {
    pub customer_id: i32,
    pub order_id: Option<i32>,
    pub content: ContentInput,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MarkReadPayload {
    pub customer_id: i32,
    pub order_id: Option<i32>,
}

async fn get_messages(
    ApiQuery(query): ApiQuery<ThreadQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    if let Err(err) = messages::authorize_thread(db.as_ref(), query.customer_id, query.order_id).await
    {
        return err.into_response();
    }
    respond(messages::get_messages(db.as_ref(), &query.filter()).await)
}

async fn send_message(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(hub): Extension<Arc<MessageHub>>,
    Json(payload): Json<SendMessagePayload>,
) -> Response {
    post_message(
        &db,
        &hub,
        NewMessage {
            customer_id: payload.customer_id,
            order_id: payload.order_id,
            sender_type: SenderType::Customer,
            content: payload.content.into(),
        },
    )
    .await
}

/// Marks the admin's replies in the thread as read.
async fn mark_read(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<MarkReadPayload>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };

    let filter = MessageFilter {
        customer_id: Some(payload.customer_id),
        order_id: payload.order_id,
    };
    let result = match messages::authorize_thread(&txn, payload.customer_id, payload.order_id).await
    {
        Ok(()) => messages::mark_read(&txn, &filter, SenderType::Customer)
            .await
            .map(|updated| json!({ "updated": updated })),
        Err(err) => Err(err),
    };

    finish(txn, result, StatusCode::OK).await
}

async fn stream_messages(
    ApiQuery(query): ApiQuery<ThreadQuery>,
    headers: HeaderMap,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(hub): Extension<Arc<MessageHub>>,
) -> Response {
    if let Err(err) = messages::authorize_thread(db.as_ref(), query.customer_id, query.order_id).await
    {
        return err.into_response();
    }
    message_stream(db, &hub, query.filter(), query.after, &headers)
}
