pub mod admin;
pub mod public;

use axum::{
    async_trait,
    extract::{FromRequestParts, Multipart, Query},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::from_fn,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Extension, Json, Router,
};
use futures::StreamExt;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::entities::image::Bucket;
use crate::error::ServiceError;
use crate::middleware::logging::{logging_middleware, to_response, ApiError};
use crate::realtime::{subscribe_to_messages, MessageHub};
use crate::services::{
    messages::{self, MessageFilter, MessageView, NewMessage},
    storage::Upload,
};

use admin::admin_api_router;
use public::{auth::auth_router, public_api_router};

pub fn create_api_router(
    shared_db: Arc<DatabaseConnection>,
    hub: Arc<MessageHub>,
    config: Arc<AppConfig>,
) -> Router {
    Router::new()
        .route("/", get(health))
        .merge(auth_router())
        .nest("/api", public_api_router(&config))
        .nest(
            "/api/admin",
            admin_api_router(shared_db.clone(), &config),
        )
        .layer(Extension(shared_db))
        .layer(Extension(hub))
        .layer(Extension(config))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Response {
    to_response(
        (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Ok(()),
    )
}

/// Query-string extractor whose rejection is the usual `{"error": ...}` body.
pub(crate) struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                Err(ServiceError::Validation(rejection.body_text()).into_response())
            }
        }
    }
}

/// Opens a transaction, or produces the response to send if that fails.
pub(crate) async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, Response> {
    db.begin().await.map_err(|_| {
        to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::TransactionCreationFailed),
        )
    })
}

/// Commits `txn` when the service call succeeded and answers with `status`
/// and the JSON body; otherwise rolls back and answers with the error.
pub(crate) async fn finish<T: Serialize>(
    txn: DatabaseTransaction,
    result: Result<T, ServiceError>,
    status: StatusCode,
) -> Response {
    match result {
        Ok(body) => match txn.commit().await {
            Ok(_) => to_response((status, Json(body)), Ok(())),
            Err(err) => ServiceError::from(err).into_response(),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

/// Plain JSON answer for read-only calls.
pub(crate) fn respond<T: Serialize>(result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => to_response((StatusCode::OK, Json(body)), Ok(())),
        Err(err) => err.into_response(),
    }
}

/// Inserts a message in its own transaction and publishes it once committed.
pub(crate) async fn post_message(
    db: &DatabaseConnection,
    hub: &MessageHub,
    new_message: NewMessage,
) -> Response {
    let txn = match begin(db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };

    match messages::send_message(&txn, new_message).await {
        Ok(message) => {
            if let Err(err) = txn.commit().await {
                return ServiceError::from(err).into_response();
            }
            hub.publish(message.clone());
            to_response((StatusCode::CREATED, Json(message)), Ok(()))
        }
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

/// Server-sent events for a thread, resuming after `after` (or the
/// `Last-Event-ID` header, which wins when both are present).
pub(crate) fn message_stream(
    db: Arc<DatabaseConnection>,
    hub: &MessageHub,
    filter: MessageFilter,
    after: Option<i32>,
    headers: &HeaderMap,
) -> Response {
    let after = last_event_id(headers).or(after).unwrap_or(0);
    let stream = subscribe_to_messages(db, hub, filter, after).map(message_event);
    to_response(Sse::new(stream).keep_alive(KeepAlive::default()), Ok(()))
}

/// SSE frame for one message; the event id lets clients resume with
/// `Last-Event-ID`.
fn message_event(item: Result<MessageView, ServiceError>) -> Result<Event, axum::Error> {
    let message = item.map_err(axum::Error::new)?;
    Event::default()
        .id(message.id.to_string())
        .event("message")
        .json_data(&message)
}

fn last_event_id(headers: &HeaderMap) -> Option<i32> {
    headers
        .get("Last-Event-ID")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Reads one file part (and, when allowed, a `bucket` text part) from a
/// multipart body.
pub(crate) async fn read_upload(
    mut multipart: Multipart,
    default_bucket: Bucket,
    bucket_field: bool,
) -> Result<Upload, ServiceError> {
    let mut bucket = default_bucket;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServiceError::Validation(err.body_text()))?
    {
        let name = field.name().map(str::to_string);

        if bucket_field && name.as_deref() == Some("bucket") {
            let value = field
                .text()
                .await
                .map_err(|err| ServiceError::Validation(err.body_text()))?;
            bucket = value.trim().parse().map_err(ServiceError::Validation)?;
            continue;
        }

        let Some(content_type) = field.content_type().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(|err| {
            if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ServiceError::PayloadTooLarge
            } else {
                ServiceError::Validation(err.body_text())
            }
        })?;

        if file.is_some() {
            return Err(ServiceError::Validation(
                "Only one file per upload is accepted.".to_string(),
            ));
        }
        file = Some((file_name, content_type, data.to_vec()));
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| ServiceError::Validation("No file in upload.".to_string()))?;

    Ok(Upload {
        bucket,
        file_name,
        content_type,
        data,
    })
}
