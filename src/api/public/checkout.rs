use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::begin;
use crate::error::ServiceError;
use crate::middleware::logging::to_response;
use crate::realtime::MessageHub;
use crate::services::checkout::{self, CheckoutRequest};

pub fn checkout_router() -> Router {
    Router::new().route("/checkout", post(place_order))
}

/// Places an order in one transaction; the product card lands in the order
/// thread only after the commit succeeds.
async fn place_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(hub): Extension<Arc<MessageHub>>,
    Json(payload): Json<CheckoutRequest>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };

    match checkout::checkout(&txn, payload).await {
        Ok(result) => {
            if let Err(err) = txn.commit().await {
                return ServiceError::from(err).into_response();
            }
            hub.publish(result.message.clone());
            to_response((StatusCode::CREATED, Json(result)), Ok(()))
        }
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}
