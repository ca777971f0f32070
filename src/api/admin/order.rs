use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{begin, finish, respond, ApiQuery};
use crate::entities::order::Status;
use crate::services::{
    orders::{self, OrderFilter},
    PageParams,
};

pub fn admin_order_router() -> Router {
    Router::new()
        .route("/orders", get(get_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_status))
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: Status,
}

async fn get_orders(
    ApiQuery(filter): ApiQuery<OrderFilter>,
    ApiQuery(page): ApiQuery<PageParams>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(orders::get_orders(db.as_ref(), &filter, &page).await)
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(orders::get_order_detail(db.as_ref(), id).await)
}

async fn update_status(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<StatusPayload>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = orders::update_order_status(&txn, id, payload.status).await;
    finish(txn, result, StatusCode::OK).await
}
