use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::{begin, finish, respond};
use crate::services::home::{self, HomeSettings};

pub fn admin_home_router() -> Router {
    Router::new().route("/home", get(get_home).put(save_home))
}

async fn get_home(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    respond(home::load_home_settings(db.as_ref()).await)
}

/// Rewrites every landing page section in a single transaction.
async fn save_home(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(settings): Json<HomeSettings>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = home::save_home_settings(&txn, settings).await;
    finish(txn, result, StatusCode::OK).await
}
