use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::middleware::logging::to_response;
use crate::services::accounts::{self, Login};

pub fn auth_router() -> Router {
    Router::new().route("/login", post(login))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
    Json(payload): Json<Login>,
) -> impl IntoResponse {
    match accounts::login(db.as_ref(), &config.secret, payload).await {
        Ok(token) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "token": token
                })),
            ),
            Ok(()),
        ),
        Err(err) => err.into_response(),
    }
}
