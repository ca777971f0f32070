use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::patch,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::api::{begin, finish};
use crate::middleware::auth::Claims;
use crate::services::accounts::{self, ChangePassword};

pub fn account_router() -> Router {
    Router::new().route("/account/password", patch(change_password))
}

async fn change_password(
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<ChangePassword>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = accounts::change_password(&txn, claims.admin_id, payload)
        .await
        .map(|_| {
            json!({
                "message": "Password updated successfully"
            })
        });
    finish(txn, result, StatusCode::OK).await
}
