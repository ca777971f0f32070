use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::api::{
    begin, finish,
    public::uploads::{save_upload, MULTIPART_OVERHEAD},
    read_upload,
};
use crate::config::AppConfig;
use crate::entities::image::Bucket;
use crate::services::storage;

pub fn upload_router(config: &AppConfig) -> Router {
    Router::new()
        .route(
            "/uploads",
            post(upload_image)
                .layer(DefaultBodyLimit::max(config.file_size_limit + MULTIPART_OVERHEAD)),
        )
        .route("/uploads/:id", delete(delete_image))
}

/// Accepts an optional `bucket` form field; product images are the default.
async fn upload_image(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
    multipart: Multipart,
) -> Response {
    match read_upload(multipart, Bucket::Products, true).await {
        Ok(upload) => save_upload(&db, &config, upload).await,
        Err(err) => err.into_response(),
    }
}

async fn delete_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = storage::delete_object(&txn, &config, id).await.map(|_| {
        json!({
            "message": "Image deleted successfully"
        })
    });
    finish(txn, result, StatusCode::OK).await
}
