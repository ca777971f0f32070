use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, Path},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::api::{begin, read_upload};
use crate::config::AppConfig;
use crate::entities::image::Bucket;
use crate::error::ServiceError;
use crate::middleware::logging::to_response;
use crate::services::storage::{self, Upload};

/// Room for the multipart framing around a file at the size limit.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn uploads_router(config: &AppConfig) -> Router {
    Router::new()
        .route(
            "/uploads",
            post(upload_chat_image)
                .layer(DefaultBodyLimit::max(config.file_size_limit + MULTIPART_OVERHEAD)),
        )
        .route("/image/:id", get(print_image))
}

/// Storefront uploads always land in the chat bucket, whatever the form says.
async fn upload_chat_image(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
    multipart: Multipart,
) -> Response {
    match read_upload(multipart, Bucket::Chat, false).await {
        Ok(upload) => save_upload(&db, &config, upload).await,
        Err(err) => err.into_response(),
    }
}

/// Stores an upload in its own transaction. The file is removed again when
/// the row fails to commit.
pub(crate) async fn save_upload(
    db: &DatabaseConnection,
    config: &AppConfig,
    upload: Upload,
) -> Response {
    let txn = match begin(db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };

    match storage::store_upload(&txn, config, upload).await {
        Ok(stored) => match txn.commit().await {
            Ok(()) => to_response((StatusCode::CREATED, Json(stored)), Ok(())),
            Err(err) => {
                storage::discard_file(&stored).await;
                ServiceError::from(err).into_response()
            }
        },
        Err(err) => {
            let _ = txn.rollback().await;
            err.into_response()
        }
    }
}

pub async fn print_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
) -> Response {
    let (_, path) = match storage::find_object(db.as_ref(), &config, id).await {
        Ok(found) => found,
        Err(err) => return err.into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ServiceError::not_found("Image", id).into_response()
        }
        Err(err) => return ServiceError::from(err).into_response(),
    };

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    to_response((headers, body), Ok(()))
}
