use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs as tokio_fs;
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::image::{self, Bucket, Entity as ImageEntity, FileExtension};
use crate::error::ServiceError;

static FILE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\- .()]{1,100}$").unwrap());

#[derive(Debug)]
pub struct Upload {
    pub bucket: Bucket,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct StoredObject {
    pub id: i32,
    pub bucket: Bucket,
    pub url: String,
    #[serde(skip)]
    pub path: PathBuf,
}

/// Records the object and writes it under the upload directory. Run inside a
/// transaction and commit only after this returns, so a failed write leaves
/// no row behind. If the commit itself fails, hand the result to
/// [`discard_file`].
pub async fn store_upload<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    upload: Upload,
) -> Result<StoredObject, ServiceError> {
    let extension = FileExtension::from_content_type(&upload.content_type)
        .ok_or_else(|| ServiceError::Validation("Unsupported content type.".to_string()))?;

    if upload.data.is_empty() {
        return Err(ServiceError::Validation("File is empty.".to_string()));
    }
    if upload.data.len() > config.file_size_limit {
        return Err(ServiceError::PayloadTooLarge);
    }

    let file_name = sanitize_file_name(&upload.file_name);
    let path_name = Uuid::new_v4().to_string();

    let new_image = image::ActiveModel {
        bucket: Set(upload.bucket),
        file_name: Set(file_name),
        path_name: Set(path_name),
        extension: Set(extension),
        size: Set(upload.data.len() as i64),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let stored = new_image.insert(db).await?;

    let path = object_path(&config.upload_dir, &stored);
    tokio_fs::create_dir_all(&config.upload_dir).await?;
    if let Err(err) = tokio_fs::write(&path, &upload.data).await {
        let _ = tokio_fs::remove_file(&path).await;
        return Err(err.into());
    }

    Ok(StoredObject {
        id: stored.id,
        bucket: stored.bucket,
        url: config.image_url(stored.id),
        path,
    })
}

/// Removes the file of an upload whose row never got committed.
pub async fn discard_file(stored: &StoredObject) {
    match tokio_fs::remove_file(&stored.path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            warn!(path = %stored.path.display(), "Failed to remove orphaned upload: {}", err)
        }
    }
}

pub async fn find_object<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    id: i32,
) -> Result<(image::Model, PathBuf), ServiceError> {
    let stored = ImageEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Image", id))?;
    let path = object_path(&config.upload_dir, &stored);
    Ok((stored, path))
}

/// Removes the row and the file. A file that is already gone is not an error.
pub async fn delete_object<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    id: i32,
) -> Result<(), ServiceError> {
    let (stored, path) = find_object(db, config, id).await?;
    ImageEntity::delete_by_id(stored.id).exec(db).await?;

    match tokio_fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn object_path(upload_dir: &Path, stored: &image::Model) -> PathBuf {
    upload_dir.join(stored.stored_name())
}

/// Keeps client file names for display only; anything odd becomes "upload".
fn sanitize_file_name(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if FILE_NAME_REGEX.is_match(name) {
        name.to_string()
    } else {
        "upload".to_string()
    }
}
