mod common;

use reqwest::{multipart, StatusCode};
use sea_orm::EntityTrait;
use serde_json::Value;

use barq_motors::entities::image::{self, Bucket};
use common::spawn_app;

fn image_form(bytes: Vec<u8>, mime: &str) -> multipart::Form {
    multipart::Form::new().part(
        "file",
        multipart::Part::bytes(bytes)
            .file_name("bike.png")
            .mime_str(mime)
            .unwrap(),
    )
}

#[tokio::test]
async fn test_storefront_upload_goes_to_chat_bucket() {
    let app = spawn_app().await;

    let form = image_form(b"\x89PNG fake image".to_vec(), "image/png").text("bucket", "products");
    let response = app
        .client
        .post(app.url("/api/uploads"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["bucket"], "chat");
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["url"], format!("/api/image/{id}"));

    let served = app
        .client
        .get(app.url(&format!("/api/image/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()["content-type"], "image/png");
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"\x89PNG fake image");
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/uploads"))
        .multipart(image_form(b"plain text".to_vec(), "text/plain"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unsupported content type.");
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let app = spawn_app().await;
    let too_big = vec![0u8; app.config.file_size_limit + 1];

    let response = app
        .client
        .post(app.url("/api/uploads"))
        .multipart(image_form(too_big, "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let stored = image::Entity::find().all(app.db.as_ref()).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_admin_upload_and_delete() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let form = image_form(b"webp bytes".to_vec(), "image/webp").text("bucket", "home");
    let response = app
        .client
        .post(app.url("/api/admin/uploads"))
        .headers(headers.clone())
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();

    let stored = image::Entity::find_by_id(id as i32)
        .one(app.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.bucket, Bucket::Home);
    let path = app.config.upload_dir.join(stored.stored_name());
    assert!(path.exists());

    let deleted = app
        .client
        .delete(app.url(&format!("/api/admin/uploads/{id}")))
        .headers(headers)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert!(!path.exists());

    let gone = app
        .client
        .get(app.url(&format!("/api/image/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
