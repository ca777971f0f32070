mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{spawn_app, ADMIN_PASSWORD, ADMIN_USERNAME};

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/login"))
        .json(&json!({
            "username": ADMIN_USERNAME,
            "password": "not-the-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = spawn_app().await;

    let missing = app
        .client
        .get(app.url("/api/admin/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let forged = app
        .client
        .get(app.url("/api/admin/orders"))
        .bearer_auth("definitely.not.a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let body: Value = forged.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let wrong = app
        .client
        .patch(app.url("/api/admin/account/password"))
        .headers(headers.clone())
        .json(&json!({
            "current_password": "guess",
            "new_password": "a-much-longer-secret"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let too_short = app
        .client
        .patch(app.url("/api/admin/account/password"))
        .headers(headers.clone())
        .json(&json!({
            "current_password": ADMIN_PASSWORD,
            "new_password": "short"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_short.status(), StatusCode::BAD_REQUEST);

    let changed = app
        .client
        .patch(app.url("/api/admin/account/password"))
        .headers(headers)
        .json(&json!({
            "current_password": ADMIN_PASSWORD,
            "new_password": "a-much-longer-secret"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(changed.status(), StatusCode::OK);

    let old_login = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(old_login.status(), StatusCode::UNAUTHORIZED);

    let new_login = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": ADMIN_USERNAME, "password": "a-much-longer-secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(new_login.status(), StatusCode::OK);
}
