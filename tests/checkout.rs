mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use barq_motors::services::customers;
use common::{scooter, spawn_app};

#[tokio::test]
async fn test_checkout_creates_customer_order_and_card() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let product = app
        .create_product(&headers, scooter("Barq S1", "scooter", 3))
        .await;
    let product_id = product["id"].as_i64().unwrap();

    let body = app.checkout(product_id, 2).await;
    let customer_id = body["customer"]["id"].as_i64().unwrap();
    let order_id = body["order"]["id"].as_i64().unwrap();

    assert_eq!(body["customer"]["phone"], "700123456");
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["quantity"], 2);
    assert_eq!(body["order"]["total_price"], 3000.0);

    let orders = customers::get_customer_orders(app.db.as_ref(), customer_id as i32)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id as i64, order_id);

    let history: Value = app
        .client
        .get(app.url(&format!("/api/customers/{customer_id}/orders")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history[0]["product_name"], "Barq S1");

    let thread: Value = app
        .client
        .get(app.url(&format!(
            "/api/messages?customer_id={customer_id}&order_id={order_id}"
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let thread = thread.as_array().unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0]["kind"], "product_card");
    assert_eq!(thread[0]["sender_type"], "customer");
    assert_eq!(thread[0]["payload"]["name"], "Barq S1");
    assert_eq!(thread[0]["payload"]["quantity"], 2);

    let stock: Value = app
        .client
        .get(app.url(&format!("/api/products/{product_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stock["stock_quantity"], 1);
    assert_eq!(stock["in_stock"], true);
}

#[tokio::test]
async fn test_checkout_rejects_more_than_stock() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let product = app
        .create_product(&headers, scooter("Barq S1", "scooter", 1))
        .await;
    let product_id = product["id"].as_i64().unwrap();

    let response = app
        .client
        .post(app.url("/api/checkout"))
        .json(&json!({
            "customer": {
                "name": "Farid",
                "phone": "799000111",
                "country_code": "+93",
                "location": "Herat"
            },
            "product_id": product_id,
            "quantity": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Not enough stock for Barq S1");

    // Nothing from the failed attempt is kept.
    let customers: Value = app
        .client
        .get(app.url("/api/admin/customers"))
        .headers(headers.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(customers["total"], 0);

    app.checkout(product_id, 1).await;
    let sold_out: Value = app
        .client
        .get(app.url(&format!("/api/products/{product_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sold_out["stock_quantity"], 0);
    assert_eq!(sold_out["in_stock"], false);
}

#[tokio::test]
async fn test_checkout_validates_customer_details() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let product = app
        .create_product(&headers, scooter("Barq S1", "scooter", 4))
        .await;

    let response = app
        .client
        .post(app.url("/api/checkout"))
        .json(&json!({
            "customer": {
                "name": "",
                "phone": "abc",
                "country_code": "93",
                "location": "Kabul"
            },
            "product_id": product["id"],
            "quantity": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let zero = app
        .client
        .post(app.url("/api/checkout"))
        .json(&json!({
            "customer": {
                "name": "Ahmad",
                "phone": "700123456",
                "country_code": "+93",
                "location": "Kabul"
            },
            "product_id": product["id"],
            "quantity": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_returning_customer_reuses_record() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let product = app
        .create_product(&headers, scooter("Barq S1", "scooter", 5))
        .await;
    let first = app.checkout(product["id"].as_i64().unwrap(), 1).await;
    let customer_id = first["customer"]["id"].clone();

    let response = app
        .client
        .post(app.url("/api/checkout"))
        .json(&json!({
            "customer_id": customer_id,
            "product_id": product["id"],
            "quantity": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let second: Value = response.json().await.unwrap();
    assert_eq!(second["customer"]["id"], customer_id);

    let detail: Value = app
        .client
        .get(app.url(&format!("/api/admin/customers/{customer_id}")))
        .headers(headers)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["orders"].as_array().unwrap().len(), 2);
}
