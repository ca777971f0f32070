mod common;

use reqwest::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{json, Value};

use barq_motors::entities::{product_color, product_feature, product_spec};
use common::{scooter, spawn_app, TestApp};

async fn list(app: &TestApp, path: &str) -> Value {
    let response = app.client.get(app.url(path)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

fn names(body: &Value) -> Vec<String> {
    body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_and_get_product() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let created = app
        .create_product(&headers, scooter("Barq S1", "scooter", 5))
        .await;
    assert_eq!(created["name"], "Barq S1");
    assert_eq!(created["in_stock"], true);
    assert_eq!(created["specs"].as_array().unwrap().len(), 2);

    let id = created["id"].as_i64().unwrap();
    let response = app
        .client
        .get(app.url(&format!("/api/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["specs"][0]["label"], "Range");
    assert_eq!(body["specs"][1]["value"], "80 km/h");
    assert_eq!(body["features"][0]["feature"], "Regenerative braking");
    assert_eq!(body["colors"][1]["hex"], "#ff0000");
}

#[tokio::test]
async fn test_products_filter_by_category() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    app.create_product(&headers, scooter("Barq S1", "scooter", 5))
        .await;
    app.create_product(&headers, scooter("Barq S2", "scooter", 5))
        .await;
    app.create_product(&headers, scooter("Barq Cruiser", "motorcycle", 2))
        .await;

    let response = app
        .client
        .get(app.url("/api/products?category=scooter"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 2);
    let rows = body["rows"].as_array().unwrap();
    assert!(rows.iter().all(|row| row["category"] == "scooter"));

    let motorcycles: Value = app
        .client
        .get(app.url("/api/products?category=motorcycle"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(motorcycles["total"], 1);
    assert_eq!(motorcycles["rows"][0]["name"], "Barq Cruiser");

    let categories: Value = app
        .client
        .get(app.url("/api/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        categories,
        json!([
            { "category": "motorcycle", "count": 1 },
            { "category": "scooter", "count": 2 }
        ])
    );
}

#[tokio::test]
async fn test_patch_replaces_child_lists() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let created = app
        .create_product(&headers, scooter("Barq S1", "scooter", 5))
        .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .client
        .patch(app.url(&format!("/api/admin/products/{id}")))
        .headers(headers.clone())
        .json(&json!({
            "price": 1400.0,
            "old_price": 1500.0,
            "colors": [{ "name": "White", "hex": "#ffffff" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["price"], 1400.0);
    assert_eq!(body["old_price"], 1500.0);
    assert_eq!(body["colors"], json!([{ "name": "White", "hex": "#ffffff" }]));
    assert_eq!(body["specs"].as_array().unwrap().len(), 2);

    let bad_color = app
        .client
        .patch(app.url(&format!("/api/admin/products/{id}")))
        .headers(headers)
        .json(&json!({
            "colors": [{ "name": "Mystery", "hex": "blue" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_color.status(), StatusCode::BAD_REQUEST);

    let colors = product_color::Entity::find()
        .filter(product_color::Column::ProductId.eq(id as i32))
        .count(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(colors, 1);
}

#[tokio::test]
async fn test_delete_product_removes_children() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let created = app
        .create_product(&headers, scooter("Barq S1", "scooter", 5))
        .await;
    let id = created["id"].as_i64().unwrap();
    app.create_product(&headers, scooter("Barq S2", "scooter", 5))
        .await;

    let response = app
        .client
        .delete(app.url(&format!("/api/admin/products/{id}")))
        .headers(headers.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let specs = product_spec::Entity::find()
        .filter(product_spec::Column::ProductId.eq(id as i32))
        .count(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(specs, 0);
    let features = product_feature::Entity::find()
        .filter(product_feature::Column::ProductId.eq(id as i32))
        .count(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(features, 0);
    let colors = product_color::Entity::find()
        .filter(product_color::Column::ProductId.eq(id as i32))
        .count(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(colors, 0);

    let listing = list(&app, "/api/products").await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["rows"][0]["name"], "Barq S2");

    let missing = app
        .client
        .get(app.url(&format!("/api/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let again = app
        .client
        .delete(app.url(&format!("/api/admin/products/{id}")))
        .headers(headers)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_products_search_sort_and_flags() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;

    let mut budget = scooter("Barq S1", "scooter", 5);
    budget["price"] = json!(900.0);
    budget["featured"] = json!(true);
    app.create_product(&headers, budget).await;

    let mut sold_out = scooter("Barq S2", "scooter", 0);
    sold_out["price"] = json!(2100.0);
    app.create_product(&headers, sold_out).await;

    app.create_product(&headers, scooter("Barq Cruiser", "motorcycle", 2))
        .await;

    let found = list(&app, "/api/products?search=Cruiser").await;
    assert_eq!(names(&found), vec!["Barq Cruiser"]);

    let local = list(&app, "/api/products?search=%D8%A8%D8%B1%D9%82%DB%8C").await;
    assert_eq!(local["total"], 3);

    let cheapest_first = list(&app, "/api/products?sort_by=price&order=asc").await;
    assert_eq!(
        names(&cheapest_first),
        vec!["Barq S1", "Barq Cruiser", "Barq S2"]
    );
    let dearest_first = list(&app, "/api/products?sort_by=price&order=desc").await;
    assert_eq!(
        names(&dearest_first),
        vec!["Barq S2", "Barq Cruiser", "Barq S1"]
    );

    let featured = list(&app, "/api/products?featured=true").await;
    assert_eq!(names(&featured), vec!["Barq S1"]);

    let unavailable = list(&app, "/api/products?in_stock=false").await;
    assert_eq!(names(&unavailable), vec!["Barq S2"]);
    let available = list(&app, "/api/products?in_stock=true&sort_by=name&order=asc").await;
    assert_eq!(names(&available), vec!["Barq Cruiser", "Barq S1"]);
}

#[tokio::test]
async fn test_product_listing_page_edge_cases() {
    let app = spawn_app().await;
    let headers = app.admin_headers().await;
    app.create_product(&headers, scooter("Barq S1", "scooter", 5))
        .await;

    let far_away = list(&app, "/api/products?page=18446744073709551615&limit=10").await;
    assert_eq!(far_away["total"], 1);
    assert!(far_away["rows"].as_array().unwrap().is_empty());

    for path in ["/api/products?page=abc", "/api/products?in_stock=maybe"] {
        let response = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}
