#![allow(dead_code)]

use reqwest::{header, Client, StatusCode};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use barq_motors::api::create_api_router;
use barq_motors::config::AppConfig;
use barq_motors::entities::{bootstrap_admin, setup_schema};
use barq_motors::realtime::MessageHub;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Barq-admin-2024";

/// A server running in-process over an in-memory database.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    _upload_dir: TempDir,
}

/// A fresh in-memory database with the schema in place.
pub async fn test_db() -> DatabaseConnection {
    // One connection keeps every query on the same in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open database");
    setup_schema(&db).await.expect("Failed to create schema");
    db
}

pub async fn spawn_app() -> TestApp {
    let upload_dir = TempDir::new().expect("Failed to create upload dir");

    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        secret: "test-secret".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        file_size_limit: 1024 * 1024,
        public_base_url: String::new(),
        admin_username: ADMIN_USERNAME.to_string(),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    };

    let db = test_db().await;
    bootstrap_admin(&db, &config)
        .await
        .expect("Failed to create admin");

    let db = Arc::new(db);
    let config = Arc::new(config);
    let app = create_api_router(db.clone(), Arc::new(MessageHub::new()), config.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        db,
        config,
        _upload_dir: upload_dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self) -> String {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD
            }))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.expect("Invalid login body");
        body["token"]
            .as_str()
            .expect("Token not found in login response")
            .to_string()
    }

    pub async fn admin_headers(&self) -> header::HeaderMap {
        let token = self.login().await;
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .expect("Failed to create Authorization header"),
        );
        headers
    }

    /// Creates a product through the admin API and returns its body.
    pub async fn create_product(&self, headers: &header::HeaderMap, payload: Value) -> Value {
        let response = self
            .client
            .post(self.url("/api/admin/products"))
            .headers(headers.clone())
            .json(&payload)
            .send()
            .await
            .expect("Failed to send create product request");
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("Invalid product body")
    }

    /// Places an order as a new customer; returns the checkout body.
    pub async fn checkout(&self, product_id: i64, quantity: i64) -> Value {
        let response = self
            .client
            .post(self.url("/api/checkout"))
            .json(&json!({
                "customer": {
                    "name": "Ahmad Karimi",
                    "phone": "700123456",
                    "country_code": "+93",
                    "location": "Kabul, Karte Se"
                },
                "product_id": product_id,
                "quantity": quantity,
                "color": "Black"
            }))
            .send()
            .await
            .expect("Failed to send checkout request");
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("Invalid checkout body")
    }
}

pub fn scooter(name: &str, category: &str, stock: i64) -> Value {
    json!({
        "name": name,
        "name_local": "موټرسایکل برقی",
        "description": "Electric motorcycle",
        "price": 1500.0,
        "category": category,
        "stock_quantity": stock,
        "specs": [
            { "label": "Range", "label_local": "فاصله", "value": "120 km" },
            { "label": "Top speed", "value": "80 km/h" }
        ],
        "features": [
            { "feature": "Regenerative braking" }
        ],
        "colors": [
            { "name": "Black", "hex": "#000000" },
            { "name": "Red", "hex": "#ff0000" }
        ]
    })
}
