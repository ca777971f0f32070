use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::api::{begin, finish, respond, ApiQuery};
use crate::services::{
    products::{self, CreateProduct, PatchProduct, ProductFilter},
    PageParams,
};

//ROUTERS
pub fn admin_product_router() -> Router {
    Router::new()
        .route("/products", get(admin_get_products).post(create_product))
        .route(
            "/products/:id",
            get(admin_get_product)
                .patch(patch_product)
                .delete(delete_product),
        )
}

//ROUTES
async fn admin_get_products(
    ApiQuery(filter): ApiQuery<ProductFilter>,
    ApiQuery(page): ApiQuery<PageParams>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(products::get_products(db.as_ref(), &filter, &page).await)
}

async fn admin_get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(products::get_product(db.as_ref(), id).await)
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = products::create_product(&txn, payload).await;
    finish(txn, result, StatusCode::CREATED).await
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = products::update_product(&txn, id, payload).await;
    finish(txn, result, StatusCode::OK).await
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let txn = match begin(&db).await {
        Ok(txn) => txn,
        Err(response) => return response,
    };
    let result = products::delete_product(&txn, id).await.map(|_| {
        json!({
            "message": "Product deleted successfully"
        })
    });
    finish(txn, result, StatusCode::OK).await
}
