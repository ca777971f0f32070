use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::{respond, ApiQuery};
use crate::services::{
    customers,
    products::{self, ProductFilter},
    PageParams,
};

pub fn product_router() -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .route("/categories", get(get_categories))
        .route("/customers/:id/orders", get(get_customer_orders))
}

async fn get_products(
    ApiQuery(filter): ApiQuery<ProductFilter>,
    ApiQuery(page): ApiQuery<PageParams>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(products::get_products(db.as_ref(), &filter, &page).await)
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(products::get_product(db.as_ref(), id).await)
}

async fn get_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    respond(products::get_categories(db.as_ref()).await)
}

/// Order history for a returning buyer, newest first.
async fn get_customer_orders(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(customers::get_customer_orders(db.as_ref(), id).await)
}
