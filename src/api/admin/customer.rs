use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{respond, ApiQuery};
use crate::services::{customers, PageParams};

pub fn admin_customer_router() -> Router {
    Router::new()
        .route("/customers", get(get_customers))
        .route("/customers/:id", get(get_customer))
}

#[derive(Debug, Default, Deserialize)]
struct CustomerSearch {
    search: Option<String>,
}

async fn get_customers(
    ApiQuery(search): ApiQuery<CustomerSearch>,
    ApiQuery(page): ApiQuery<PageParams>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(customers::get_customers(db.as_ref(), search.search.as_deref(), &page).await)
}

/// The customer together with their orders, newest first.
async fn get_customer(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    respond(customers::get_customer_with_orders(db.as_ref(), id).await)
}
