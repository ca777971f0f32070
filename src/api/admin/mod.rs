pub mod account;
pub mod customer;
pub mod dashboard;
pub mod home;
pub mod message;
pub mod order;
pub mod product;
pub mod upload;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use account::account_router;
use customer::admin_customer_router;
use dashboard::dashboard_router;
use home::admin_home_router;
use message::admin_message_router;
use order::admin_order_router;
use product::admin_product_router;
use upload::upload_router;

use crate::config::AppConfig;
use crate::middleware::auth::{auth_middleware, AuthState};

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: &AppConfig) -> Router {
    Router::new()
        .merge(dashboard_router())
        .merge(admin_customer_router())
        .merge(admin_order_router())
        .merge(admin_product_router())
        .merge(admin_message_router())
        .merge(admin_home_router())
        .merge(upload_router(config))
        .merge(account_router())
        .layer(from_fn_with_state(
            AuthState {
                db,
                secret: Arc::from(config.secret.as_str()),
            },
            auth_middleware,
        ))
}
