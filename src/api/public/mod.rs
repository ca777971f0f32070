pub mod auth;
pub mod checkout;
pub mod home;
pub mod message;
pub mod product;
pub mod uploads;

use axum::Router;

use crate::config::AppConfig;

use checkout::checkout_router;
use home::home_router;
use message::message_router;
use product::product_router;
use uploads::uploads_router;

/// Storefront routes. Buyers have no accounts; threads are addressed by
/// customer id and checked against order ownership.
pub fn public_api_router(config: &AppConfig) -> Router {
    Router::new()
        .merge(product_router())
        .merge(checkout_router())
        .merge(message_router())
        .merge(uploads_router(config))
        .merge(home_router())
}
