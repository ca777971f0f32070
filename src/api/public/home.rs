use axum::{extract::Extension, response::IntoResponse, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::respond;
use crate::services::home;

pub fn home_router() -> Router {
    Router::new().route("/home", get(get_home))
}

async fn get_home(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    respond(home::load_home_settings(db.as_ref()).await)
}
