use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{respond, ApiQuery};
use crate::services::dashboard;

const DEFAULT_ANALYTICS_DAYS: i64 = 30;

pub fn dashboard_router() -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/analytics", get(get_analytics))
}

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    days: Option<i64>,
}

async fn get_dashboard(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    respond(dashboard::get_dashboard(db.as_ref()).await)
}

async fn get_analytics(
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let days = query.days.unwrap_or(DEFAULT_ANALYTICS_DAYS);
    respond(dashboard::get_analytics(db.as_ref(), days, Utc::now()).await)
}
