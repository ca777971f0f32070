use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::entities::{
    customer,
    order::{self, Status},
    product,
};
use crate::error::ServiceError;
use crate::services::messages;

const RECENT_ORDERS: u64 = 5;
const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub products: u64,
    pub customers: u64,
    pub orders: u64,
    pub unread_messages: u64,
    pub orders_by_status: BTreeMap<String, u64>,
    pub revenue: f64,
    pub recent_orders: Vec<order::Model>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ProductSales {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct Analytics {
    pub days: i64,
    pub daily: Vec<DailyPoint>,
    pub top_products: Vec<ProductSales>,
    pub cancellation_rate: f64,
}

/// Revenue counts every order that was not cancelled.
fn counts_as_revenue(status: Status) -> bool {
    status != Status::Cancelled
}

pub async fn get_dashboard<C: ConnectionTrait>(db: &C) -> Result<DashboardStats, ServiceError> {
    let products = product::Entity::find().count(db).await?;
    let customers = customer::Entity::find().count(db).await?;
    let unread_messages = messages::count_unread_for_admin(db).await?;

    let rows: Vec<(Status, f64)> = order::Entity::find()
        .select_only()
        .column(order::Column::Status)
        .column(order::Column::TotalPrice)
        .into_tuple()
        .all(db)
        .await?;

    let mut orders_by_status: BTreeMap<String, u64> = BTreeMap::new();
    let mut revenue: f64 = 0.0;
    for (status, total_price) in &rows {
        *orders_by_status.entry(status.to_string()).or_default() += 1;
        if counts_as_revenue(*status) {
            revenue += total_price;
        }
    }

    let recent_orders = order::Entity::find()
        .order_by_desc(order::Column::Id)
        .limit(RECENT_ORDERS)
        .all(db)
        .await?;

    Ok(DashboardStats {
        products,
        customers,
        orders: rows.len() as u64,
        unread_messages,
        orders_by_status,
        revenue,
        recent_orders,
    })
}

/// Daily series over the last `days` days (today included), top sellers and
/// the share of cancelled orders in that window.
pub async fn get_analytics<C: ConnectionTrait>(
    db: &C,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Analytics, ServiceError> {
    let days = days.clamp(1, 365);
    let first_day = now.date_naive() - Duration::days(days - 1);
    let since = first_day
        .and_hms_opt(0, 0, 0)
        .map(|start| start.and_utc())
        .unwrap_or(now);

    let rows: Vec<(Status, f64, i32, String, DateTime<Utc>)> = order::Entity::find()
        .select_only()
        .column(order::Column::Status)
        .column(order::Column::TotalPrice)
        .column(order::Column::Quantity)
        .column(order::Column::ProductName)
        .column(order::Column::CreatedAt)
        .filter(order::Column::CreatedAt.gte(since))
        .into_tuple()
        .all(db)
        .await?;

    Ok(summarize(days, first_day, &rows))
}

fn summarize(
    days: i64,
    first_day: NaiveDate,
    rows: &[(Status, f64, i32, String, DateTime<Utc>)],
) -> Analytics {
    let mut daily: BTreeMap<NaiveDate, DailyPoint> = (0..days)
        .map(|offset| first_day + Duration::days(offset))
        .map(|date| {
            (
                date,
                DailyPoint {
                    date,
                    orders: 0,
                    revenue: 0.0,
                },
            )
        })
        .collect();

    let mut sales: HashMap<&str, ProductSales> = HashMap::new();
    let mut cancelled = 0u64;

    for (status, total_price, quantity, product_name, created_at) in rows {
        if let Some(point) = daily.get_mut(&created_at.date_naive()) {
            point.orders += 1;
            if counts_as_revenue(*status) {
                point.revenue += total_price;
            }
        }

        if *status == Status::Cancelled {
            cancelled += 1;
            continue;
        }

        let entry = sales
            .entry(product_name.as_str())
            .or_insert_with(|| ProductSales {
                product_name: product_name.clone(),
                quantity: 0,
                revenue: 0.0,
            });
        entry.quantity += i64::from(*quantity);
        entry.revenue += total_price;
    }

    let mut top_products: Vec<ProductSales> = sales.into_values().collect();
    top_products.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    top_products.truncate(TOP_PRODUCTS);

    let cancellation_rate = if rows.is_empty() {
        0.0
    } else {
        cancelled as f64 / rows.len() as f64
    };

    Analytics {
        days,
        daily: daily.into_values().collect(),
        top_products,
        cancellation_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn summary_fills_empty_days_and_skips_cancelled_revenue() {
        let day = |d: u32| Utc.with_ymd_and_hms(2026, 3, d, 10, 0, 0).unwrap();
        let rows = vec![
            (Status::Delivered, 2000.0, 1, "Barq S1".to_string(), day(1)),
            (Status::Pending, 4000.0, 2, "Barq S1".to_string(), day(3)),
            (Status::Cancelled, 1500.0, 1, "Barq City".to_string(), day(3)),
            (Status::Shipped, 1500.0, 1, "Barq City".to_string(), day(3)),
        ];

        let analytics = summarize(3, day(1).date_naive(), &rows);

        assert_eq!(analytics.daily.len(), 3);
        assert_eq!(analytics.daily[0].orders, 1);
        assert_eq!(analytics.daily[1].orders, 0);
        assert_eq!(analytics.daily[2].orders, 3);
        assert_eq!(analytics.daily[2].revenue, 5500.0);

        assert_eq!(analytics.top_products[0].product_name, "Barq S1");
        assert_eq!(analytics.top_products[0].quantity, 3);
        assert_eq!(analytics.top_products[1].quantity, 1);
        assert_eq!(analytics.cancellation_rate, 0.25);
    }
}
