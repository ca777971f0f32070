use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::{
    customer,
    order::{self, Entity as OrderEntity, Status},
};
use crate::error::ServiceError;
use crate::services::{customers, search_term, PageParams, Paginated};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<Status>,
    pub customer_id: Option<i32>,
    pub search: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewOrder {
    pub customer_id: i32,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i32,
    pub total_price: f64,
    pub color: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub customer: customer::Model,
}

/// Inserts a pending order. The customer must already exist.
pub async fn create_order<C: ConnectionTrait>(
    db: &C,
    new_order: NewOrder,
) -> Result<order::Model, ServiceError> {
    customers::get_customer(db, new_order.customer_id).await?;

    if new_order.quantity < 1 {
        return Err(ServiceError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let now = Utc::now();
    let order = order::ActiveModel {
        customer_id: Set(new_order.customer_id),
        product_id: Set(new_order.product_id),
        product_name: Set(new_order.product_name),
        quantity: Set(new_order.quantity),
        total_price: Set(new_order.total_price),
        color: Set(new_order.color),
        notes: Set(new_order.notes),
        status: Set(Status::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(order.insert(db).await?)
}

pub async fn get_order<C: ConnectionTrait>(db: &C, id: i32) -> Result<order::Model, ServiceError> {
    OrderEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order", id))
}

pub async fn get_order_detail<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<OrderDetail, ServiceError> {
    let order = get_order(db, id).await?;
    let customer = customers::get_customer(db, order.customer_id).await?;
    Ok(OrderDetail { order, customer })
}

pub async fn get_orders<C: ConnectionTrait>(
    db: &C,
    filter: &OrderFilter,
    page: &PageParams,
) -> Result<Paginated<order::Model>, ServiceError> {
    let mut condition = Condition::all();

    if let Some(status) = filter.status {
        condition = condition.add(order::Column::Status.eq(status));
    }
    if let Some(customer_id) = filter.customer_id {
        condition = condition.add(order::Column::CustomerId.eq(customer_id));
    }
    if let Some(term) = search_term(filter.search.as_deref()) {
        let mut query_condition =
            Condition::any().add(order::Column::ProductName.contains(term.clone()));
        if let Ok(id) = term.trim_start_matches('#').parse::<i32>() {
            query_condition = query_condition.add(order::Column::Id.eq(id));
        }
        condition = condition.add(query_condition);
    }

    let query = OrderEntity::find().filter(condition);
    let total = query.clone().count(db).await?;
    let rows = query
        .order_by_desc(order::Column::Id)
        .limit(page.limit())
        .offset(page.offset())
        .all(db)
        .await?;

    Ok(Paginated::new(rows, total, page))
}

/// Sets the order status. Any status may follow any other.
pub async fn update_order_status<C: ConnectionTrait>(
    db: &C,
    id: i32,
    status: Status,
) -> Result<order::Model, ServiceError> {
    let mut order: order::ActiveModel = get_order(db, id).await?.into();
    order.status = Set(status);
    order.updated_at = Set(Utc::now());
    Ok(order.update(db).await?)
}
