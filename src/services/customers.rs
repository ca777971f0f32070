use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{
    customer::{self, Entity as CustomerEntity},
    order::{self, Entity as OrderEntity},
};
use crate::error::ServiceError;
use crate::services::{search_term, PageParams, Paginated};

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9 ]{6,15}$").unwrap());
static COUNTRY_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[0-9]{1,4}$").unwrap());

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
    #[validate(regex(path = *COUNTRY_CODE_REGEX))]
    pub country_code: String,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CustomerWithOrders {
    #[serde(flatten)]
    pub customer: customer::Model,
    pub orders: Vec<order::Model>,
}

pub async fn create_customer<C: ConnectionTrait>(
    db: &C,
    payload: NewCustomer,
) -> Result<customer::Model, ServiceError> {
    payload
        .validate()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    let new_customer = customer::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        phone: Set(payload.phone.replace(' ', "")),
        country_code: Set(payload.country_code),
        location: Set(payload.location),
        lat: Set(payload.lat),
        lng: Set(payload.lng),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    Ok(new_customer.insert(db).await?)
}

pub async fn get_customer<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<customer::Model, ServiceError> {
    CustomerEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Customer", id))
}

pub async fn get_customers<C: ConnectionTrait>(
    db: &C,
    search: Option<&str>,
    page: &PageParams,
) -> Result<Paginated<customer::Model>, ServiceError> {
    let mut query = CustomerEntity::find();

    if let Some(term) = search_term(search) {
        query = query.filter(
            Condition::any()
                .add(customer::Column::Name.contains(term.clone()))
                .add(customer::Column::Phone.contains(term)),
        );
    }

    let total = query.clone().count(db).await?;
    let rows = query
        .order_by_desc(customer::Column::Id)
        .limit(page.limit())
        .offset(page.offset())
        .all(db)
        .await?;

    Ok(Paginated::new(rows, total, page))
}

/// Orders placed by one customer, newest first.
pub async fn get_customer_orders<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
) -> Result<Vec<order::Model>, ServiceError> {
    get_customer(db, customer_id).await?;

    Ok(OrderEntity::find()
        .filter(order::Column::CustomerId.eq(customer_id))
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_customer_with_orders<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
) -> Result<CustomerWithOrders, ServiceError> {
    let customer = get_customer(db, customer_id).await?;
    let orders = get_customer_orders(db, customer_id).await?;
    Ok(CustomerWithOrders { customer, orders })
}
