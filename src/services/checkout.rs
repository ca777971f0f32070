use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::entities::{customer, message::SenderType, order, product};
use crate::error::ServiceError;
use crate::services::{
    content::MessageContent,
    customers::{self, NewCustomer},
    messages::{self, MessageView, NewMessage},
    orders::{self, NewOrder},
};

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    /// Returning buyers send their id instead of creating a new customer.
    pub customer_id: Option<i32>,
    #[validate(nested)]
    pub customer: Option<NewCustomer>,
    pub product_id: i32,
    #[validate(range(min = 1, max = 100))]
    pub quantity: i32,
    pub color: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResult {
    pub customer: customer::Model,
    pub order: order::Model,
    /// Product card posted into the order thread; publish after commit.
    #[serde(skip)]
    pub message: MessageView,
}

/// Creates (or reuses) the customer, places the order, takes the stock and
/// opens the order's chat thread with a product card. Run inside a
/// transaction.
pub async fn checkout<C: ConnectionTrait>(
    db: &C,
    request: CheckoutRequest,
) -> Result<CheckoutResult, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    let product = product::Entity::find_by_id(request.product_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product", request.product_id))?;

    if !product.in_stock || product.stock_quantity < request.quantity {
        return Err(ServiceError::Conflict(format!(
            "Not enough stock for {}",
            product.name
        )));
    }

    let customer = match (request.customer_id, request.customer) {
        (Some(customer_id), _) => customers::get_customer(db, customer_id).await?,
        (None, Some(new_customer)) => customers::create_customer(db, new_customer).await?,
        (None, None) => {
            return Err(ServiceError::Validation(
                "Either customer_id or customer details are required".to_string(),
            ))
        }
    };

    let order = orders::create_order(
        db,
        NewOrder {
            customer_id: customer.id,
            product_id: Some(product.id),
            product_name: product.name.clone(),
            quantity: request.quantity,
            total_price: product.price * f64::from(request.quantity),
            color: request.color.clone(),
            notes: request.notes,
        },
    )
    .await?;

    let remaining = product.stock_quantity - request.quantity;
    let mut stock: product::ActiveModel = product.clone().into();
    stock.stock_quantity = Set(remaining);
    stock.in_stock = Set(remaining > 0);
    stock.update(db).await?;

    let message = messages::send_message(
        db,
        NewMessage {
            customer_id: customer.id,
            order_id: Some(order.id),
            sender_type: SenderType::Customer,
            content: MessageContent::ProductCard {
                payload: json!({
                    "product_id": product.id,
                    "name": product.name,
                    "name_local": product.name_local,
                    "price": product.price,
                    "image_url": product.image_url,
                    "quantity": order.quantity,
                    "color": request.color,
                    "total_price": order.total_price,
                }),
            },
        },
    )
    .await?;

    Ok(CheckoutResult {
        customer,
        order,
        message,
    })
}
