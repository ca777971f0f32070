use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::entities::{
    customer,
    message::{self, Entity as MessageEntity, SenderType},
};
use crate::error::ServiceError;
use crate::services::{content::MessageContent, customers, orders};

/// A message as clients see it: the stored `kind`/`body` pair rebuilt into
/// [`MessageContent`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageView {
    pub id: i32,
    pub customer_id: i32,
    pub order_id: Option<i32>,
    pub sender_type: SenderType,
    #[serde(flatten)]
    pub content: MessageContent,
    pub is_read: bool,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<message::Model> for MessageView {
    fn from(model: message::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            order_id: model.order_id,
            sender_type: model.sender_type,
            content: MessageContent::from_columns(model.kind, &model.body),
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}

/// Which thread a query or subscription is about. Both fields empty means
/// every message.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct MessageFilter {
    pub customer_id: Option<i32>,
    pub order_id: Option<i32>,
}

impl MessageFilter {
    pub fn order(order_id: i32) -> Self {
        Self {
            customer_id: None,
            order_id: Some(order_id),
        }
    }

    pub fn matches(&self, message: &MessageView) -> bool {
        self.customer_id.map_or(true, |id| id == message.customer_id)
            && self.order_id.map_or(true, |id| Some(id) == message.order_id)
    }

    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(customer_id) = self.customer_id {
            condition = condition.add(message::Column::CustomerId.eq(customer_id));
        }
        if let Some(order_id) = self.order_id {
            condition = condition.add(message::Column::OrderId.eq(order_id));
        }
        condition
    }
}

#[derive(Clone, Debug)]
pub struct NewMessage {
    pub customer_id: i32,
    pub order_id: Option<i32>,
    pub sender_type: SenderType,
    pub content: MessageContent,
}

/// One inbox row: a (customer, order) thread with its latest message.
#[derive(Debug, Serialize)]
pub struct Conversation {
    pub customer_id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub order_id: Option<i32>,
    pub last_message: MessageView,
    pub message_count: u64,
    pub unread_count: u64,
}

/// Checks that the customer exists and, when an order is named, that the
/// order belongs to that customer.
pub async fn authorize_thread<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
    order_id: Option<i32>,
) -> Result<(), ServiceError> {
    customers::get_customer(db, customer_id).await?;

    if let Some(order_id) = order_id {
        let order = orders::get_order(db, order_id).await?;
        if order.customer_id != customer_id {
            return Err(ServiceError::Forbidden(format!(
                "Order {order_id} does not belong to customer {customer_id}"
            )));
        }
    }

    Ok(())
}

/// Inserts a message. The caller publishes the returned view on the hub once
/// its transaction has committed.
pub async fn send_message<C: ConnectionTrait>(
    db: &C,
    new_message: NewMessage,
) -> Result<MessageView, ServiceError> {
    new_message
        .content
        .validate()
        .map_err(ServiceError::Validation)?;
    authorize_thread(db, new_message.customer_id, new_message.order_id).await?;

    let model = message::ActiveModel {
        customer_id: Set(new_message.customer_id),
        order_id: Set(new_message.order_id),
        sender_type: Set(new_message.sender_type),
        kind: Set(new_message.content.kind()),
        body: Set(new_message.content.to_body()),
        is_read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    Ok(model.insert(db).await?.into())
}

/// Messages of a thread in send order.
pub async fn get_messages<C: ConnectionTrait>(
    db: &C,
    filter: &MessageFilter,
) -> Result<Vec<MessageView>, ServiceError> {
    get_messages_after(db, filter, 0, u64::MAX).await
}

pub async fn get_order_messages<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
) -> Result<Vec<MessageView>, ServiceError> {
    orders::get_order(db, order_id).await?;
    get_messages(db, &MessageFilter::order(order_id)).await
}

/// Up to `limit` messages with id greater than `after`, ascending.
pub async fn get_messages_after<C: ConnectionTrait>(
    db: &C,
    filter: &MessageFilter,
    after: i32,
    limit: u64,
) -> Result<Vec<MessageView>, ServiceError> {
    let mut query = MessageEntity::find()
        .filter(filter.condition())
        .filter(message::Column::Id.gt(after))
        .order_by_asc(message::Column::Id);
    if limit != u64::MAX {
        query = query.limit(limit);
    }

    Ok(query
        .all(db)
        .await?
        .into_iter()
        .map(MessageView::from)
        .collect())
}

/// Marks as read the messages in the thread that were sent to `reader`.
/// Returns how many rows flipped; already-read rows are left alone, and
/// nothing ever flips back.
pub async fn mark_read<C: ConnectionTrait>(
    db: &C,
    filter: &MessageFilter,
    reader: SenderType,
) -> Result<u64, ServiceError> {
    let result = MessageEntity::update_many()
        .col_expr(message::Column::IsRead, Expr::value(true))
        .filter(filter.condition())
        .filter(message::Column::SenderType.eq(reader.counterpart()))
        .filter(message::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Customer messages the admin has not read yet.
pub async fn count_unread_for_admin<C: ConnectionTrait>(db: &C) -> Result<u64, ServiceError> {
    Ok(MessageEntity::find()
        .filter(message::Column::SenderType.eq(SenderType::Customer))
        .filter(message::Column::IsRead.eq(false))
        .count(db)
        .await?)
}

/// Admin inbox: one entry per thread, most recently active first.
pub async fn list_conversations<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<Conversation>, ServiceError> {
    let rows = MessageEntity::find()
        .order_by_desc(message::Column::Id)
        .all(db)
        .await?;

    let customer_ids: HashSet<i32> = rows.iter().map(|row| row.customer_id).collect();
    let customers: HashMap<i32, customer::Model> = customer::Entity::find()
        .filter(customer::Column::Id.is_in(customer_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|customer| (customer.id, customer))
        .collect();

    let mut conversations: Vec<Conversation> = Vec::new();
    let mut index: HashMap<(i32, Option<i32>), usize> = HashMap::new();

    for row in rows {
        let key = (row.customer_id, row.order_id);
        let unread = row.sender_type == SenderType::Customer && !row.is_read;

        match index.get(&key) {
            Some(&position) => {
                let conversation = &mut conversations[position];
                conversation.message_count += 1;
                conversation.unread_count += unread as u64;
            }
            None => {
                let (customer_name, customer_phone) = customers
                    .get(&row.customer_id)
                    .map(|c| (c.name.clone(), c.phone.clone()))
                    .unwrap_or_default();
                index.insert(key, conversations.len());
                conversations.push(Conversation {
                    customer_id: row.customer_id,
                    customer_name,
                    customer_phone,
                    order_id: row.order_id,
                    last_message: row.into(),
                    message_count: 1,
                    unread_count: unread as u64,
                });
            }
        }
    }

    Ok(conversations)
}
