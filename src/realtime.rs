//! In-process change feed for chat messages.
//!
//! Every committed message is published to the hub under three topics: its
//! order thread (if any), its customer, and the admin-wide feed. Subscribers
//! receive an ordered, duplicate-free stream. A live event only wakes the
//! subscriber; the messages themselves are read from the database by id, so
//! publishes that arrive out of order or overflow the broadcast buffer never
//! lose a committed message.

use dashmap::DashMap;
use futures::{stream, Stream};
use sea_orm::DatabaseConnection;
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::warn;

use crate::error::ServiceError;
use crate::services::messages::{self, MessageFilter, MessageView};

const CHANNEL_CAPACITY: usize = 256;
const BACKFILL_BATCH: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    All,
    Customer(i32),
    Order(i32),
}

impl Topic {
    pub fn for_filter(filter: &MessageFilter) -> Self {
        match (filter.order_id, filter.customer_id) {
            (Some(order_id), _) => Topic::Order(order_id),
            (None, Some(customer_id)) => Topic::Customer(customer_id),
            (None, None) => Topic::All,
        }
    }
}

type Channels = DashMap<Topic, broadcast::Sender<Arc<MessageView>>>;

/// Topic-keyed broadcast channels, created on first subscription and removed
/// when their last receiver goes away.
pub struct MessageHub {
    channels: Arc<Channels>,
    capacity: usize,
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHub {
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity,
        }
    }

    pub fn subscribe(&self, topic: Topic) -> TopicReceiver {
        let rx = self
            .channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        TopicReceiver {
            rx: Some(rx),
            topic,
            channels: Arc::clone(&self.channels),
        }
    }

    /// Fans a committed message out to every topic it belongs to.
    pub fn publish(&self, message: MessageView) {
        let message = Arc::new(message);
        let mut topics = vec![Topic::All, Topic::Customer(message.customer_id)];
        if let Some(order_id) = message.order_id {
            topics.push(Topic::Order(order_id));
        }

        for topic in topics {
            if let Some(sender) = self.channels.get(&topic) {
                let _ = sender.send(Arc::clone(&message));
            }
        }
    }

    pub fn topic_count(&self) -> usize {
        self.channels.len()
    }
}

/// A receiver on one topic. Dropping the last one for a topic removes the
/// topic from the hub.
pub struct TopicReceiver {
    rx: Option<broadcast::Receiver<Arc<MessageView>>>,
    topic: Topic,
    channels: Arc<Channels>,
}

impl TopicReceiver {
    pub async fn recv(&mut self) -> Result<Arc<MessageView>, RecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => Err(RecvError::Closed),
        }
    }

    pub fn try_recv(&mut self) -> Result<Arc<MessageView>, TryRecvError> {
        match self.rx.as_mut() {
            Some(rx) => rx.try_recv(),
            None => Err(TryRecvError::Closed),
        }
    }
}

impl Drop for TopicReceiver {
    fn drop(&mut self) {
        drop(self.rx.take());
        self.channels
            .remove_if(&self.topic, |_, sender| sender.receiver_count() == 0);
    }
}

struct Subscription {
    db: Arc<DatabaseConnection>,
    rx: TopicReceiver,
    filter: MessageFilter,
    last_id: i32,
    pending: VecDeque<MessageView>,
    needs_backfill: bool,
    done: bool,
}

/// Streams messages matching `filter` with id greater than `after`: first the
/// stored ones, then live ones as they are published.
pub fn subscribe_to_messages(
    db: Arc<DatabaseConnection>,
    hub: &MessageHub,
    filter: MessageFilter,
    after: i32,
) -> impl Stream<Item = Result<MessageView, ServiceError>> + Send + 'static {
    // Subscribe before the first back-fill query so nothing committed in
    // between is missed. Overlap is removed by the id check.
    let rx = hub.subscribe(Topic::for_filter(&filter));
    let state = Subscription {
        db,
        rx,
        filter,
        last_id: after,
        pending: VecDeque::new(),
        needs_backfill: true,
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }

        loop {
            if let Some(message) = state.pending.pop_front() {
                if message.id <= state.last_id {
                    continue;
                }
                state.last_id = message.id;
                return Some((Ok(message), state));
            }

            if state.needs_backfill {
                match messages::get_messages_after(
                    state.db.as_ref(),
                    &state.filter,
                    state.last_id,
                    BACKFILL_BATCH,
                )
                .await
                {
                    Ok(rows) => {
                        state.needs_backfill = rows.len() as u64 == BACKFILL_BATCH;
                        state.pending.extend(rows);
                        continue;
                    }
                    Err(err) => {
                        state.done = true;
                        return Some((Err(err), state));
                    }
                }
            }

            match state.rx.recv().await {
                Ok(message) => {
                    if message.id > state.last_id && state.filter.matches(&message) {
                        state.needs_backfill = true;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, last_id = state.last_id, "Subscriber lagged, back-filling");
                    state.needs_backfill = true;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::message::SenderType;
    use crate::services::content::MessageContent;
    use chrono::Utc;

    fn view(id: i32, customer_id: i32, order_id: Option<i32>) -> MessageView {
        MessageView {
            id,
            customer_id,
            order_id,
            sender_type: SenderType::Customer,
            content: MessageContent::Text {
                body: format!("message {id}"),
            },
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_matching_topic() {
        let hub = MessageHub::new();
        let mut all = hub.subscribe(Topic::All);
        let mut customer = hub.subscribe(Topic::Customer(1));
        let mut order = hub.subscribe(Topic::Order(9));
        let mut other_order = hub.subscribe(Topic::Order(10));

        hub.publish(view(5, 1, Some(9)));

        assert_eq!(all.recv().await.unwrap().id, 5);
        assert_eq!(customer.recv().await.unwrap().id, 5);
        assert_eq!(order.recv().await.unwrap().id, 5);
        assert!(other_order.try_recv().is_err());
    }

    #[tokio::test]
    async fn topics_go_away_with_their_last_receiver() {
        let hub = MessageHub::new();
        let first = hub.subscribe(Topic::Order(3));
        let second = hub.subscribe(Topic::Order(3));
        let other = hub.subscribe(Topic::Customer(2));
        assert_eq!(hub.topic_count(), 2);

        drop(first);
        assert_eq!(hub.topic_count(), 2);
        drop(second);
        assert_eq!(hub.topic_count(), 1);
        drop(other);
        assert_eq!(hub.topic_count(), 0);

        hub.publish(view(1, 2, Some(3)));
        assert_eq!(hub.topic_count(), 0);
    }

    #[tokio::test]
    async fn resubscribing_after_a_drop_gets_a_fresh_channel() {
        let hub = MessageHub::new();
        drop(hub.subscribe(Topic::All));
        let mut all = hub.subscribe(Topic::All);

        hub.publish(view(4, 1, None));
        assert_eq!(all.recv().await.unwrap().id, 4);
    }
}
