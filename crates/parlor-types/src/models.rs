use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Convo {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Messages are immutable once posted — no edit or delete semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub convo_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A (user, convo) pairing: the user gets "new since last seen" counts for
/// this convo. At most one per pair. Carries no counter — counts are always
/// derived live from the message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: Uuid,
    pub convo_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A recorded instant at which a user viewed a convo. Owned exclusively by
/// that user's visit history; not addressable outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub convo_id: Uuid,
    pub visited_at: DateTime<Utc>,
}

/// A subscription paired with its live unread count. Derived on every read,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedSubscription {
    pub subscription: Subscription,
    pub new_messages: u64,
}
