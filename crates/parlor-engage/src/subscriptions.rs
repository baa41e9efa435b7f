use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use parlor_types::Subscription;

/// Owns the (user, convo) subscription records.
///
/// Per-user subscriptions are kept in creation order, which gives
/// `updated_subscriptions` its "stable for a given snapshot" ordering. A
/// subscription carries no counter — unread counts are derived live by the
/// facade on every read.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    by_user: HashMap<Uuid, Vec<Subscription>>,
}

impl SubscriptionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a subscription exists for the pair. Idempotent: a duplicate
    /// call returns the existing record untouched.
    pub fn subscribe(&mut self, user_id: Uuid, convo_id: Uuid, at: DateTime<Utc>) -> Subscription {
        let subs = self.by_user.entry(user_id).or_default();
        if let Some(existing) = subs.iter().find(|s| s.convo_id == convo_id) {
            return existing.clone();
        }
        let sub = Subscription {
            user_id,
            convo_id,
            created_at: at,
        };
        subs.push(sub.clone());
        sub
    }

    /// Remove the subscription for the pair. Idempotent; returns true if a
    /// record was actually removed.
    pub fn unsubscribe(&mut self, user_id: Uuid, convo_id: Uuid) -> bool {
        let Some(subs) = self.by_user.get_mut(&user_id) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| s.convo_id != convo_id);
        let removed = subs.len() < before;
        if subs.is_empty() {
            self.by_user.remove(&user_id);
        }
        removed
    }

    pub fn get(&self, user_id: Uuid, convo_id: Uuid) -> Option<&Subscription> {
        self.by_user
            .get(&user_id)?
            .iter()
            .find(|s| s.convo_id == convo_id)
    }

    /// All subscriptions of `user_id`, in creation order.
    pub fn subscriptions_of(&self, user_id: Uuid) -> &[Subscription] {
        self.by_user.get(&user_id).map_or(&[], |v| v.as_slice())
    }

    pub fn count_for(&self, user_id: Uuid) -> usize {
        self.by_user.get(&user_id).map_or(0, |v| v.len())
    }
}

/// Baseline timestamp for counting new messages: last visit if recorded,
/// else the subscription's creation time, else epoch zero (count
/// everything). The epoch arm only fires for records missing a sensible
/// creation time, e.g. legacy data fed in from outside.
pub fn count_baseline(
    last_visit: Option<DateTime<Utc>>,
    subscribed_at: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    last_visit
        .or(subscribed_at)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
