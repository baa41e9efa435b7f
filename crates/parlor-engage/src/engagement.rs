use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use parlor_store::Store;
use parlor_types::{Convo, Subscription, UpdatedSubscription};

use crate::error::EngageError;
use crate::follow::FollowGraph;
use crate::subscriptions::{count_baseline, SubscriptionTracker};
use crate::visits::VisitHistory;

/// Per-user engagement facade. This is the only surface the web layer
/// calls; it composes the visit histories, the follow graph, and the
/// subscription tracker over the shared store.
///
/// Cheap to clone — all state lives behind one shared inner.
#[derive(Clone)]
pub struct Engagement {
    inner: Arc<EngagementInner>,
}

struct EngagementInner {
    store: Arc<Store>,
    /// user_id -> bounded visit history. The write lock serializes visit
    /// mutations; read paths hold the read lock across both the last-visit
    /// read and the message count so a concurrent visit cannot produce an
    /// in-between count.
    visits: RwLock<HashMap<Uuid, VisitHistory>>,
    follows: RwLock<FollowGraph>,
    subscriptions: RwLock<SubscriptionTracker>,
}

impl Engagement {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            inner: Arc::new(EngagementInner {
                store,
                visits: RwLock::new(HashMap::new()),
                follows: RwLock::new(FollowGraph::new()),
                subscriptions: RwLock::new(SubscriptionTracker::new()),
            }),
        }
    }

    // -- Convo lifecycle --

    /// Create a convo and auto-subscribe its owner, stamped with the
    /// convo's creation time.
    pub async fn create_convo(
        &self,
        owner_id: Uuid,
        title: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Convo> {
        let convo = self.inner.store.create_convo(owner_id, title, created_at)?;
        self.inner
            .subscriptions
            .write()
            .await
            .subscribe(owner_id, convo.id, convo.created_at);
        info!(convo_id = %convo.id, owner_id = %owner_id, "convo created, owner subscribed");
        Ok(convo)
    }

    // -- Visits --

    /// Record that `user_id` viewed `convo_id` now.
    pub async fn visit(&self, user_id: Uuid, convo_id: Uuid) -> Result<()> {
        self.visit_at(user_id, convo_id, Utc::now()).await
    }

    /// Record a visit with an explicit timestamp. Revisiting an
    /// already-recorded convo is a no-op (no timestamp refresh).
    pub async fn visit_at(
        &self,
        user_id: Uuid,
        convo_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if self.inner.store.convo(convo_id)?.is_none() {
            return Err(EngageError::ConvoNotFound(convo_id).into());
        }
        let mut visits = self.inner.visits.write().await;
        let appended = visits.entry(user_id).or_default().visit(convo_id, at);
        if appended {
            debug!(user_id = %user_id, convo_id = %convo_id, "visit recorded");
        }
        Ok(())
    }

    pub async fn visit_count(&self, user_id: Uuid) -> usize {
        self.inner
            .visits
            .read()
            .await
            .get(&user_id)
            .map_or(0, |h| h.len())
    }

    /// Visited convos, most-recently-visited first. Ids that no longer
    /// resolve in the store are skipped.
    pub async fn visited_convos(&self, user_id: Uuid) -> Result<Vec<Convo>> {
        let visits = self.inner.visits.read().await;
        let Some(history) = visits.get(&user_id) else {
            return Ok(Vec::new());
        };
        let mut convos = Vec::with_capacity(history.len());
        for visit in history.visited() {
            match self.inner.store.convo(visit.convo_id)? {
                Some(convo) => convos.push(convo),
                None => warn!(convo_id = %visit.convo_id, "visited convo missing from store, skipping"),
            }
        }
        Ok(convos)
    }

    // -- Follow graph --

    pub async fn follow(&self, follower_id: Uuid, followee_id: Uuid) {
        self.inner.follows.write().await.follow(follower_id, followee_id);
    }

    pub async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) {
        self.inner
            .follows
            .write()
            .await
            .unfollow(follower_id, followee_id);
    }

    /// "Is `follower_id` among `followee_id`'s followers?"
    pub async fn is_followed_by(&self, followee_id: Uuid, follower_id: Uuid) -> bool {
        self.inner
            .follows
            .read()
            .await
            .is_followed_by(followee_id, follower_id)
    }

    // -- Subscriptions --

    /// Explicitly subscribe a user to a convo now. Idempotent.
    pub async fn subscribe(&self, user_id: Uuid, convo_id: Uuid) -> Result<Subscription> {
        self.subscribe_at(user_id, convo_id, Utc::now()).await
    }

    /// Subscribe with an explicit creation timestamp, the baseline for
    /// unread counts until the first visit.
    pub async fn subscribe_at(
        &self,
        user_id: Uuid,
        convo_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Subscription> {
        if self.inner.store.convo(convo_id)?.is_none() {
            return Err(EngageError::ConvoNotFound(convo_id).into());
        }
        let sub = self
            .inner
            .subscriptions
            .write()
            .await
            .subscribe(user_id, convo_id, at);
        Ok(sub)
    }

    /// Remove the subscription if present. Idempotent.
    pub async fn unsubscribe(&self, user_id: Uuid, convo_id: Uuid) {
        self.inner
            .subscriptions
            .write()
            .await
            .unsubscribe(user_id, convo_id);
    }

    pub async fn subscription_count(&self, user_id: Uuid) -> usize {
        self.inner.subscriptions.read().await.count_for(user_id)
    }

    /// Messages in `convo_id` newer than the user's last visit (or the
    /// subscription's creation time if never visited). Always computed
    /// live; a missing subscription is an error, never conflated with a
    /// zero count.
    pub async fn new_messages_count(&self, user_id: Uuid, convo_id: Uuid) -> Result<u64> {
        let subscriptions = self.inner.subscriptions.read().await;
        let sub = subscriptions
            .get(user_id, convo_id)
            .cloned()
            .ok_or(EngageError::SubscriptionNotFound { user_id, convo_id })?;
        drop(subscriptions);

        let visits = self.inner.visits.read().await;
        self.count_for_subscription(&visits, &sub)
    }

    /// Subscriptions with at least one new message, each paired with its
    /// live count. Zero-count subscriptions are wholly absent. Order is the
    /// user's subscription creation order.
    pub async fn updated_subscriptions(&self, user_id: Uuid) -> Result<Vec<UpdatedSubscription>> {
        let subscriptions = self.inner.subscriptions.read().await;
        let subs: Vec<Subscription> = subscriptions.subscriptions_of(user_id).to_vec();
        drop(subscriptions);

        let visits = self.inner.visits.read().await;
        let mut updated = Vec::new();
        for sub in subs {
            let count = self.count_for_subscription(&visits, &sub)?;
            if count > 0 {
                updated.push(UpdatedSubscription {
                    subscription: sub,
                    new_messages: count,
                });
            }
        }
        Ok(updated)
    }

    /// The two reads — last visit time and message count — happen under the
    /// caller's visits lock, so a concurrent visit cannot slip in between.
    fn count_for_subscription(
        &self,
        visits: &HashMap<Uuid, VisitHistory>,
        sub: &Subscription,
    ) -> Result<u64> {
        let last_visit = visits
            .get(&sub.user_id)
            .and_then(|h| h.last_visit_time(sub.convo_id));
        let since = count_baseline(last_visit, Some(sub.created_at));
        self.inner.store.count_messages_since(sub.convo_id, since)
    }
}
