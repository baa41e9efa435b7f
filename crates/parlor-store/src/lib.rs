pub mod error;

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use parlor_types::{Convo, Message, User};

pub use error::StoreError;

/// In-memory document store owning User, Convo, and Message records.
///
/// This is the collaborator the engagement engine queries; it answers
/// "messages in convo C with timestamp > T" and nothing cleverer. Interior
/// mutability behind a single Mutex so every call is atomic.
pub struct Store {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    users: HashMap<Uuid, User>,
    convos: HashMap<Uuid, Convo>,
    /// convo_id -> messages, oldest first (append-only).
    messages: HashMap<Uuid, Vec<Message>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }

    fn with_inner<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut StoreInner) -> Result<T>,
    {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("store lock poisoned: {}", e))?;
        f(&mut inner)
    }

    // -- Users --

    pub fn create_user(&self, username: &str) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        self.with_inner(|inner| {
            inner.users.insert(user.id, user.clone());
            Ok(())
        })?;
        debug!(user_id = %user.id, username, "user created");
        Ok(user)
    }

    pub fn user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_inner(|inner| Ok(inner.users.get(&id).cloned()))
    }

    // -- Convos --

    /// Create a convo owned by `owner_id` at an explicit creation time.
    /// The owner must exist. Auto-subscription of the owner is the
    /// engagement engine's job, not the store's.
    pub fn create_convo(
        &self,
        owner_id: Uuid,
        title: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Convo> {
        let convo = self.with_inner(|inner| {
            if !inner.users.contains_key(&owner_id) {
                return Err(StoreError::UserNotFound(owner_id).into());
            }
            let convo = Convo {
                id: Uuid::new_v4(),
                owner_id,
                title: title.to_string(),
                created_at,
            };
            inner.convos.insert(convo.id, convo.clone());
            inner.messages.insert(convo.id, Vec::new());
            Ok(convo)
        })?;
        debug!(convo_id = %convo.id, owner_id = %owner_id, "convo created");
        Ok(convo)
    }

    pub fn convo(&self, id: Uuid) -> Result<Option<Convo>> {
        self.with_inner(|inner| Ok(inner.convos.get(&id).cloned()))
    }

    // -- Messages --

    /// Append a message to a convo. Convo and author must exist.
    pub fn post_message(
        &self,
        convo_id: Uuid,
        author_id: Uuid,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Message> {
        self.with_inner(|inner| {
            if !inner.convos.contains_key(&convo_id) {
                return Err(StoreError::ConvoNotFound(convo_id).into());
            }
            if !inner.users.contains_key(&author_id) {
                return Err(StoreError::UserNotFound(author_id).into());
            }
            let message = Message {
                id: Uuid::new_v4(),
                convo_id,
                author_id,
                body: body.to_string(),
                created_at,
            };
            inner
                .messages
                .entry(convo_id)
                .or_default()
                .push(message.clone());
            Ok(message)
        })
    }

    /// All messages in a convo, oldest first. Unknown convo yields an
    /// empty list rather than an error.
    pub fn messages(&self, convo_id: Uuid) -> Result<Vec<Message>> {
        self.with_inner(|inner| Ok(inner.messages.get(&convo_id).cloned().unwrap_or_default()))
    }

    /// Count of messages in `convo_id` created strictly after `since`.
    /// A convo with no messages counts 0, not an error.
    pub fn count_messages_since(&self, convo_id: Uuid, since: DateTime<Utc>) -> Result<u64> {
        self.with_inner(|inner| {
            let count = inner
                .messages
                .get(&convo_id)
                .map(|msgs| msgs.iter().filter(|m| m.created_at > since).count())
                .unwrap_or(0);
            Ok(count as u64)
        })
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_count_is_strictly_after() {
        let store = Store::new();
        let user = store.create_user("ada").unwrap();
        let convo = store.create_convo(user.id, "general", ts(0)).unwrap();

        store.post_message(convo.id, user.id, "a", ts(10)).unwrap();
        store.post_message(convo.id, user.id, "b", ts(20)).unwrap();

        assert_eq!(store.count_messages_since(convo.id, ts(0)).unwrap(), 2);
        // boundary is exclusive
        assert_eq!(store.count_messages_since(convo.id, ts(10)).unwrap(), 1);
        assert_eq!(store.count_messages_since(convo.id, ts(20)).unwrap(), 0);
    }

    #[test]
    fn test_empty_convo_counts_zero() {
        let store = Store::new();
        let user = store.create_user("ada").unwrap();
        let convo = store.create_convo(user.id, "quiet", ts(0)).unwrap();
        assert_eq!(store.count_messages_since(convo.id, ts(0)).unwrap(), 0);
        // unknown convo also counts zero
        assert_eq!(
            store.count_messages_since(Uuid::new_v4(), ts(0)).unwrap(),
            0
        );
    }

    #[test]
    fn test_dangling_references_rejected() {
        let store = Store::new();
        let user = store.create_user("ada").unwrap();
        assert!(store.create_convo(Uuid::new_v4(), "x", ts(0)).is_err());

        let convo = store.create_convo(user.id, "x", ts(0)).unwrap();
        assert!(store
            .post_message(convo.id, Uuid::new_v4(), "hi", ts(1))
            .is_err());
        assert!(store
            .post_message(Uuid::new_v4(), user.id, "hi", ts(1))
            .is_err());
    }
}
