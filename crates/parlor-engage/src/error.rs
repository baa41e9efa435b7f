use uuid::Uuid;

/// Engine error taxonomy. Absence ("no such subscription") is an error,
/// distinct from a zero count; invariant violations never surface — the
/// idempotent operations self-heal instead.
#[derive(Debug, thiserror::Error)]
pub enum EngageError {
    #[error("convo not found: {0}")]
    ConvoNotFound(Uuid),

    #[error("no subscription for user {user_id} on convo {convo_id}")]
    SubscriptionNotFound { user_id: Uuid, convo_id: Uuid },
}
