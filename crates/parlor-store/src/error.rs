use uuid::Uuid;

/// Errors the store can surface on dangling references. Anything else the
/// store does is infallible in-memory work.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    #[error("convo not found: {0}")]
    ConvoNotFound(Uuid),
}
