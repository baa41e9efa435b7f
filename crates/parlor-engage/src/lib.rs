pub mod engagement;
pub mod error;
pub mod follow;
pub mod subscriptions;
pub mod visits;

pub use engagement::Engagement;
pub use error::EngageError;
pub use follow::FollowGraph;
pub use subscriptions::SubscriptionTracker;
pub use visits::{VisitHistory, MAX_VISITS};
