pub mod models;

pub use models::{Convo, Message, Subscription, UpdatedSubscription, User, Visit};
