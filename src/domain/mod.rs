pub mod detail;
pub mod types;

pub use detail::MessageDetail;
pub use types::{HeldMessage, MessageAction, MessageReview, PendingSubscription, SubscriptionAction};
