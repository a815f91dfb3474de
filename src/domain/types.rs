/// One entry of a list's held-message queue, scraped from a single page of
/// the moderation UI. Ids are list-scoped tokens; the date stays in the
/// server's display format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldMessage {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub reason: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubscription {
    pub email: String,
    pub request_hash: String,
}

/// Wire-level action names for the held-message moderation form buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    Accept,
    Discard,
}

impl MessageAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageAction::Accept => "accept",
            MessageAction::Discard => "discard",
        }
    }
}

/// Wire-level action names for the per-request subscription URLs. The
/// operator's `r`eject choice maps onto `Discard` before it gets here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionAction {
    Accept,
    Discard,
}

impl SubscriptionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionAction::Accept => "accept",
            SubscriptionAction::Discard => "discard",
        }
    }
}

/// Dispositions queued during one pass over one list's held messages,
/// submitted as at most two batches after the operator confirms.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MessageReview {
    pub accept: Vec<String>,
    pub discard: Vec<String>,
}

impl MessageReview {
    pub fn is_empty(&self) -> bool {
        self.accept.is_empty() && self.discard.is_empty()
    }
}
