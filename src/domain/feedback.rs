use crate::domain::{FeedbackId, UserId};
use chrono::{DateTime, Utc};

/// A customer feedback entry, owned by the feedback collection system.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub id: FeedbackId,
    pub customer_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub assigned_user_id: Option<UserId>,
}
