use chrono::offset::Utc;
use chrono::DateTime;

/// A feedback row without its key, which the caller already holds.
#[derive(Queryable, Debug)]
pub struct FeedbackRow {
    pub customer_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub assigned_user_id: Option<String>,
}
