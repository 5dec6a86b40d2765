use crate::schema::notification_history;
use chrono::offset::Utc;
use chrono::DateTime;

#[derive(Queryable, Debug)]
pub struct NotificationRecord {
    pub id: i32,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub data: String,
    pub feedback_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Insertable)]
#[diesel(table_name = notification_history)]
pub struct NewNotificationRecord<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub data: &'a str,
    pub feedback_id: Option<&'a str>,
    pub created_at: &'a DateTime<Utc>,
    pub is_read: bool,
}
