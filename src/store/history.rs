//! Per-user history of delivered notifications.

use crate::domain::{FeedbackId, NotificationData, PushNotification, UserId};
use crate::models::{NewNotificationRecord, NotificationRecord};
use crate::schema::notification_history;
use crate::store::StoreError;
use chrono::{DateTime, Duration, Months, Utc};
use diesel::{
    ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, QueryResult, RunQueryDsl,
};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// A notification about to be written to the history.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub notification: PushNotification,
    pub data: NotificationData,
    pub feedback_id: Option<FeedbackId>,
}

/// A history entry as exposed over the API.
#[derive(Debug, serde::Serialize)]
pub struct NotificationEntry {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub data: NotificationData,
    pub feedback_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationRecord> for NotificationEntry {
    type Error = serde_json::Error;

    fn try_from(record: NotificationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            data: NotificationData::from_json(&record.data)?,
            title: record.title,
            body: record.body,
            feedback_id: record.feedback_id,
            created_at: record.created_at,
            is_read: record.is_read,
            read_at: record.read_at,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MarkRead {
    Marked,
    AlreadyRead,
    NotFound,
}

#[derive(Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub read: usize,
    pub this_week: usize,
    pub this_month: usize,
}

impl NotificationStats {
    pub fn compute(entries: &[(DateTime<Utc>, bool)], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let month_ago = now
            .checked_sub_months(Months::new(1))
            .unwrap_or_else(|| now - Duration::days(30));

        entries
            .iter()
            .fold(Self::default(), |mut stats, (created_at, is_read)| {
                stats.total += 1;
                if *is_read {
                    stats.read += 1;
                } else {
                    stats.unread += 1;
                }
                if *created_at > week_ago {
                    stats.this_week += 1;
                }
                if *created_at > month_ago {
                    stats.this_month += 1;
                }
                stats
            })
    }
}

#[tracing::instrument(
    name = "Saving notification history",
    skip(conn, new_notification),
    fields(user_id = %new_notification.user_id)
)]
pub fn record(
    conn: &mut PgConnection,
    new_notification: &NewNotification,
    now: DateTime<Utc>,
) -> Result<i32, StoreError> {
    let data = new_notification.data.to_json()?;
    let id = diesel::insert_into(notification_history::table)
        .values(NewNotificationRecord {
            user_id: new_notification.user_id.as_ref(),
            title: &new_notification.notification.title,
            body: &new_notification.notification.body,
            data: &data,
            feedback_id: new_notification.feedback_id.as_ref().map(AsRef::as_ref),
            created_at: &now,
            is_read: false,
        })
        .returning(notification_history::id)
        .get_result::<i32>(conn)?;
    Ok(id)
}

/// Newest entries first.
#[tracing::instrument(name = "Get notification history", skip(conn), fields(user_id = %user_id))]
pub fn list_for_user(
    conn: &mut PgConnection,
    user_id: &UserId,
    limit: i64,
) -> Result<Vec<NotificationEntry>, StoreError> {
    let records = notification_history::table
        .filter(notification_history::user_id.eq(user_id.as_ref()))
        .order(notification_history::created_at.desc())
        .limit(limit)
        .load::<NotificationRecord>(conn)?;

    records
        .into_iter()
        .map(|record| NotificationEntry::try_from(record).map_err(StoreError::from))
        .collect()
}

/// Only the first call stamps `read_at`.
#[tracing::instrument(name = "Mark notification as read", skip(conn), fields(user_id = %user_id))]
pub fn mark_read(
    conn: &mut PgConnection,
    notification_id: i32,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> QueryResult<MarkRead> {
    let owned_by_user = notification_history::table
        .filter(notification_history::id.eq(notification_id))
        .filter(notification_history::user_id.eq(user_id.as_ref()));

    let unread = owned_by_user
        .clone()
        .filter(notification_history::is_read.eq(false));
    let updated = diesel::update(unread)
        .set((
            notification_history::is_read.eq(true),
            notification_history::read_at.eq(Some(now)),
        ))
        .execute(conn)?;
    if updated > 0 {
        return Ok(MarkRead::Marked);
    }

    let exists = owned_by_user
        .select(notification_history::id)
        .first::<i32>(conn)
        .optional()?;
    Ok(match exists {
        Some(_) => MarkRead::AlreadyRead,
        None => MarkRead::NotFound,
    })
}

#[tracing::instrument(name = "Get notification stats", skip(conn), fields(user_id = %user_id))]
pub fn stats(
    conn: &mut PgConnection,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> QueryResult<NotificationStats> {
    let entries = notification_history::table
        .select((notification_history::created_at, notification_history::is_read))
        .filter(notification_history::user_id.eq(user_id.as_ref()))
        .order(notification_history::created_at.desc())
        .limit(MAX_PAGE_SIZE)
        .load::<(DateTime<Utc>, bool)>(conn)?;
    Ok(NotificationStats::compute(&entries, now))
}
