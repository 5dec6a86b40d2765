pub mod feedback;
pub mod history;
pub mod tokens;

use crate::domain::{Feedback, FeedbackId, PushToken, UserId};
use crate::startup::PushDbConn;
use async_trait::async_trait;
use chrono::Utc;
use diesel_migrations::{embed_migrations, EmbeddedMigrations};
pub use history::NewNotification;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Notification data could not be converted: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The queries the notification dispatcher needs from the relational store.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn find_feedback(&self, id: &FeedbackId) -> Result<Option<Feedback>, StoreError>;

    async fn active_tokens(&self, user_id: &UserId) -> Result<Vec<PushToken>, StoreError>;

    async fn record_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<i32, StoreError>;
}

#[async_trait]
impl NotificationStore for PushDbConn {
    async fn find_feedback(&self, id: &FeedbackId) -> Result<Option<Feedback>, StoreError> {
        let id = id.clone();
        self.run(move |c| feedback::find(c, &id))
            .await
            .map_err(StoreError::from)
    }

    async fn active_tokens(&self, user_id: &UserId) -> Result<Vec<PushToken>, StoreError> {
        let user_id = user_id.clone();
        self.run(move |c| tokens::list_active(c, &user_id, Utc::now()))
            .await
            .map_err(StoreError::from)
    }

    async fn record_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<i32, StoreError> {
        let notification = notification.clone();
        self.run(move |c| history::record(c, &notification, Utc::now()))
            .await
    }
}
