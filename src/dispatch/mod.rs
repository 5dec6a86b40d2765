//! Turns a "new feedback" event into push notifications for every user who
//! should hear about it, recording each delivery in the history.
//!
//! A request walks `feedback resolved -> recipients resolved -> one send per
//! recipient -> summary`. Failing to resolve the feedback or its recipients
//! aborts the request; a failure for one recipient only shows up in that
//! recipient's outcome.

mod report;

use crate::domain::{
    Feedback, FeedbackId, NotificationData, PushNotification, PushToken, UserId,
};
use crate::push::{MessageId, PushClient, PushError};
use crate::store::{NewNotification, NotificationStore, StoreError};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use report::{DispatchOutcome, DispatchReport, DispatchSummary};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Feedback {0} does not exist")]
    FeedbackNotFound(FeedbackId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What gets sent to, and recorded for, each recipient.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub notification: PushNotification,
    pub data: NotificationData,
    /// Only set for feedback that is known to exist.
    pub feedback_id: Option<FeedbackId>,
}

pub struct NotificationDispatcher {
    push_client: Arc<dyn PushClient>,
    always_notify: Vec<UserId>,
    max_concurrent_sends: usize,
    push_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        push_client: Arc<dyn PushClient>,
        always_notify: Vec<UserId>,
        max_concurrent_sends: usize,
        push_timeout: Duration,
    ) -> Self {
        Self {
            push_client,
            always_notify,
            max_concurrent_sends: max_concurrent_sends.max(1),
            push_timeout,
        }
    }

    #[tracing::instrument(
        name = "Dispatching new feedback notifications",
        skip(self, store),
        fields(feedback_id = %feedback_id)
    )]
    pub async fn notify_new_feedback(
        &self,
        store: &dyn NotificationStore,
        feedback_id: &FeedbackId,
    ) -> Result<DispatchReport, DispatchError> {
        let feedback = store
            .find_feedback(feedback_id)
            .await?
            .ok_or_else(|| DispatchError::FeedbackNotFound(feedback_id.clone()))?;

        let recipients = self.resolve_recipients(&feedback);
        if recipients.is_empty() {
            tracing::info!("No users to notify for this feedback");
            return Ok(DispatchReport::from_outcomes(Vec::new()));
        }

        let (notification, data) = PushNotification::for_feedback(&feedback);
        let delivery = Delivery {
            notification,
            data,
            feedback_id: Some(feedback.id),
        };
        let report = self.dispatch(store, &recipients, &delivery).await;
        tracing::info!(
            total = report.summary.total,
            success_count = report.summary.success_count,
            failure_count = report.summary.failure_count,
            "Feedback notifications processed"
        );
        Ok(report)
    }

    /// The assignee of the feedback followed by the standing recipients,
    /// without duplicates.
    pub fn resolve_recipients(&self, feedback: &Feedback) -> Vec<UserId> {
        let candidates = feedback
            .assigned_user_id
            .iter()
            .chain(self.always_notify.iter());

        let mut unique: Vec<UserId> = Vec::with_capacity(self.always_notify.len() + 1);
        for user_id in candidates {
            if !unique.contains(user_id) {
                unique.push(user_id.clone());
            }
        }
        unique
    }

    /// Sends to every recipient with at most `max_concurrent_sends` in flight.
    /// Outcomes come back in recipient order whatever order the sends finish in.
    pub async fn dispatch(
        &self,
        store: &dyn NotificationStore,
        recipients: &[UserId],
        delivery: &Delivery,
    ) -> DispatchReport {
        let sends: Vec<BoxFuture<'_, DispatchOutcome>> = recipients
            .iter()
            .map(|user_id| self.notify_user(store, user_id, delivery).boxed())
            .collect();
        let outcomes = futures::stream::iter(sends)
            .buffered(self.max_concurrent_sends)
            .collect::<Vec<_>>()
            .await;
        DispatchReport::from_outcomes(outcomes)
    }

    /// Pushes to every active token of the user and records one history entry
    /// if at least one token accepted the message. Never fails: problems are
    /// reported in the returned outcome.
    #[tracing::instrument(name = "Notifying user", skip(self, store, delivery), fields(user_id = %user_id))]
    pub async fn notify_user(
        &self,
        store: &dyn NotificationStore,
        user_id: &UserId,
        delivery: &Delivery,
    ) -> DispatchOutcome {
        let tokens = match store.active_tokens(user_id).await {
            Ok(tokens) => tokens,
            Err(e) => {
                return DispatchOutcome::failed(
                    user_id,
                    None,
                    format!("Failed to look up push tokens: {}", e),
                )
            }
        };
        if tokens.is_empty() {
            return DispatchOutcome::failed(user_id, None, "No active push tokens for user");
        }

        let mut message_id = None;
        let mut errors = Vec::new();
        for token in &tokens {
            match self
                .push_to_token(token, &delivery.notification, &delivery.data)
                .await
            {
                Ok(id) => {
                    message_id.get_or_insert(id);
                }
                Err(e) => {
                    tracing::warn!(token = %token.redacted(), error = %e, "Push to token failed");
                    errors.push(e.to_string());
                }
            }
        }
        let message_id = match message_id {
            Some(id) => id,
            None => return DispatchOutcome::failed(user_id, None, errors.join("; ")),
        };

        let record = NewNotification {
            user_id: user_id.clone(),
            notification: delivery.notification.clone(),
            data: delivery.data.clone(),
            feedback_id: delivery.feedback_id.clone(),
        };
        match store.record_notification(&record).await {
            Ok(_) => DispatchOutcome::sent(user_id, message_id),
            Err(e) => {
                tracing::error!(error = %e, "Notification was sent but could not be recorded");
                DispatchOutcome::failed(
                    user_id,
                    Some(message_id),
                    format!("Notification sent but not recorded: {}", e),
                )
            }
        }
    }

    pub async fn push_to_token(
        &self,
        token: &PushToken,
        notification: &PushNotification,
        data: &NotificationData,
    ) -> Result<MessageId, PushError> {
        self.bounded(self.push_client.send_to_token(token, notification, data))
            .await
    }

    pub async fn validate_token(&self, token: &PushToken) -> Result<bool, PushError> {
        self.bounded(self.push_client.validate_token(token)).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, PushError>>,
    ) -> Result<T, PushError> {
        tokio::time::timeout(self.push_timeout, call)
            .await
            .unwrap_or_else(|_| Err(PushError::Timeout(self.push_timeout)))
    }
}
