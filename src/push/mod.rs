mod fcm_client;

use crate::domain::{NotificationData, PushNotification, PushToken};
use async_trait::async_trait;
pub use fcm_client::FcmClient;

/// Identifier the provider assigned to an accepted message.
pub type MessageId = String;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Push provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Push provider returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Push provider did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Unexpected push provider response: {0}")]
    UnexpectedResponse(String),
}

/// The narrow contract this service relies on from a push-messaging provider.
/// Delivery, retries and token lifetimes are the provider's business.
#[async_trait]
pub trait PushClient: Send + Sync {
    /// `Ok(false)` means the provider rejected the token; errors are reserved
    /// for failures to get an answer at all.
    async fn validate_token(&self, token: &PushToken) -> Result<bool, PushError>;

    async fn send_to_token(
        &self,
        token: &PushToken,
        notification: &PushNotification,
        data: &NotificationData,
    ) -> Result<MessageId, PushError>;
}
