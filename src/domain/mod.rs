mod feedback;
mod feedback_id;
mod new_token_registration;
mod notification_data;
mod platform;
mod push_notification;
mod push_token;
mod user_id;

pub use feedback::Feedback;
pub use feedback_id::FeedbackId;
pub use new_token_registration::NewTokenRegistration;
pub use notification_data::{DataValue, NotificationData};
pub use platform::Platform;
pub use push_notification::PushNotification;
pub use push_token::PushToken;
pub use user_id::UserId;
