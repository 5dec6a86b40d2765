use crate::domain::{Feedback, NotificationData};
use unicode_segmentation::UnicodeSegmentation;

const FEEDBACK_PREVIEW_GRAPHEMES: usize = 100;

/// The user-visible part of a push message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Notification announcing a new piece of customer feedback, with the
    /// data payload the mobile app uses to open it.
    pub fn for_feedback(feedback: &Feedback) -> (PushNotification, NotificationData) {
        let notification = PushNotification::new(
            "New customer feedback",
            format!(
                "{}: {}",
                feedback.customer_name,
                preview(&feedback.content, FEEDBACK_PREVIEW_GRAPHEMES)
            ),
        );
        let data = NotificationData::new()
            .with("type", "new_feedback")
            .with("feedback_id", feedback.id.as_ref())
            .with("customer_name", feedback.customer_name.as_str())
            .with("created_at", feedback.created_at.to_rfc3339());
        (notification, data)
    }
}

fn preview(content: &str, max_graphemes: usize) -> String {
    let mut graphemes = content.graphemes(true);
    let head: String = graphemes.by_ref().take(max_graphemes).collect();
    match graphemes.next() {
        Some(_) => format!("{}…", head.trim_end()),
        None => head,
    }
}
