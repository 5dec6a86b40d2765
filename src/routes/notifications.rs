use crate::dispatch::{Delivery, DispatchOutcome, DispatchReport, NotificationDispatcher};
use crate::domain::{FeedbackId, NotificationData, PushNotification, PushToken, UserId};
use crate::routes::{ApiError, ApiResponse};
use crate::startup::PushDbConn;
use crate::store::history::{
    self, MarkRead, NotificationEntry, NotificationStats, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use anyhow::Context;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

const TEST_TITLE: &str = "Test Notification";
const TEST_BODY: &str = "This is a test notification from your server";

fn required_user(user_id: Option<String>) -> Result<UserId, ApiError> {
    UserId::parse(user_id.unwrap_or_default()).map_err(ApiError::ValidationError)
}

/// `limit` arrives unparsed so that a malformed value is rejected instead of
/// falling back to the default.
fn page_size(limit: Option<&str>) -> Result<i64, ApiError> {
    let raw = match limit {
        None => return Ok(DEFAULT_PAGE_SIZE),
        Some(raw) => raw,
    };
    match raw.trim().parse::<i64>() {
        Ok(limit) if (1..=MAX_PAGE_SIZE).contains(&limit) => Ok(limit),
        _ => Err(ApiError::ValidationError(format!(
            "limit must be an integer between 1 and {}",
            MAX_PAGE_SIZE
        ))),
    }
}

#[derive(serde::Serialize)]
pub struct HistoryPage {
    count: usize,
    notifications: Vec<NotificationEntry>,
}

#[tracing::instrument(
    name = "Listing notification history",
    skip(conn),
    fields(request_id = %Uuid::new_v4())
)]
#[get("/api/notifications?<user_id>&<limit>")]
pub async fn list_notifications(
    user_id: Option<String>,
    limit: Option<&str>,
    conn: PushDbConn,
) -> Result<Json<ApiResponse<HistoryPage>>, ApiError> {
    let user_id = required_user(user_id)?;
    let limit = page_size(limit)?;

    let notifications = conn
        .run(move |c| history::list_for_user(c, &user_id, limit))
        .await
        .context("Failed to get notification history")?;
    Ok(ApiResponse::data(HistoryPage {
        count: notifications.len(),
        notifications,
    }))
}

#[derive(serde::Deserialize)]
pub struct MarkReadBody {
    user_id: Option<String>,
}

#[tracing::instrument(
    name = "Marking a notification as read",
    skip(body, conn),
    fields(request_id = %Uuid::new_v4())
)]
#[put("/api/notifications/<notification_id>/read", data = "<body>")]
pub async fn mark_notification_read(
    notification_id: i32,
    body: Json<MarkReadBody>,
    conn: PushDbConn,
) -> Result<Json<ApiResponse>, ApiError> {
    let user_id = required_user(body.into_inner().user_id)?;

    let outcome = conn
        .run(move |c| history::mark_read(c, notification_id, &user_id, Utc::now()))
        .await
        .context("Failed to mark notification as read")?;
    match outcome {
        MarkRead::NotFound => Err(ApiError::NotFound("Notification not found".into())),
        MarkRead::Marked | MarkRead::AlreadyRead => {
            Ok(ApiResponse::message("Notification marked as read"))
        }
    }
}

#[tracing::instrument(
    name = "Computing notification stats",
    skip(conn),
    fields(request_id = %Uuid::new_v4())
)]
#[get("/api/notifications/stats?<user_id>")]
pub async fn notification_stats(
    user_id: Option<String>,
    conn: PushDbConn,
) -> Result<Json<ApiResponse<NotificationStats>>, ApiError> {
    let user_id = required_user(user_id)?;
    let stats = conn
        .run(move |c| history::stats(c, &user_id, Utc::now()))
        .await
        .context("Failed to get notification stats")?;
    Ok(ApiResponse::data(stats))
}

#[derive(serde::Deserialize)]
pub struct TestNotificationBody {
    fcm_token: Option<String>,
    title: Option<String>,
    body: Option<String>,
    data: Option<NotificationData>,
}

#[derive(serde::Serialize)]
pub struct SentMessage {
    message_id: String,
}

#[tracing::instrument(
    name = "Sending a test notification",
    skip(body, dispatcher),
    fields(request_id = %Uuid::new_v4())
)]
#[post("/api/notifications/test", data = "<body>")]
pub async fn send_test_notification(
    body: Json<TestNotificationBody>,
    dispatcher: &State<NotificationDispatcher>,
) -> Result<Json<ApiResponse<SentMessage>>, ApiError> {
    let body = body.into_inner();
    let token = match body.fcm_token {
        Some(token) if !token.is_empty() => {
            PushToken::parse(token).map_err(ApiError::ValidationError)?
        }
        _ => return Err(ApiError::ValidationError("fcm_token is required".into())),
    };
    let notification = PushNotification::new(
        body.title.unwrap_or_else(|| TEST_TITLE.into()),
        body.body.unwrap_or_else(|| TEST_BODY.into()),
    );
    let data = body
        .data
        .unwrap_or_default()
        .or_insert_all(NotificationData::new().with("type", "test"));

    let message_id = dispatcher
        .push_to_token(&token, &notification, &data)
        .await
        .map_err(|e| ApiError::PushRejected(e.to_string()))?;
    Ok(ApiResponse::message_with_data(
        "Test notification sent successfully",
        SentMessage { message_id },
    ))
}

#[derive(serde::Deserialize)]
pub struct CustomNotificationBody {
    user_id: Option<String>,
    title: Option<String>,
    body: Option<String>,
    data: Option<NotificationData>,
}

impl CustomNotificationBody {
    fn into_delivery(self) -> Result<(UserId, Delivery), String> {
        let missing = || String::from("user_id, title, and body are required");
        let user_id = self
            .user_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(missing)?;
        let title = self.title.filter(|s| !s.is_empty()).ok_or_else(missing)?;
        let body = self.body.filter(|s| !s.is_empty()).ok_or_else(missing)?;

        let delivery = Delivery {
            notification: PushNotification::new(title, body),
            data: self
                .data
                .unwrap_or_default()
                .or_insert_all(NotificationData::new().with("type", "custom")),
            feedback_id: None,
        };
        Ok((UserId::parse(user_id)?, delivery))
    }
}

#[tracing::instrument(
    name = "Sending a custom notification",
    skip(body, conn, dispatcher),
    fields(request_id = %Uuid::new_v4())
)]
#[post("/api/notifications/send", data = "<body>")]
pub async fn send_custom_notification(
    body: Json<CustomNotificationBody>,
    conn: PushDbConn,
    dispatcher: &State<NotificationDispatcher>,
) -> Result<Json<ApiResponse<DispatchOutcome>>, ApiError> {
    let (user_id, delivery) = body
        .into_inner()
        .into_delivery()
        .map_err(ApiError::ValidationError)?;

    let outcome = dispatcher.notify_user(&conn, &user_id, &delivery).await;
    if !outcome.success {
        return Err(ApiError::PushRejected(
            outcome.error.unwrap_or_else(|| "Unknown push failure".into()),
        ));
    }
    Ok(ApiResponse::message_with_data(
        "Notification sent successfully",
        outcome,
    ))
}

#[derive(serde::Deserialize)]
pub struct NewFeedbackBody {
    feedback_id: Option<String>,
}

#[tracing::instrument(
    name = "Handling a new feedback event",
    skip(body, conn, dispatcher),
    fields(request_id = %Uuid::new_v4())
)]
#[post("/api/notifications/new-feedback", data = "<body>")]
pub async fn notify_new_feedback(
    body: Json<NewFeedbackBody>,
    conn: PushDbConn,
    dispatcher: &State<NotificationDispatcher>,
) -> Result<Json<ApiResponse<DispatchReport>>, ApiError> {
    let feedback_id = FeedbackId::parse(body.into_inner().feedback_id.unwrap_or_default())
        .map_err(ApiError::ValidationError)?;

    let report = dispatcher.notify_new_feedback(&conn, &feedback_id).await?;
    if report.has_no_recipients() {
        return Ok(ApiResponse::message_with_data(
            "No users to notify for this feedback",
            report,
        ));
    }
    Ok(ApiResponse::message_with_data(
        "Feedback notifications processed",
        report,
    ))
}
