use crate::dispatch::NotificationDispatcher;
use crate::domain::{NewTokenRegistration, Platform, PushToken, UserId};
use crate::routes::{ApiError, ApiResponse};
use crate::startup::PushDbConn;
use crate::store::tokens;
use anyhow::Context;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct RegisterTokenBody {
    fcm_token: Option<String>,
    platform: Option<String>,
    user_id: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct RemoveTokenBody {
    fcm_token: Option<String>,
    user_id: Option<String>,
}

fn required_pair(
    fcm_token: Option<String>,
    user_id: Option<String>,
) -> Result<(PushToken, UserId), String> {
    match (fcm_token, user_id) {
        (Some(token), Some(user_id)) if !token.is_empty() && !user_id.trim().is_empty() => {
            Ok((PushToken::parse(token)?, UserId::parse(user_id)?))
        }
        _ => Err("fcm_token and user_id are required".into()),
    }
}

impl TryFrom<RegisterTokenBody> for NewTokenRegistration {
    type Error = String;

    fn try_from(body: RegisterTokenBody) -> Result<Self, Self::Error> {
        let (token, user_id) = required_pair(body.fcm_token, body.user_id)?;
        let platform = Platform::parse(body.platform.as_deref().unwrap_or_default())?;
        Ok(NewTokenRegistration {
            user_id,
            token,
            platform,
        })
    }
}

#[tracing::instrument(
    name = "Registering a push token",
    skip(body, conn, dispatcher),
    fields(request_id = %Uuid::new_v4())
)]
#[post("/api/user/fcm-token", data = "<body>")]
pub async fn register_token(
    body: Json<RegisterTokenBody>,
    conn: PushDbConn,
    dispatcher: &State<NotificationDispatcher>,
) -> Result<Json<ApiResponse>, ApiError> {
    let registration: NewTokenRegistration = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;

    let valid = dispatcher
        .validate_token(&registration.token)
        .await
        .context("Failed to validate FCM token")?;
    if !valid {
        return Err(ApiError::ValidationError(
            "The provided FCM token is not valid".into(),
        ));
    }

    conn.run(move |c| tokens::register(c, &registration, Utc::now()))
        .await
        .context("Failed to save FCM token")?;
    Ok(ApiResponse::message("FCM token saved successfully"))
}

#[tracing::instrument(
    name = "Removing a push token",
    skip(body, conn),
    fields(request_id = %Uuid::new_v4())
)]
#[delete("/api/user/fcm-token", data = "<body>")]
pub async fn remove_token(
    body: Json<RemoveTokenBody>,
    conn: PushDbConn,
) -> Result<Json<ApiResponse>, ApiError> {
    let body = body.into_inner();
    let (token, user_id) =
        required_pair(body.fcm_token, body.user_id).map_err(ApiError::ValidationError)?;

    let removed = conn
        .run(move |c| tokens::unregister(c, &user_id, &token))
        .await
        .context("Failed to remove FCM token")?;
    tracing::info!(removed, "Push token removal processed");
    Ok(ApiResponse::message("FCM token removed successfully"))
}
