use crate::configuration::PushClientSettings;
use crate::domain::{NotificationData, PushNotification, PushToken};
use crate::push::{MessageId, PushClient, PushError};
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;

/// Client for the FCM HTTP v1 API.
pub struct FcmClient {
    http_client: reqwest::Client,
    send_url: String,
    access_token: Secret<String>,
}

#[derive(serde::Serialize)]
struct SendRequest<'a> {
    validate_only: bool,
    message: Message<'a>,
}

#[derive(serde::Serialize)]
struct Message<'a> {
    token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<&'a PushNotification>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    data: HashMap<String, String>,
}

#[derive(serde::Deserialize)]
struct SendResponse {
    name: String,
}

impl FcmClient {
    pub fn new(settings: &PushClientSettings) -> Result<Self, PushError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            http_client,
            send_url: send_url(&settings.base_url, &settings.project_id),
            access_token: settings.access_token.clone(),
        })
    }

    #[tracing::instrument(
        name = "Calling FCM",
        skip(self, request),
        fields(validate_only = request.validate_only)
    )]
    async fn post(&self, request: &SendRequest<'_>) -> Result<reqwest::Response, PushError> {
        let response = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(request)
            .send()
            .await?;
        Ok(response)
    }
}

fn send_url(base_url: &str, project_id: &str) -> String {
    format!(
        "{}/v1/projects/{}/messages:send",
        base_url.trim_end_matches('/'),
        project_id
    )
}

async fn api_error(response: reqwest::Response) -> PushError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read body>".to_string());
    PushError::Api { status, body }
}

#[async_trait]
impl PushClient for FcmClient {
    async fn validate_token(&self, token: &PushToken) -> Result<bool, PushError> {
        let request = SendRequest {
            validate_only: true,
            message: Message {
                token: token.as_ref(),
                notification: None,
                data: HashMap::new(),
            },
        };
        let response = self.post(&request).await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                tracing::info!(token = %token.redacted(), "FCM rejected the token");
                Ok(false)
            }
            _ => Err(api_error(response).await),
        }
    }

    async fn send_to_token(
        &self,
        token: &PushToken,
        notification: &PushNotification,
        data: &NotificationData,
    ) -> Result<MessageId, PushError> {
        let request = SendRequest {
            validate_only: false,
            message: Message {
                token: token.as_ref(),
                notification: Some(notification),
                data: data.to_string_map(),
            },
        };
        let response = self.post(&request).await?;
        if !response.status().is_success() {
            let error = api_error(response).await;
            tracing::warn!(token = %token.redacted(), error = %error, "FCM refused the message");
            return Err(error);
        }
        let body = response
            .json::<SendResponse>()
            .await
            .map_err(|e| PushError::UnexpectedResponse(e.to_string()))?;
        Ok(body.name)
    }
}
