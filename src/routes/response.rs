use crate::dispatch::DispatchError;
use crate::routes::error_chain_fmt;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::Request;

#[derive(serde::Serialize)]
pub struct ApiResponse<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: None,
        })
    }
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn message_with_data(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }
}

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PushRejected(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ApiError {
    fn status(&self) -> Status {
        match self {
            ApiError::ValidationError(_) | ApiError::PushRejected(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::UnexpectedError(_) => Status::InternalServerError,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "Invalid request",
            ApiError::NotFound(_) => "Not found",
            ApiError::PushRejected(_) => "Failed to send notification",
            ApiError::UnexpectedError(_) => "Internal server error",
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        match self {
            ApiError::UnexpectedError(_) => tracing::error!("ApiError: {:?}", self),
            _ => tracing::warn!("ApiError: {:?}", self),
        }
        let body = ErrorBody {
            success: false,
            error: self.title(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).respond_to(request)
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::FeedbackNotFound(_) => {
                ApiError::NotFound("The specified feedback does not exist".into())
            }
            DispatchError::Store(e) => ApiError::UnexpectedError(
                anyhow::Error::new(e).context("Failed to process new feedback notification"),
            ),
        }
    }
}
