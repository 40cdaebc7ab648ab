use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use directory_store::{RemoteError, StoreError};
use shared_types::{ErrorResponse, FieldError, ValidationErrorResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Please fix the highlighted fields")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound(e.to_string()),
            StoreError::Conflict(_) | StoreError::UploadInProgress => {
                ApiError::Conflict(e.to_string())
            }
            StoreError::InvalidLogo(_) => ApiError::BadRequest(e.to_string()),
            StoreError::Remote(RemoteError::Duplicate(_)) => ApiError::Conflict(e.to_string()),
            StoreError::Remote(_) => ApiError::Backend(e.to_string()),
            StoreError::Seed(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RemoteError> for ApiError {
    fn from(e: RemoteError) -> Self {
        StoreError::from(e).into()
    }
}

impl actix_web::error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(fields) => {
                HttpResponse::build(self.status_code()).json(ValidationErrorResponse {
                    error: self.to_string(),
                    fields: fields.clone(),
                })
            }
            _ => HttpResponse::build(self.status_code()).json(ErrorResponse {
                error: self.to_string(),
            }),
        }
    }
}
