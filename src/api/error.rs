use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use std::borrow::Cow;

use crate::constants::RETRY_AFTER;

/// Storage/domain error. Repositories and services return these; handlers map
/// them to `ApiError` together with the request id they are serving.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("User not found")]
    UserNotFound,
    #[error("Token not found")]
    TokenNotFound,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token is invalid")]
    TokenInvalid,
    #[error("Password is invalid")]
    PasswordInvalid,
    #[error("Post not found")]
    PostNotFound,
    #[error("No messages found")]
    NoMessagesFound,
    #[error("Request not authorized")]
    RequestNotAuthorized,
    #[error("Bad request: {0}")]
    BadRequest(Cow<'static, str>),
    // infrastructure errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Cache pool error: {0}")]
    CachePool(#[from] deadpool_redis::PoolError),
    #[error("Cache error: {0}")]
    Cache(#[from] deadpool_redis::redis::RedisError),
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),
    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Hash error")]
    Hash(#[from] argon2::password_hash::Error),
    #[error("Internal error: {0}")]
    Internal(Cow<'static, str>),
}

impl StoreError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::TokenNotFound
            | StoreError::TokenExpired
            | StoreError::TokenInvalid
            | StoreError::PasswordInvalid
            | StoreError::RequestNotAuthorized => StatusCode::UNAUTHORIZED,
            StoreError::UserNotFound | StoreError::PostNotFound | StoreError::NoMessagesFound => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Binds the error to the request being served. Infrastructure details are
    /// logged here and never leak into the response body.
    pub fn api(self, request_id: &str) -> ApiError {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(request_id, error = %self, "internal error");
        }
        ApiError { status, request_id: request_id.to_string() }
    }
}

/// Wire-level error: `{message, request_id, code}` JSON plus a `Retry-After`
/// hint so clients back off instead of hammering a degraded node.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    request_id: String,
}

impl ApiError {
    pub fn unauthorized(request_id: &str) -> Self {
        StoreError::RequestNotAuthorized.api(request_id)
    }

    pub fn bad_request(request_id: &str) -> Self {
        StoreError::bad_request("").api(request_id)
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    message: String,
    request_id: String,
    code: u16,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status)
            .insert_header((header::RETRY_AFTER, RETRY_AFTER))
            .json(ErrorBody {
                message: self.status.canonical_reason().unwrap_or("Error").to_string(),
                request_id: self.request_id.clone(),
                code: self.status.as_u16(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(StoreError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StoreError::PostNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StoreError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(StoreError::TokenNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(StoreError::PasswordInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(StoreError::RequestNotAuthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(StoreError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(StoreError::internal("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_carries_retry_after_and_body() {
        let err = StoreError::RequestNotAuthorized.api("req-1");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), RETRY_AFTER);
    }
}
