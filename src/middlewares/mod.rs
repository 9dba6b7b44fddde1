use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};
use uuid::Uuid;

use crate::api::error::{ApiError, StoreError};
use crate::constants::REQUEST_ID_HEADER;
use crate::modules::user::model::AuthResponse;
use crate::Services;

/// Authenticated caller, inserted into request extensions by the
/// authentication middlewares.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// `X-Request-ID` pass-through; empty when the client sent none.
pub fn request_id(req: &HttpRequest) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Strips the literal `"Bearer "` prefix from an Authorization header value.
pub fn parse_bearer(value: Option<&str>) -> Option<&str> {
    value.and_then(|v| v.strip_prefix("Bearer "))
}

fn bearer_of(req: &ServiceRequest) -> Option<&str> {
    parse_bearer(req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()))
}

fn service_request_id(req: &ServiceRequest) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Monolith-side authentication: validates the bearer token against the token
/// store and stashes the resolved user for handlers.
pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let request_id = service_request_id(&req);
    let token = match bearer_of(&req) {
        Some(token) => token.to_string(),
        None => return Err(ApiError::unauthorized(&request_id).into()),
    };

    let services =
        req.app_data::<web::Data<Services>>().ok_or_else(|| ApiError::unauthorized(&request_id))?;

    let user_id = services
        .users
        .validate_token(&token)
        .await
        .map_err(|_| ApiError::unauthorized(&request_id))?;

    req.extensions_mut().insert(AuthUser(user_id));

    next.call(req).await
}

/// Validates bearer tokens by asking the monolith's `/checkAuth`. Used by the
/// dialogs and counters services, which do not own the token table.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    check_auth_url: String,
}

impl AuthClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            http: reqwest::Client::new(),
            check_auth_url: format!("http://{host}:{port}/api/v2/checkAuth"),
        }
    }

    pub async fn check(&self, token: &str) -> Result<Uuid, StoreError> {
        let resp = self
            .http
            .get(&self.check_auth_url)
            .header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(StoreError::RequestNotAuthorized);
        }
        let auth: AuthResponse = resp.json().await?;
        Ok(auth.user_id)
    }
}

pub async fn remote_authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let request_id = service_request_id(&req);
    let token = match bearer_of(&req) {
        Some(token) => token.to_string(),
        None => return Err(ApiError::unauthorized(&request_id).into()),
    };

    let client = req
        .app_data::<web::Data<AuthClient>>()
        .ok_or_else(|| ApiError::unauthorized(&request_id))?;

    let user_id =
        client.check(&token).await.map_err(|_| ApiError::unauthorized(&request_id))?;

    req.extensions_mut().insert(AuthUser(user_id));

    next.call(req).await
}

pub fn get_extensions<T: Clone + 'static>(req: &HttpRequest) -> Result<T, StoreError> {
    let extensions = req.extensions();
    extensions.get::<T>().cloned().ok_or(StoreError::RequestNotAuthorized)
}
