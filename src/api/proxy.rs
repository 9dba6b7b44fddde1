//! Reverse-proxy helper for the monolith's dialog and counter pass-through
//! endpoints. Authorization and X-Request-ID travel with the forwarded call;
//! the downstream status and JSON body are returned verbatim.

use actix_web::{http::header, http::StatusCode, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::api::error::StoreError;
use crate::constants::REQUEST_ID_HEADER;

pub async fn forward<B: Serialize>(
    http: &reqwest::Client,
    req: &HttpRequest,
    method: reqwest::Method,
    url: &str,
    body: Option<&B>,
) -> Result<HttpResponse, StoreError> {
    let mut builder = http.request(method, url);

    if let Some(auth) = req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        builder = builder.header(header::AUTHORIZATION.as_str(), auth);
    }
    if let Some(rid) = req.headers().get(REQUEST_ID_HEADER).and_then(|h| h.to_str().ok()) {
        builder = builder.header(REQUEST_ID_HEADER, rid);
    }
    if let Some(body) = body {
        builder = builder.json(body);
    }

    let resp = builder.send().await?;
    let status = StatusCode::from_u16(resp.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = resp.bytes().await?;

    let mut response = HttpResponse::build(status);
    if !bytes.is_empty() {
        response.content_type("application/json");
    }
    Ok(response.body(bytes.to_vec()))
}
