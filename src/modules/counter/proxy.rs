//! Monolith-side counters endpoint: a thin proxy to the counters service.

use actix_web::web::ServiceConfig;
use actix_web::{get, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::proxy::forward;
use crate::constants::PREFIX_V2;
use crate::middlewares::request_id;
use crate::Services;

#[get("/counters/{user_id}/unreadMessages")]
pub async fn get_unread_messages_proxy(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let author_id = path.into_inner();
    let counters = &svc.config.counters;
    let url = format!(
        "http://{}:{}{}/counters/{}/unreadMessages",
        counters.host, counters.port, PREFIX_V2, author_id
    );
    forward::<()>(&svc.http, &req, reqwest::Method::GET, &url, None)
        .await
        .map_err(|e| e.api(&rid))
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_unread_messages_proxy);
}
