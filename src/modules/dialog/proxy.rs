//! Monolith-side dialog endpoints: thin proxies to the dialogs service.

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use actix_web::web::ServiceConfig;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::proxy::forward;
use crate::constants::PREFIX_V2;
use crate::middlewares::request_id;
use crate::modules::dialog::model::DialogSendModel;
use crate::Services;

fn dialogs_url(svc: &Services, suffix: &str) -> String {
    let dialogs = &svc.config.dialogs;
    format!("http://{}:{}{}{}", dialogs.host, dialogs.port, PREFIX_V2, suffix)
}

#[post("/dialog/{user_id}/send")]
pub async fn send_message_proxy(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
    body: web::Json<DialogSendModel>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let recipient_id = path.into_inner();

    // The recipient must exist before the message crosses service boundaries.
    svc.users.get_by_id(recipient_id).await.map_err(|e| e.api(&rid))?;

    let url = dialogs_url(&svc, &format!("/dialog/{recipient_id}/send"));
    forward(&svc.http, &req, reqwest::Method::POST, &url, Some(&body.into_inner()))
        .await
        .map_err(|e| e.api(&rid))
}

#[get("/dialog/{user_id}/list")]
pub async fn list_dialog_proxy(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let peer_id = path.into_inner();
    let url = dialogs_url(&svc, &format!("/dialog/{peer_id}/list"));
    forward::<()>(&svc.http, &req, reqwest::Method::GET, &url, None)
        .await
        .map_err(|e| e.api(&rid))
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_message_proxy).service(list_dialog_proxy);
}
