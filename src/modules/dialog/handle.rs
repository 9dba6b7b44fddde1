use actix_web::{get, post, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::middlewares::{get_extensions, request_id, AuthUser};
use crate::modules::dialog::model::{DialogMessageResponse, DialogSendModel};
use crate::modules::dialog::repository_pg::DialogRepositoryPg;
use crate::modules::dialog::service::DialogService;

pub type DialogSvc = DialogService<DialogRepositoryPg>;

#[post("/dialog/{user_id}/send")]
pub async fn send_message(
    req: HttpRequest,
    svc: web::Data<DialogSvc>,
    path: web::Path<Uuid>,
    body: web::Json<DialogSendModel>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(author_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    svc.send_message(author_id, path.into_inner(), &body.text)
        .await
        .map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/dialog/{user_id}/list")]
pub async fn list_dialog(
    req: HttpRequest,
    svc: web::Data<DialogSvc>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(viewer_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    let messages =
        svc.list_dialog(viewer_id, path.into_inner()).await.map_err(|e| e.api(&rid))?;
    let messages: Vec<DialogMessageResponse> =
        messages.into_iter().map(DialogMessageResponse::from).collect();
    Ok(HttpResponse::Ok().json(messages))
}
