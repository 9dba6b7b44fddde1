use actix_web::{get, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::middlewares::{get_extensions, request_id, AuthUser};
use crate::modules::counter::model::UnreadCountResponse;
use crate::modules::counter::repository_pg::CounterRepositoryPg;
use crate::modules::counter::service::CounterService;

pub type CounterSvc = CounterService<CounterRepositoryPg>;

/// Unread count of messages sent by `{user_id}` to the bearer of the token.
#[get("/counters/{user_id}/unreadMessages")]
pub async fn get_unread_messages(
    req: HttpRequest,
    svc: web::Data<CounterSvc>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(recipient_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    let count =
        svc.get_unread(path.into_inner(), recipient_id).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().json(UnreadCountResponse {
        author_id: count.author_id,
        recipient_id: count.recipient_id,
        count: count.count,
    }))
}
