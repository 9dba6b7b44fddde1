use actix_web::{put, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::middlewares::{get_extensions, request_id, AuthUser};
use crate::modules::friend::repository_pg::FriendRepositoryPg;
use crate::modules::friend::service::FriendService;
use crate::Services;

pub type FriendSvc = FriendService<FriendRepositoryPg>;

#[put("/friend/add/{user_id}")]
pub async fn add_friend(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(user_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    svc.friends.add_friend(user_id, path.into_inner()).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().finish())
}

#[put("/friend/delete/{user_id}")]
pub async fn delete_friend(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(user_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    svc.friends.delete_friend(user_id, path.into_inner()).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().finish())
}
