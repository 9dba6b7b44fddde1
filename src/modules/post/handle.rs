use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::constants::FEED_DEFAULT_LIMIT;
use crate::middlewares::{get_extensions, request_id, AuthUser};
use crate::modules::post::model::{FeedQuery, PostCreateModel, PostResponse, PostUpdateModel};
use crate::modules::post::repository_pg::PostRepositoryPg;
use crate::modules::post::service::PostService;
use crate::Services;

pub type PostSvc = PostService<PostRepositoryPg>;

#[post("/post/create")]
pub async fn create_post(
    req: HttpRequest,
    svc: web::Data<Services>,
    body: web::Json<PostCreateModel>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(user_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    svc.posts.create_post(user_id, &body.text).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().finish())
}

#[put("/post/delete/{id}")]
pub async fn delete_post(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    svc.posts.delete_post(path.into_inner()).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/post/get/{id}")]
pub async fn get_post(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let post = svc.posts.get_post(path.into_inner()).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

#[put("/post/update")]
pub async fn update_post(
    req: HttpRequest,
    svc: web::Data<Services>,
    body: web::Json<PostUpdateModel>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    svc.posts.update_post(body.id, &body.text).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/post/feed")]
pub async fn feed(
    req: HttpRequest,
    svc: web::Data<Services>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(user_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(FEED_DEFAULT_LIMIT);
    let posts = svc.feed.feed_posts(user_id, offset, limit).await.map_err(|e| e.api(&rid))?;
    let posts: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(HttpResponse::Ok().json(posts))
}
