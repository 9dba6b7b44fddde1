use actix_web::{get, post, web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::api::error::{ApiError, StoreError};
use crate::middlewares::{get_extensions, request_id, AuthUser};
use crate::modules::user::model::{
    AuthResponse, LoginModel, LoginResponse, RegisterModel, RegisterResponse, SearchQuery,
    UserResponse,
};
use crate::modules::user::repository_pg::{TokenRepositoryPg, UserRepositoryPg};
use crate::modules::user::service::UserService;
use crate::Services;

pub type UserSvc = UserService<UserRepositoryPg, TokenRepositoryPg>;

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    svc: web::Data<Services>,
    body: web::Json<LoginModel>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let token = svc.users.login(body.id, &body.password).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

#[get("/checkAuth")]
pub async fn check_auth(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let AuthUser(user_id) = get_extensions::<AuthUser>(&req).map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().json(AuthResponse { user_id }))
}

#[post("/user/register")]
pub async fn register(
    req: HttpRequest,
    svc: web::Data<Services>,
    body: web::Json<RegisterModel>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let model = body.into_inner();
    model
        .validate()
        .map_err(|e| StoreError::bad_request(e.to_string()).api(&rid))?;
    let user_id = svc.users.register(model).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().json(RegisterResponse { user_id }))
}

#[get("/user/get/{id}")]
pub async fn get_user(
    req: HttpRequest,
    svc: web::Data<Services>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let user = svc.users.get_by_id(path.into_inner()).await.map_err(|e| e.api(&rid))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[get("/user/search")]
pub async fn search_users(
    req: HttpRequest,
    svc: web::Data<Services>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let rid = request_id(&req);
    let users = svc
        .users
        .search(&query.first_name, &query.second_name)
        .await
        .map_err(|e| e.api(&rid))?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn check_auth_without_identity_is_unauthorized() {
        let app = test::init_service(App::new().service(check_auth)).await;
        let req = test::TestRequest::get()
            .uri("/checkAuth")
            .insert_header(("X-Request-ID", "rid-1"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "10m");

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["request_id"], "rid-1");
        assert_eq!(body["code"], 401);
        assert_eq!(body["message"], "Unauthorized");
    }
}
