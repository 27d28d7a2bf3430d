use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;
use crate::middlewares::{AdminUser, AuthUser};
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn get_me(user_service: web::Data<UserService>, user: AuthUser) -> Result<HttpResponse> {
    match user_service.get_user(user.id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/me",
    tag = "user",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_me(
    user_service: web::Data<UserService>,
    user: AuthUser,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    match user_service.update_profile(user.id, request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    _admin: AdminUser,
) -> Result<HttpResponse> {
    match user_service.list_users().await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User with order summary", body = UserDetailResponse),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match user_service.get_user_detail(path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(detail)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    match user_service
        .update_user(path.into_inner(), request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(user)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User and their orders deleted"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    log::info!("Admin {} deleting user {}", admin.0.id, user_id);

    match user_service.delete_user(user_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/me", web::get().to(get_me))
            .route("/me", web::put().to(update_me))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
