use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;
use crate::middlewares::AdminUser;
use crate::models::*;
use crate::services::ItemService;

#[utoipa::path(
    get,
    path = "/items",
    tag = "item",
    params(("available" = Option<bool>, Query, description = "Only available items when true")),
    responses(
        (status = 200, description = "Catalog", body = [ItemResponse])
    )
)]
pub async fn list_items(
    item_service: web::Data<ItemService>,
    query: web::Query<ItemQuery>,
) -> Result<HttpResponse> {
    match item_service.list_items(&query).await {
        Ok(items) => Ok(HttpResponse::Ok().json(items)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "item",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    item_service: web::Data<ItemService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match item_service.get_item(path.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(item)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/items",
    tag = "item",
    request_body = ItemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn create_item(
    item_service: web::Data<ItemService>,
    _admin: AdminUser,
    request: web::Json<ItemRequest>,
) -> Result<HttpResponse> {
    match item_service.create_item(request.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Created().json(item)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "item",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = ItemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item replaced", body = ItemResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    item_service: web::Data<ItemService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    request: web::Json<ItemRequest>,
) -> Result<HttpResponse> {
    match item_service
        .update_item(path.into_inner(), request.into_inner())
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(item)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "item",
    params(("id" = Uuid, Path, description = "Item id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 200, description = "Item is part of past orders and was marked unavailable", body = MessageResponse),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    item_service: web::Data<ItemService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match item_service.delete_item(path.into_inner()).await {
        Ok(ItemDeletion::Deleted) => Ok(HttpResponse::NoContent().finish()),
        Ok(ItemDeletion::MarkedUnavailable) => Ok(HttpResponse::Ok().json(MessageResponse::new(
            "Item marked as unavailable because it is part of existing orders",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn item_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/items")
            .route("", web::get().to(list_items))
            .route("", web::post().to(create_item))
            .route("/{id}", web::get().to(get_item))
            .route("/{id}", web::put().to(update_item))
            .route("/{id}", web::delete().to(delete_item)),
    );
}
