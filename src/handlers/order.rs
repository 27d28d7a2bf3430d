use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;
use crate::entities::OrderStatus;
use crate::middlewares::{AdminUser, AuthUser};
use crate::models::*;
use crate::services::OrderService;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Empty order, bad quantity or unknown/unavailable item"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.create_order(user.id, request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Created().json(order)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/my-orders",
    tag = "order",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders of the caller, newest first", body = [OrderResponse]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_my_orders(
    order_service: web::Data<OrderService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match order_service.get_user_orders(user.id).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(orders)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = Uuid, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match order_service.get_order(path.into_inner(), &user).await {
        Ok(order) => Ok(HttpResponse::Ok().json(order)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(("status" = Option<String>, Query, description = "PENDING, PROCESSING, COMPLETED or CANCELLED")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders with their owners", body = [OrderResponse]),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    _admin: AdminUser,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<OrderStatus>().ok());

    match order_service.list_orders(status).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(orders)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    tag = "order",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    match order_service
        .update_status(path.into_inner(), request.status)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(order)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/my-orders", web::get().to(get_my_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/status", web::patch().to(update_order_status)),
    );
}
