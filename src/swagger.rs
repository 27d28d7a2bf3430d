use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{OrderStatus, Role};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::user::get_me,
        handlers::user::update_me,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::item::list_items,
        handlers::item::get_item,
        handlers::item::create_item,
        handlers::item::update_item,
        handlers::item::delete_item,
        handlers::order::create_order,
        handlers::order::get_my_orders,
        handlers::order::get_order,
        handlers::order::list_orders,
        handlers::order::update_order_status,
        handlers::admin::get_dashboard,
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            UpdateUserRequest,
            UpdateProfileRequest,
            UserResponse,
            UserSummary,
            UserOrderSummary,
            UserDetailResponse,
            AuthResponse,
            ItemRequest,
            ItemResponse,
            OrderLineRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderItemResponse,
            OrderResponse,
            StatusCount,
            TopProduct,
            DashboardResponse,
            MessageResponse,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "auth", description = "Registration and login"),
        (name = "user", description = "Accounts"),
        (name = "item", description = "Catalog"),
        (name = "order", description = "Orders"),
        (name = "admin", description = "Administration dashboard"),
    ),
    info(
        title = "Shop Backend API",
        version = "1.0.0",
        description = "REST API for the catalog, accounts and orders of the shop"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
