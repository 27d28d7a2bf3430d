use actix_web::{HttpResponse, ResponseError, Result, web};
use crate::middlewares::AdminUser;
use crate::services::DashboardService;

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Store statistics", body = crate::models::DashboardResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn get_dashboard(
    dashboard_service: web::Data<DashboardService>,
    _admin: AdminUser,
) -> Result<HttpResponse> {
    match dashboard_service.get_dashboard().await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(dashboard)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").route("/dashboard", web::get().to(get_dashboard)));
}
