pub mod admin;
pub mod auth;
pub mod health;
pub mod item;
pub mod order;
pub mod user;

pub use admin::admin_config;
pub use auth::auth_config;
pub use item::item_config;
pub use order::order_config;
pub use user::user_config;

use actix_web::web;
use crate::error::{json_error_handler, path_error_handler, query_error_handler};

/// Mounts every endpoint under `/api`, plus a root-level `/health` check.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/health", web::get().to(health::health))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health))
                .configure(auth_config)
                .configure(user_config)
                .configure(item_config)
                .configure(order_config)
                .configure(admin_config),
        );
}
