pub mod auth;
pub mod cors;

pub use auth::{AdminUser, AuthMiddleware, AuthUser, get_current_user};
pub use cors::create_cors;
