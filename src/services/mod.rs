pub mod auth_service;
pub mod dashboard_service;
pub mod item_service;
pub mod order_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::*;
pub use dashboard_service::*;
pub use item_service::*;
pub use order_service::*;
pub use user_service::*;
