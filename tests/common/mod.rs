use shop_backend::config::{AdminConfig, DatabaseConfig};
use shop_backend::database::{DbPool, create_pool, run_migrations};
use shop_backend::services::UserService;

pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Fresh in-memory database with the schema applied and one administrator.
pub async fn setup_pool() -> DbPool {
    let pool = create_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .unwrap();
    run_migrations(&pool).await.unwrap();

    UserService::new(pool.clone())
        .ensure_admin(&AdminConfig {
            name: "Administrator".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    pool
}
