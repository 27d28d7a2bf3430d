//! In-memory SQLite fixtures shared by the service tests.

use crate::config::DatabaseConfig;
use crate::database::{create_pool, run_migrations};
use crate::entities::{
    OrderStatus, Role, item_entity as items, order_entity as orders,
    order_item_entity as order_items, user_entity as users,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

/// A single connection keeps the in-memory database alive for the whole test.
pub async fn test_pool() -> DatabaseConnection {
    let pool = create_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

pub async fn seed_user(
    pool: &DatabaseConnection,
    name: &str,
    email: &str,
    role: Role,
) -> users::Model {
    let now = Utc::now();
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        // bcrypt is slow; fixtures never log in
        password_hash: Set("not-a-real-hash".to_string()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(pool)
    .await
    .unwrap()
}

pub async fn seed_item(
    pool: &DatabaseConnection,
    name: &str,
    price: i64,
    available: bool,
) -> items::Model {
    let now = Utc::now();
    items::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        available: Set(available),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(pool)
    .await
    .unwrap()
}

/// Inserts an order directly, bypassing availability checks. Lines are
/// `(item_id, quantity, unit_price)`.
pub async fn seed_order(
    pool: &DatabaseConnection,
    user_id: Uuid,
    lines: &[(Uuid, i32, i64)],
    status: OrderStatus,
) -> orders::Model {
    let now = Utc::now();
    let total = lines.iter().map(|(_, q, p)| *q as i64 * p).sum();
    let order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total: Set(total),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(pool)
    .await
    .unwrap();

    for (position, (item_id, quantity, price)) in lines.iter().enumerate() {
        order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            item_id: Set(*item_id),
            position: Set(position as i32),
            quantity: Set(*quantity),
            price: Set(*price),
        }
        .insert(pool)
        .await
        .unwrap();
    }

    order
}
