use crate::config::AdminConfig;
use crate::entities::{
    Role, order_entity as orders, order_item_entity as order_items, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<UserResponse> {
        Ok(self.find_user(user_id).await?.into())
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserResponse>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(UserResponse::from).collect())
    }

    /// User plus a summary of every order they placed, newest first.
    pub async fn get_user_detail(&self, user_id: Uuid) -> AppResult<UserDetailResponse> {
        let user = self.find_user(user_id).await?;
        let user_orders = user
            .find_related(orders::Entity)
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        Ok(UserDetailResponse {
            user: user.into(),
            orders: user_orders.into_iter().map(UserOrderSummary::from).collect(),
        })
    }

    /// Admin mutation of name, email and role.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        let user = self.find_user(user_id).await?;
        self.apply_update(user, request.name, request.email, request.role)
            .await
    }

    /// Self-service mutation; role cannot be changed this way.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let user = self.find_user(user_id).await?;
        self.apply_update(user, request.name, request.email, None)
            .await
    }

    /// Removes the user together with their orders and order lines.
    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let order_ids: Vec<Uuid> = orders::Entity::find()
            .select_only()
            .column(orders::Column::Id)
            .filter(orders::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&txn)
            .await?;

        if !order_ids.is_empty() {
            order_items::Entity::delete_many()
                .filter(order_items::Column::OrderId.is_in(order_ids.clone()))
                .exec(&txn)
                .await?;
            orders::Entity::delete_many()
                .filter(orders::Column::Id.is_in(order_ids.clone()))
                .exec(&txn)
                .await?;
        }

        users::Entity::delete_by_id(user_id).exec(&txn).await?;
        txn.commit().await?;

        log::info!(
            "User {} deleted along with {} order(s)",
            user_id,
            order_ids.len()
        );
        Ok(())
    }

    /// Creates the account as ADMIN, or promotes an existing account with that email.
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<UserResponse> {
        let email = normalize_email(&admin.email);
        validate_email(&email)?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?;

        let user = match existing {
            Some(user) => match user.role {
                Role::Admin => user,
                Role::User => {
                    let mut model = user.into_active_model();
                    model.role = Set(Role::Admin);
                    model.updated_at = Set(Utc::now());
                    let promoted = model.update(&self.pool).await?;
                    log::info!("User {} promoted to admin", promoted.id);
                    promoted
                }
            },
            None => {
                validate_name(&admin.name)?;
                validate_password(&admin.password)?;
                let now = Utc::now();
                let created = users::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(admin.name.trim().to_string()),
                    email: Set(email),
                    password_hash: Set(hash_password(&admin.password)?),
                    role: Set(Role::Admin),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.pool)
                .await
                .map_err(map_email_conflict)?;
                log::info!("Admin account created: {}", created.id);
                created
            }
        };

        Ok(user.into())
    }

    async fn find_user(&self, user_id: Uuid) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn apply_update(
        &self,
        user: users::Model,
        name: Option<String>,
        email: Option<String>,
        role: Option<Role>,
    ) -> AppResult<UserResponse> {
        let name = name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            validate_name(name)?;
        }

        let email = email.map(|e| normalize_email(&e));
        if let Some(email) = &email {
            validate_email(email)?;
            ensure_email_free(&self.pool, email, user.id).await?;
        }

        if name.is_none() && email.is_none() && role.is_none() {
            return Ok(user.into());
        }

        let mut model = user.into_active_model();
        if let Some(name) = name {
            model.name = Set(name);
        }
        if let Some(email) = email {
            model.email = Set(email);
        }
        if let Some(role) = role {
            model.role = Set(role);
        }
        model.updated_at = Set(Utc::now());

        let updated = model
            .update(&self.pool)
            .await
            .map_err(map_email_conflict)?;
        Ok(updated.into())
    }
}

async fn ensure_email_free<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    owner: Uuid,
) -> AppResult<()> {
    let taken = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .filter(users::Column::Id.ne(owner))
        .one(conn)
        .await?;

    match taken {
        Some(_) => Err(AppError::ValidationError(EMAIL_TAKEN.to_string())),
        None => Ok(()),
    }
}

pub(crate) const EMAIL_TAKEN: &str = "Email already registered";

/// Concurrent writers can both pass the lookup above; the unique index on `users.email`
/// then rejects the second one.
pub(crate) fn map_email_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::ValidationError(EMAIL_TAKEN.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OrderStatus;
    use crate::services::test_support::*;
    use sea_orm::PaginatorTrait;

    #[actix_web::test]
    async fn test_update_user_changes_role_and_name() {
        let pool = test_pool().await;
        let svc = UserService::new(pool.clone());
        let user = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;

        let updated = svc
            .update_user(
                user.id,
                UpdateUserRequest {
                    name: Some("Ana Souza".to_string()),
                    email: None,
                    role: Some(Role::Admin),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ana Souza");
        assert_eq!(updated.email, "ana@x.com");
        assert_eq!(updated.role, Role::Admin);
    }

    #[actix_web::test]
    async fn test_update_rejects_taken_email() {
        let pool = test_pool().await;
        let svc = UserService::new(pool.clone());
        seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let bob = seed_user(&pool, "Bob Lima", "bob@x.com", Role::User).await;

        let err = svc
            .update_profile(
                bob.id,
                UpdateProfileRequest {
                    name: None,
                    email: Some("ANA@x.com".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // keeping one's own email is fine
        let same = svc
            .update_profile(
                bob.id,
                UpdateProfileRequest {
                    name: None,
                    email: Some("bob@x.com".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(same.email, "bob@x.com");
    }

    #[actix_web::test]
    async fn test_unique_email_violation_maps_to_validation_error() {
        let pool = test_pool().await;
        seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;

        // second insert skips the lookup, as a racing writer would
        let now = Utc::now();
        let err = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Ana Again".to_string()),
            email: Set("ana@x.com".to_string()),
            password_hash: Set("not-a-real-hash".to_string()),
            role: Set(Role::User),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&pool)
        .await
        .unwrap_err();

        match map_email_conflict(err) {
            AppError::ValidationError(msg) => assert_eq!(msg, EMAIL_TAKEN),
            other => panic!("unexpected error: {other:?}"),
        }

        let other = map_email_conflict(DbErr::Custom("boom".to_string()));
        assert!(matches!(other, AppError::DatabaseError(_)));
    }

    #[actix_web::test]
    async fn test_update_unknown_user() {
        let pool = test_pool().await;
        let svc = UserService::new(pool);
        let err = svc
            .update_user(Uuid::new_v4(), UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_delete_user_cascades_orders() {
        let pool = test_pool().await;
        let svc = UserService::new(pool.clone());
        let ana = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let bob = seed_user(&pool, "Bob Lima", "bob@x.com", Role::User).await;
        let item = seed_item(&pool, "Coffee", 500, true).await;
        seed_order(&pool, ana.id, &[(item.id, 2, 500)], OrderStatus::Pending).await;
        seed_order(&pool, bob.id, &[(item.id, 1, 500)], OrderStatus::Pending).await;

        svc.delete_user(ana.id).await.unwrap();

        assert!(users::Entity::find_by_id(ana.id).one(&pool).await.unwrap().is_none());
        assert_eq!(orders::Entity::find().count(&pool).await.unwrap(), 1);
        assert_eq!(order_items::Entity::find().count(&pool).await.unwrap(), 1);

        let err = svc.delete_user(ana.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_user_detail_lists_orders() {
        let pool = test_pool().await;
        let svc = UserService::new(pool.clone());
        let ana = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let item = seed_item(&pool, "Coffee", 500, true).await;
        seed_order(&pool, ana.id, &[(item.id, 3, 500)], OrderStatus::Completed).await;

        let detail = svc.get_user_detail(ana.id).await.unwrap();
        assert_eq!(detail.user.id, ana.id);
        assert_eq!(detail.orders.len(), 1);
        assert_eq!(detail.orders[0].total, 1500);
        assert_eq!(detail.orders[0].status, OrderStatus::Completed);
    }

    #[actix_web::test]
    async fn test_ensure_admin_creates_then_promotes() {
        let pool = test_pool().await;
        let svc = UserService::new(pool.clone());

        let config = AdminConfig {
            name: "Administrator".to_string(),
            email: "admin@shop.test".to_string(),
            password: "admin123".to_string(),
        };
        let created = svc.ensure_admin(&config).await.unwrap();
        assert_eq!(created.role, Role::Admin);

        // idempotent
        let again = svc.ensure_admin(&config).await.unwrap();
        assert_eq!(again.id, created.id);

        let ana = seed_user(&pool, "Ana Silva", "ana@x.com", Role::User).await;
        let promoted = svc
            .ensure_admin(&AdminConfig {
                email: "ana@x.com".to_string(),
                ..config
            })
            .await
            .unwrap();
        assert_eq!(promoted.id, ana.id);
        assert_eq!(promoted.role, Role::Admin);
    }
}
