use crate::entities::{Role, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::{EMAIL_TAKEN, map_email_conflict};
use crate::utils::*;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// Creates a USER account. The response never carries the password hash.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserResponse> {
        let name = request.name.trim().to_string();
        let email = normalize_email(&request.email);

        validate_name(&name)?;
        validate_email(&email)?;
        validate_password(&request.password)?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(Role::User),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        log::info!("User registered: {}", user.id);

        Ok(user.into())
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        let token = self
            .jwt_service
            .generate_token(user.id, &user.email, user.role)?;

        Ok(AuthResponse {
            user: user.into(),
            token,
            expires_in: self.jwt_service.get_expires_in(),
        })
    }
}
