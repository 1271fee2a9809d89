use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::{decode_jwt, issue_token_pair, TokenPair, TokenUse};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, User, UserRole,
};
use crate::error::ApiError;
use crate::listing::Page;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create an account and issue its first token pair. The first registrant
    /// matching `security.bootstrap_admin_email` becomes the admin.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(User, TokenPair), ApiError> {
        validate_password(&request.password)?;

        let email = request.email.trim().to_lowercase();
        let role = match &config::config().security.bootstrap_admin_email {
            Some(admin_email) if admin_email.eq_ignore_ascii_case(&email) => UserRole::Admin,
            _ => UserRole::Customer,
        };

        let password_hash = hash_password(&request.password)?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(request.name.trim())
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(ApiError::conflict_code(
                    "EMAIL_TAKEN",
                    "An account with this email already exists",
                ));
            }
            Err(other) => return Err(other.into()),
        };

        let tokens = issue_token_pair(&user)
            .map_err(|e| ApiError::internal(format!("Failed to issue tokens: {}", e)))?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "registered user");
        Ok((user, tokens))
    }

    /// Verify credentials. Unknown email and wrong password produce the same
    /// 401 so the response does not reveal which accounts exist.
    pub async fn login(&self, request: &LoginRequest) -> Result<(User, TokenPair), ApiError> {
        let email = request.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(ApiError::invalid_credentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(ApiError::invalid_credentials());
        }

        let tokens = issue_token_pair(&user)
            .map_err(|e| ApiError::internal(format!("Failed to issue tokens: {}", e)))?;

        Ok((user, tokens))
    }

    /// Exchange a refresh token for a fresh pair. Access tokens are refused
    /// here, and the account is re-read so revoked users drop off at rotation.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(User, TokenPair), ApiError> {
        let claims = decode_jwt(refresh_token)?;

        if claims.token_use != TokenUse::Refresh {
            return Err(ApiError::token_invalid());
        }

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(claims.sub)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(ApiError::token_invalid)?;

        let tokens = issue_token_pair(&user)
            .map_err(|e| ApiError::internal(format!("Failed to issue tokens: {}", e)))?;

        Ok((user, tokens))
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let user = self.get(user_id).await?;

        if !verify_password(&request.current_password, &user.password_hash) {
            return Err(ApiError::invalid_credentials());
        }

        validate_password(&request.new_password)?;
        let password_hash = hash_password(&request.new_password)?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Admin listing, newest accounts first
    pub async fn list(&self, page: Page) -> Result<(Vec<User>, i64), ApiError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM users ORDER BY created_at DESC {}",
            page.limit_sql()
        );
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    /// Admin role change. An admin cannot demote their own account.
    pub async fn set_role(
        &self,
        acting_admin: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<User, ApiError> {
        if acting_admin == user_id && role != UserRole::Admin {
            return Err(ApiError::unprocessable(
                "Admins cannot demote their own account",
            ));
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(role)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "changed user role");
        Ok(user)
    }
}
