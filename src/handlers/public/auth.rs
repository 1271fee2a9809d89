// handlers/public/auth.rs - Token acquisition endpoints
use axum::Json;
use serde::Serialize;
use validator::Validate;

use crate::auth::TokenPair;
use crate::database::models::user::{LoginRequest, RefreshRequest, RegisterRequest, User};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::UserService;

/// Body of every successful auth call: the account plus a fresh token pair
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl AuthSession {
    fn new(user: User, tokens: TokenPair) -> Self {
        Self {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        }
    }
}

/// POST /auth/register - Create an account and sign in
pub async fn register(Json(request): Json<RegisterRequest>) -> ApiResult<AuthSession> {
    request.validate()?;

    let service = UserService::new().await?;
    let (user, tokens) = service.register(&request).await?;

    Ok(ApiResponse::created(AuthSession::new(user, tokens)))
}

/// POST /auth/login - Authenticate with email and password
pub async fn login(Json(request): Json<LoginRequest>) -> ApiResult<AuthSession> {
    request.validate()?;

    let service = UserService::new().await?;
    let (user, tokens) = service.login(&request).await?;

    Ok(ApiResponse::success(AuthSession::new(user, tokens)))
}

/// POST /auth/refresh - Exchange a refresh token for a new pair
pub async fn refresh(Json(request): Json<RefreshRequest>) -> ApiResult<AuthSession> {
    request.validate()?;

    let service = UserService::new().await?;
    let (user, tokens) = service.refresh(&request.refresh_token).await?;

    Ok(ApiResponse::success(AuthSession::new(user, tokens)))
}
