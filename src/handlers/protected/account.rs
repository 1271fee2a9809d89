// handlers/protected/account.rs - Signed-in account management
use axum::{Extension, Json};
use validator::Validate;

use crate::database::models::user::{ChangePasswordRequest, User};
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::UserService;

/// GET /api/auth/whoami - The account behind the presented token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<User> {
    let service = UserService::new().await?;
    let account = service.get(user.user_id).await?;

    Ok(ApiResponse::success(account))
}

/// PUT /api/auth/password - Change password, verifying the current one
pub async fn change_password(
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    request.validate()?;

    let service = UserService::new().await?;
    service.change_password(user.user_id, &request).await?;

    Ok(ApiResponse::<()>::no_content())
}
