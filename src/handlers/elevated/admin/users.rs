// handlers/elevated/admin/users.rs - Account administration
use axum::extract::{Path, Query};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::database::models::user::{UpdateRoleRequest, User};
use crate::listing::PageQuery;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult, Pagination};
use crate::services::UserService;

/// GET /api/admin/users - All accounts, newest first
pub async fn list(Query(query): Query<PageQuery>) -> ApiResult<Vec<User>> {
    let page = query.resolve();
    let service = UserService::new().await?;
    let (users, total) = service.list(page).await?;

    Ok(ApiResponse::paginated(
        users,
        Pagination::new(page.page, page.per_page, total),
    ))
}

/// PUT /api/admin/users/:id/role - Promote or demote an account. Admins
/// cannot demote themselves.
pub async fn set_role(
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> ApiResult<User> {
    let service = UserService::new().await?;
    let user = service
        .set_role(admin.user_id, user_id, request.role)
        .await?;

    tracing::info!(user_id = %user_id, role = user.role.as_str(), "role changed");
    Ok(ApiResponse::success(user))
}
