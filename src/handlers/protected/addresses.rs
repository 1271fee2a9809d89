// handlers/protected/addresses.rs - Shipping address book
use axum::extract::Path;
use axum::{Extension, Json};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::address::{Address, CreateAddressRequest, UpdateAddressRequest};
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::AddressService;

/// GET /api/addresses - Own addresses, default first
pub async fn list(Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Address>> {
    let service = AddressService::new().await?;
    let addresses = service.list(user.user_id).await?;

    Ok(ApiResponse::success(addresses))
}

/// POST /api/addresses - Add an address; the first one becomes the default
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAddressRequest>,
) -> ApiResult<Address> {
    request.validate()?;

    let service = AddressService::new().await?;
    let address = service.create(user.user_id, &request).await?;

    Ok(ApiResponse::created(address))
}

/// PUT /api/addresses/:id - Partial update of an own address
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(address_id): Path<Uuid>,
    Json(request): Json<UpdateAddressRequest>,
) -> ApiResult<Address> {
    request.validate()?;

    let service = AddressService::new().await?;
    let address = service.update(user.user_id, address_id, &request).await?;

    Ok(ApiResponse::success(address))
}

/// DELETE /api/addresses/:id - Remove an own address
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(address_id): Path<Uuid>,
) -> ApiResult<()> {
    let service = AddressService::new().await?;
    service.delete(user.user_id, address_id).await?;

    Ok(ApiResponse::<()>::no_content())
}
