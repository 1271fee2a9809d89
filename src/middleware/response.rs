use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Pagination block carried in `meta` on list responses
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Wrapper for API responses that renders the `{data, meta}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: Option<Value>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with default 200 status and no meta
    pub fn success(data: T) -> Self {
        Self {
            data,
            meta: None,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            meta: None,
            status_code: Some(status_code),
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// 204 No Content (no body)
    pub fn no_content() -> ApiResponse<()> {
        ApiResponse::with_status((), StatusCode::NO_CONTENT)
    }

    /// List response with pagination meta
    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            data,
            meta: Some(json!({ "pagination": pagination })),
            status_code: None,
        }
    }

    /// Attach an arbitrary meta object
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // For 204 No Content, return empty response
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return crate::error::ApiError::internal("Failed to format response")
                    .into_response();
            }
        };

        let envelope = match self.meta {
            Some(meta) => json!({ "data": data_value, "meta": meta }),
            None => json!({ "data": data_value }),
        };

        (status, Json(envelope)).into_response()
    }
}

// Convenience type alias used by every handler
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
