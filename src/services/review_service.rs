use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::review::{CreateReviewRequest, Review, ReviewWithAuthor};
use crate::error::ApiError;
use crate::listing::Page;

pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Reviews for a product, newest first, plus the rating average rounded
    /// to two places (None when the product has no reviews yet).
    pub async fn list_for_product(
        &self,
        product_id: Uuid,
        page: Page,
    ) -> Result<(Vec<ReviewWithAuthor>, i64, Option<Decimal>), ApiError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        let average = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT AVG(rating)::numeric(3,2) FROM reviews WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r#"
            SELECT r.*, u.name AS author_name
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC
            {}
            "#,
            page.limit_sql()
        );
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok((reviews, total, average))
    }

    /// One review per user per product; the unique index is the arbiter
    pub async fn create(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        request: &CreateReviewRequest,
    ) -> Result<ReviewWithAuthor, ApiError> {
        let inserted = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (product_id, user_id, rating, title, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .bind(request.rating)
        .bind(&request.title)
        .bind(&request.body)
        .fetch_one(&self.pool)
        .await;

        let review = match inserted {
            Ok(review) => review,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(ApiError::conflict_code(
                    "ALREADY_REVIEWED",
                    "You have already reviewed this product",
                ));
            }
            Err(other) => return Err(other.into()),
        };

        let author_name = sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(ReviewWithAuthor {
            review,
            author_name,
        })
    }

    /// Delete a review under `/api/products/:id/reviews/:review_id`. The
    /// review must belong to the product in the path; customers may only
    /// delete their own, admins anyone's.
    pub async fn delete(
        &self,
        product_reference: &str,
        review_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<(), ApiError> {
        let row = sqlx::query_as::<_, (Uuid, Uuid, String)>(
            r#"
            SELECT r.user_id, r.product_id, p.slug
            FROM reviews r
            JOIN products p ON p.id = r.product_id
            WHERE r.id = $1
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((owner_id, product_id, product_slug)) = row else {
            return Err(ApiError::not_found("Review not found"));
        };

        let product_matches = match Uuid::parse_str(product_reference) {
            Ok(id) => id == product_id,
            Err(_) => product_reference == product_slug,
        };
        if !product_matches {
            return Err(ApiError::not_found("Review not found"));
        }

        if owner_id != user_id && !is_admin {
            return Err(ApiError::forbidden("You can only delete your own reviews"));
        }

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
