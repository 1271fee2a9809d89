use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::address::{Address, CreateAddressRequest, UpdateAddressRequest};
use crate::error::ApiError;
use crate::listing::{bind_param_query_as, ParamBinder, SqlParam};

pub struct AddressService {
    pool: PgPool,
}

impl AddressService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Address>, ApiError> {
        let addresses = sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(addresses)
    }

    /// Create an address. A user's first address becomes the default, and an
    /// explicit default displaces the previous one in the same transaction.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateAddressRequest,
    ) -> Result<Address, ApiError> {
        let mut tx = self.pool.begin().await?;

        let has_any = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM addresses WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let make_default = request.is_default || !has_any;
        if make_default {
            sqlx::query(
                "UPDATE addresses SET is_default = false, updated_at = now() WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let address = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses
                (user_id, label, line1, line2, city, region, postal_code, country, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&request.label)
        .bind(request.line1.trim())
        .bind(&request.line2)
        .bind(request.city.trim())
        .bind(&request.region)
        .bind(request.postal_code.trim())
        .bind(request.country.to_uppercase())
        .bind(make_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        request: &UpdateAddressRequest,
    ) -> Result<Address, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Address not found"))?;

        if request.is_default == Some(true) && !current.is_default {
            sqlx::query(
                "UPDATE addresses SET is_default = false, updated_at = now() WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let mut binder = ParamBinder::new();
        let mut sets: Vec<String> = vec![];

        if let Some(label) = &request.label {
            let ph = binder.push(SqlParam::Str(label.clone()));
            sets.push(format!("label = {}", ph));
        }
        if let Some(line1) = &request.line1 {
            let ph = binder.push(SqlParam::Str(line1.trim().to_string()));
            sets.push(format!("line1 = {}", ph));
        }
        if let Some(line2) = &request.line2 {
            let ph = binder.push(SqlParam::Str(line2.clone()));
            sets.push(format!("line2 = {}", ph));
        }
        if let Some(city) = &request.city {
            let ph = binder.push(SqlParam::Str(city.trim().to_string()));
            sets.push(format!("city = {}", ph));
        }
        if let Some(region) = &request.region {
            let ph = binder.push(SqlParam::Str(region.clone()));
            sets.push(format!("region = {}", ph));
        }
        if let Some(postal_code) = &request.postal_code {
            let ph = binder.push(SqlParam::Str(postal_code.trim().to_string()));
            sets.push(format!("postal_code = {}", ph));
        }
        if let Some(country) = &request.country {
            let ph = binder.push(SqlParam::Str(country.to_uppercase()));
            sets.push(format!("country = {}", ph));
        }
        if let Some(is_default) = request.is_default {
            let ph = binder.push(SqlParam::Bool(is_default));
            sets.push(format!("is_default = {}", ph));
        }

        if sets.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }
        sets.push("updated_at = now()".to_string());

        let id_ph = binder.push(SqlParam::Uuid(address_id));
        let sql = format!(
            "UPDATE addresses SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id_ph
        );

        let mut update_query = sqlx::query_as::<_, Address>(&sql);
        for param in &binder.into_values() {
            update_query = bind_param_query_as(update_query, param);
        }
        let address = update_query.fetch_one(&mut *tx).await?;

        tx.commit().await?;
        Ok(address)
    }

    pub async fn delete(&self, user_id: Uuid, address_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Address not found"));
        }
        Ok(())
    }
}
