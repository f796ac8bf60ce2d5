//! Database repository for keyed system configuration entries.
//!
//! Config entries are addressed by their key on the wire, so this
//! repository works by key rather than through the id-based trait.

use crate::db::{
    errors::{DbError, Result},
    models::system_config::{ConfigCreateDBRequest, ConfigDBResponse, ConfigUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct SystemConfig<'c> {
    db: &'c mut PgConnection,
}

impl<'c> SystemConfig<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(key = %request.key), err)]
    pub async fn create(&mut self, request: &ConfigCreateDBRequest) -> Result<ConfigDBResponse> {
        let entry = sqlx::query_as::<_, ConfigDBResponse>(
            r#"
            INSERT INTO system_config (key, value, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.key)
        .bind(&request.value)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(entry)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_key(&mut self, key: &str) -> Result<Option<ConfigDBResponse>> {
        let entry = sqlx::query_as::<_, ConfigDBResponse>("SELECT * FROM system_config WHERE key = $1")
            .bind(key)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(entry)
    }

    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<ConfigDBResponse>> {
        let entries =
            sqlx::query_as::<_, ConfigDBResponse>("SELECT * FROM system_config ORDER BY key")
                .fetch_all(&mut *self.db)
                .await?;

        Ok(entries)
    }

    #[instrument(skip(self, request), err)]
    pub async fn update_by_key(
        &mut self,
        key: &str,
        request: &ConfigUpdateDBRequest,
    ) -> Result<ConfigDBResponse> {
        let entry = sqlx::query_as::<_, ConfigDBResponse>(
            r#"
            UPDATE system_config SET
                value = COALESCE($2, value),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE key = $1
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(&request.value)
        .bind(&request.description)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(entry)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_by_key(&mut self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM system_config WHERE key = $1")
            .bind(key)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
