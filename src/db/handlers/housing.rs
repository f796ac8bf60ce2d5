//! Database repositories for blocks and rooms.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::housing::{
        BlockCreateDBRequest, BlockDBResponse, BlockUpdateDBRequest, RoomCreateDBRequest, RoomDBResponse, RoomUpdateDBRequest,
    },
};
use crate::types::{BlockId, RoomId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Blocks<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Blocks<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Blocks<'c> {
    type CreateRequest = BlockCreateDBRequest;
    type UpdateRequest = BlockUpdateDBRequest;
    type Response = BlockDBResponse;
    type Id = BlockId;
    type Filter = ();

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let block = sqlx::query_as::<_, BlockDBResponse>(
            "INSERT INTO blocks (name, description, floor_count) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.floor_count)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(block)
    }

    #[instrument(skip(self), fields(block_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let block = sqlx::query_as::<_, BlockDBResponse>("SELECT * FROM blocks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(block)
    }

    #[instrument(skip_all, err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let blocks = sqlx::query_as::<_, BlockDBResponse>("SELECT * FROM blocks ORDER BY name")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(blocks)
    }

    #[instrument(skip(self), fields(block_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blocks WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(block_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let block = sqlx::query_as::<_, BlockDBResponse>(
            r#"
            UPDATE blocks SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                floor_count = COALESCE($4, floor_count)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.floor_count)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(block)
    }
}

/// Filter for listing rooms
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub block_id: Option<BlockId>,
}

pub struct Rooms<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Rooms<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Rooms<'c> {
    type CreateRequest = RoomCreateDBRequest;
    type UpdateRequest = RoomUpdateDBRequest;
    type Response = RoomDBResponse;
    type Id = RoomId;
    type Filter = RoomFilter;

    #[instrument(skip(self, request), fields(room_number = %request.room_number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let room = sqlx::query_as::<_, RoomDBResponse>(
            r#"
            INSERT INTO rooms (block_id, room_number, capacity, room_type, floor, monthly_rent)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.block_id)
        .bind(&request.room_number)
        .bind(request.capacity)
        .bind(request.room_type)
        .bind(request.floor)
        .bind(request.monthly_rent)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(room)
    }

    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let room = sqlx::query_as::<_, RoomDBResponse>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(room)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rooms = sqlx::query_as::<_, RoomDBResponse>(
            "SELECT * FROM rooms WHERE ($1::uuid IS NULL OR block_id = $1) ORDER BY room_number",
        )
        .bind(filter.block_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rooms)
    }

    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let room = sqlx::query_as::<_, RoomDBResponse>(
            r#"
            UPDATE rooms SET
                room_number = COALESCE($2, room_number),
                capacity = COALESCE($3, capacity),
                room_type = COALESCE($4, room_type),
                floor = COALESCE($5, floor),
                monthly_rent = COALESCE($6, monthly_rent)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.room_number)
        .bind(request.capacity)
        .bind(request.room_type)
        .bind(request.floor)
        .bind(request.monthly_rent)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::housing::RoomType;
    use crate::test_utils::create_test_block;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_block_crud(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Blocks::new(&mut conn);

        let created = repo
            .create(&BlockCreateDBRequest {
                name: "Block A".into(),
                description: Some("Main building".into()),
                floor_count: 4,
            })
            .await
            .unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Block A");

        let updated = repo
            .update(
                created.id,
                &BlockUpdateDBRequest {
                    floor_count: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.floor_count, 5);
        assert_eq!(updated.name, "Block A");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_duplicate_block_name_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Blocks::new(&mut conn);

        let request = BlockCreateDBRequest {
            name: "Block B".into(),
            description: None,
            floor_count: 1,
        };
        repo.create(&request).await.unwrap();
        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    async fn test_rooms_filter_by_block(pool: PgPool) {
        let block_a = create_test_block(&pool, "Block A").await;
        let block_b = create_test_block(&pool, "Block B").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rooms::new(&mut conn);

        for (block_id, number) in [(block_a.id, "101"), (block_a.id, "102"), (block_b.id, "201")] {
            repo.create(&RoomCreateDBRequest {
                block_id,
                room_number: number.into(),
                capacity: 4,
                room_type: RoomType::NonAc,
                floor: 1,
                monthly_rent: Decimal::new(5000, 0),
            })
            .await
            .unwrap();
        }

        let in_a = repo
            .list(&RoomFilter {
                block_id: Some(block_a.id),
            })
            .await
            .unwrap();
        assert_eq!(in_a.len(), 2);

        let all = repo.list(&RoomFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[sqlx::test]
    async fn test_room_requires_existing_block(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rooms::new(&mut conn);

        let err = repo
            .create(&RoomCreateDBRequest {
                block_id: uuid::Uuid::new_v4(),
                room_number: "101".into(),
                capacity: 4,
                room_type: RoomType::NonAc,
                floor: 1,
                monthly_rent: Decimal::ZERO,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
