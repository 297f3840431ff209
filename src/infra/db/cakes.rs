use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::context::RequestContext,
    application::repos::{CakesRepo, RepoError},
    domain::entities::CakeRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CakeRow {
    id: i64,
    title: String,
    description: String,
    rating: f32,
    image: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    deleted_at: Option<OffsetDateTime>,
}

impl From<CakeRow> for CakeRecord {
    fn from(row: CakeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            rating: row.rating,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[async_trait]
impl CakesRepo for PostgresRepositories {
    async fn save(&self, ctx: &RequestContext, cake: &mut CakeRecord) -> Result<(), RepoError> {
        let id = ctx
            .run(async {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO cakes (title, description, rating, image, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id
                    "#,
                )
                .bind(&cake.title)
                .bind(&cake.description)
                .bind(cake.rating)
                .bind(&cake.image)
                .bind(cake.created_at)
                .bind(cake.updated_at)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)
            })
            .await?;

        cake.id = id;
        Ok(())
    }

    async fn update(&self, ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError> {
        let result = ctx
            .run(async {
                sqlx::query(
                    r#"
                    UPDATE cakes
                    SET title = $2, description = $3, rating = $4, image = $5, updated_at = $6
                    WHERE id = $1 AND deleted_at IS NULL
                    "#,
                )
                .bind(cake.id)
                .bind(&cake.title)
                .bind(&cake.description)
                .bind(cake.rating)
                .bind(&cake.image)
                .bind(cake.updated_at)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError> {
        let result = ctx
            .run(async {
                sqlx::query(
                    r#"
                    UPDATE cakes
                    SET deleted_at = $2
                    WHERE id = $1 AND deleted_at IS NULL
                    "#,
                )
                .bind(cake.id)
                .bind(cake.deleted_at)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<CakeRecord>, RepoError> {
        let rows = ctx
            .run(async {
                sqlx::query_as::<_, CakeRow>(
                    r#"
                    SELECT id, title, description, rating, image, created_at, updated_at, deleted_at
                    FROM cakes
                    WHERE deleted_at IS NULL
                    ORDER BY rating DESC, title ASC
                    "#,
                )
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)
            })
            .await?;

        Ok(rows.into_iter().map(CakeRecord::from).collect())
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<Option<CakeRecord>, RepoError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, CakeRow>(
                    r#"
                    SELECT id, title, description, rating, image, created_at, updated_at, deleted_at
                    FROM cakes
                    WHERE id = $1 AND deleted_at IS NULL
                    "#,
                )
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)
            })
            .await?;

        Ok(row.map(CakeRecord::from))
    }
}
