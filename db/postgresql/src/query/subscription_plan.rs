use anyhow::Result;
use sqlx::{Executor, Pool, Postgres};
use uuid::Uuid;

use crate::{db::PostgresDb, model::subscription_plan::SubscriptionPlanModel};

const INSERT: &str = "INSERT INTO \"subscription_plans\" (\"id\", \"created_at\", \"updated_at\", \"name\", \"description\", \"price\", \"features\", \"max_projects\") VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"name\", \"description\", \"price\", \"features\", \"max_projects\" FROM \"subscription_plans\" WHERE \"id\" = $1";
const SELECT_ALL: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"name\", \"description\", \"price\", \"features\", \"max_projects\" FROM \"subscription_plans\" ORDER BY \"price\" ASC";
const COUNT: &str = "SELECT COUNT(1) FROM \"subscription_plans\"";
const UPDATE: &str = "UPDATE \"subscription_plans\" SET \"updated_at\" = $1, \"name\" = $2, \"description\" = $3, \"price\" = $4, \"features\" = $5, \"max_projects\" = $6 WHERE \"id\" = $7";
const DELETE: &str = "DELETE FROM \"subscription_plans\" WHERE \"id\" = $1";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    fb_log::info(Some("🔧"), "[PostgreSQL] Setting up subscription_plans table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"subscription_plans\" (\"id\" uuid, \"created_at\" timestamptz, \"updated_at\" timestamptz, \"name\" text NOT NULL, \"description\" text NOT NULL, \"price\" bigint NOT NULL, \"features\" jsonb NOT NULL, \"max_projects\" integer, PRIMARY KEY (\"id\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_ALL),
        pool.prepare(COUNT),
        pool.prepare(UPDATE),
        pool.prepare(DELETE),
    )?;

    Ok(())
}

impl PostgresDb {
    pub async fn insert_subscription_plan(&self, value: &SubscriptionPlanModel) -> Result<()> {
        self.execute(
            sqlx::query(INSERT)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.name())
                .bind(value.description())
                .bind(value.price())
                .bind(value.features())
                .bind(value.max_projects()),
        )
        .await?;
        Ok(())
    }

    pub async fn select_subscription_plan(&self, id: &Uuid) -> Result<Option<SubscriptionPlanModel>> {
        Ok(self.fetch_optional(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_all_subscription_plans(&self) -> Result<Vec<SubscriptionPlanModel>> {
        Ok(self.fetch_all(sqlx::query_as(SELECT_ALL)).await?)
    }

    pub async fn count_subscription_plans(&self) -> Result<i64> {
        let (count,): (i64,) = self.fetch_one(sqlx::query_as(COUNT)).await?;
        Ok(count)
    }

    pub async fn update_subscription_plan(&self, value: &SubscriptionPlanModel) -> Result<()> {
        self.execute(
            sqlx::query(UPDATE)
                .bind(value.updated_at())
                .bind(value.name())
                .bind(value.description())
                .bind(value.price())
                .bind(value.features())
                .bind(value.max_projects())
                .bind(value.id()),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_subscription_plan(&self, id: &Uuid) -> Result<()> {
        self.execute(sqlx::query(DELETE).bind(id)).await?;
        Ok(())
    }
}
