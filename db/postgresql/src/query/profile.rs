use anyhow::Result;
use sqlx::{Executor, Pool, Postgres};
use uuid::Uuid;

use crate::{db::PostgresDb, model::profile::ProfileModel};

const INSERT: &str = "INSERT INTO \"profiles\" (\"id\", \"created_at\", \"updated_at\", \"email\", \"password_hash\", \"full_name\", \"role\") VALUES ($1, $2, $3, $4, $5, $6, $7)";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"email\", \"password_hash\", \"full_name\", \"role\" FROM \"profiles\" WHERE \"id\" = $1";
const SELECT_BY_EMAIL: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"email\", \"password_hash\", \"full_name\", \"role\" FROM \"profiles\" WHERE \"email\" = $1";
const SELECT_MANY: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"email\", \"password_hash\", \"full_name\", \"role\" FROM \"profiles\" ORDER BY \"created_at\" DESC";
const COUNT: &str = "SELECT COUNT(1) FROM \"profiles\"";
const UPDATE: &str = "UPDATE \"profiles\" SET \"updated_at\" = $1, \"password_hash\" = $2, \"full_name\" = $3, \"role\" = $4 WHERE \"id\" = $5";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    fb_log::info(Some("🔧"), "[PostgreSQL] Setting up profiles table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"profiles\" (\"id\" uuid, \"created_at\" timestamptz, \"updated_at\" timestamptz, \"email\" text NOT NULL UNIQUE, \"password_hash\" text NOT NULL, \"full_name\" text NOT NULL, \"role\" text NOT NULL, PRIMARY KEY (\"id\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_BY_EMAIL),
        pool.prepare(SELECT_MANY),
        pool.prepare(COUNT),
        pool.prepare(UPDATE),
    )?;

    Ok(())
}

impl PostgresDb {
    pub async fn insert_profile(&self, value: &ProfileModel) -> Result<()> {
        self.execute(
            sqlx::query(INSERT)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.email())
                .bind(value.password_hash())
                .bind(value.full_name())
                .bind(value.role()),
        )
        .await?;
        Ok(())
    }

    pub async fn select_profile(&self, id: &Uuid) -> Result<Option<ProfileModel>> {
        Ok(self.fetch_optional(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_profile_by_email(&self, email: &str) -> Result<Option<ProfileModel>> {
        Ok(self
            .fetch_optional(sqlx::query_as(SELECT_BY_EMAIL).bind(email))
            .await?)
    }

    pub async fn select_many_profiles(&self) -> Result<Vec<ProfileModel>> {
        Ok(self.fetch_all(sqlx::query_as(SELECT_MANY)).await?)
    }

    pub async fn count_profiles(&self) -> Result<i64> {
        let (count,): (i64,) = self.fetch_one(sqlx::query_as(COUNT)).await?;
        Ok(count)
    }

    pub async fn update_profile(&self, value: &ProfileModel) -> Result<()> {
        self.execute(
            sqlx::query(UPDATE)
                .bind(value.updated_at())
                .bind(value.password_hash())
                .bind(value.full_name())
                .bind(value.role())
                .bind(value.id()),
        )
        .await?;
        Ok(())
    }
}
