use anyhow::Result;
use sqlx::{
    types::chrono::{DateTime, Utc},
    Executor, Pool, Postgres,
};
use uuid::Uuid;

use crate::{db::PostgresDb, model::project::ProjectModel};

const INSERT: &str = "INSERT INTO \"projects\" (\"id\", \"created_at\", \"updated_at\", \"user_id\", \"title\", \"description\", \"target_amount\", \"current_amount\", \"duration_months\", \"status\") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"title\", \"description\", \"target_amount\", \"current_amount\", \"duration_months\", \"status\" FROM \"projects\" WHERE \"id\" = $1";
const SELECT_MANY_BY_USER_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"title\", \"description\", \"target_amount\", \"current_amount\", \"duration_months\", \"status\" FROM \"projects\" WHERE \"user_id\" = $1 ORDER BY \"created_at\" DESC";
const SELECT_MANY_BY_STATUS: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"title\", \"description\", \"target_amount\", \"current_amount\", \"duration_months\", \"status\" FROM \"projects\" WHERE \"status\" = $1 ORDER BY \"created_at\" DESC";
const COUNT_BY_USER_ID: &str = "SELECT COUNT(1) FROM \"projects\" WHERE \"user_id\" = $1";
const UPDATE_IF_STATUS: &str = "UPDATE \"projects\" SET \"updated_at\" = $1, \"title\" = $2, \"description\" = $3 WHERE \"id\" = $4 AND \"status\" = $5";
const UPDATE_STATUS_IF: &str = "UPDATE \"projects\" SET \"updated_at\" = $1, \"status\" = $2 WHERE \"id\" = $3 AND \"status\" = $4";
const ADD_FUNDING: &str = "UPDATE \"projects\" SET \"updated_at\" = $1, \"current_amount\" = \"current_amount\" + $2, \"status\" = CASE WHEN \"current_amount\" + $2 >= \"target_amount\" THEN $3 ELSE \"status\" END WHERE \"id\" = $4 AND \"status\" = $5 AND \"current_amount\" + $2 <= \"target_amount\"";
const DELETE_IF_UNFUNDED: &str = "DELETE FROM \"projects\" WHERE \"id\" = $1 AND NOT EXISTS (SELECT 1 FROM \"project_fundings\" WHERE \"project_id\" = $1)";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    fb_log::info(Some("🔧"), "[PostgreSQL] Setting up projects table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"projects\" (\"id\" uuid, \"created_at\" timestamptz, \"updated_at\" timestamptz, \"user_id\" uuid NOT NULL, \"title\" text NOT NULL, \"description\" text NOT NULL, \"target_amount\" bigint NOT NULL, \"current_amount\" bigint NOT NULL, \"duration_months\" integer NOT NULL, \"status\" text NOT NULL, PRIMARY KEY (\"id\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_MANY_BY_USER_ID),
        pool.prepare(SELECT_MANY_BY_STATUS),
        pool.prepare(COUNT_BY_USER_ID),
        pool.prepare(UPDATE_IF_STATUS),
        pool.prepare(UPDATE_STATUS_IF),
        pool.prepare(ADD_FUNDING),
        pool.prepare(DELETE_IF_UNFUNDED),
    )?;

    Ok(())
}

impl PostgresDb {
    pub async fn insert_project(&self, value: &ProjectModel) -> Result<()> {
        self.execute(
            sqlx::query(INSERT)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.user_id())
                .bind(value.title())
                .bind(value.description())
                .bind(value.target_amount())
                .bind(value.current_amount())
                .bind(value.duration_months())
                .bind(value.status()),
        )
        .await?;
        Ok(())
    }

    pub async fn select_project(&self, id: &Uuid) -> Result<Option<ProjectModel>> {
        Ok(self.fetch_optional(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_many_projects_by_user_id(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ProjectModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_USER_ID).bind(user_id))
            .await?)
    }

    pub async fn select_many_projects_by_status(&self, status: &str) -> Result<Vec<ProjectModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_STATUS).bind(status))
            .await?)
    }

    pub async fn count_projects_by_user_id(&self, user_id: &Uuid) -> Result<i64> {
        let (count,): (i64,) = self
            .fetch_one(sqlx::query_as(COUNT_BY_USER_ID).bind(user_id))
            .await?;
        Ok(count)
    }

    /// Writes title and description only while the stored status still equals
    /// `value.status()`. The status column itself is never written here.
    pub async fn update_project_if_status(&self, value: &ProjectModel) -> Result<bool> {
        let res = self
            .execute(
                sqlx::query(UPDATE_IF_STATUS)
                    .bind(value.updated_at())
                    .bind(value.title())
                    .bind(value.description())
                    .bind(value.id())
                    .bind(value.status()),
            )
            .await?;
        Ok(res.rows_affected() == 1)
    }

    /// Returns false when the project was not in `from_status`.
    pub async fn update_project_status_if(
        &self,
        id: &Uuid,
        updated_at: &DateTime<Utc>,
        from_status: &str,
        to_status: &str,
    ) -> Result<bool> {
        let res = self
            .execute(
                sqlx::query(UPDATE_STATUS_IF)
                    .bind(updated_at)
                    .bind(to_status)
                    .bind(id)
                    .bind(from_status),
            )
            .await?;
        Ok(res.rows_affected() == 1)
    }

    /// Adds `amount` when the project is `open_status` and the target would not
    /// be exceeded, switching to `funded_status` once the target is reached.
    pub async fn add_project_funding(
        &self,
        id: &Uuid,
        updated_at: &DateTime<Utc>,
        amount: &i64,
        open_status: &str,
        funded_status: &str,
    ) -> Result<bool> {
        let res = self
            .execute(
                sqlx::query(ADD_FUNDING)
                    .bind(updated_at)
                    .bind(amount)
                    .bind(funded_status)
                    .bind(id)
                    .bind(open_status),
            )
            .await?;
        Ok(res.rows_affected() == 1)
    }

    /// Returns false when the project is missing or has funding records.
    pub async fn delete_project_if_unfunded(&self, id: &Uuid) -> Result<bool> {
        let res = self
            .execute(sqlx::query(DELETE_IF_UNFUNDED).bind(id))
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
