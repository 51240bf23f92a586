use anyhow::Result;
use sqlx::{
    types::chrono::{DateTime, Utc},
    Executor, Pool, Postgres,
};
use uuid::Uuid;

use crate::{db::PostgresDb, model::project_funding::ProjectFundingModel};

const INSERT: &str = "INSERT INTO \"project_fundings\" (\"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\") VALUES ($1, $2, $3, $4, $5, $6, $7)";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\" FROM \"project_fundings\" WHERE \"id\" = $1";
const SELECT_MANY_BY_FUNDER_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\" FROM \"project_fundings\" WHERE \"funder_id\" = $1 ORDER BY \"created_at\" DESC";
const SELECT_MANY_BY_PROJECT_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\" FROM \"project_fundings\" WHERE \"project_id\" = $1 ORDER BY \"created_at\" DESC";
const UPDATE_STATUS_IF: &str = "UPDATE \"project_fundings\" SET \"updated_at\" = $1, \"status\" = $2 WHERE \"id\" = $3 AND \"status\" = $4";
const SUM_BY_STATUS: &str = "SELECT COALESCE(SUM(\"amount\"), 0)::bigint FROM \"project_fundings\" WHERE \"status\" = $1";

pub async fn init(pool: &Pool<Postgres>) -> Result<()> {
    fb_log::info(Some("🔧"), "[PostgreSQL] Setting up project_fundings table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"project_fundings\" (\"id\" uuid, \"created_at\" timestamptz, \"updated_at\" timestamptz, \"project_id\" uuid NOT NULL, \"funder_id\" uuid NOT NULL, \"amount\" bigint NOT NULL, \"status\" text NOT NULL, PRIMARY KEY (\"id\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_MANY_BY_FUNDER_ID),
        pool.prepare(SELECT_MANY_BY_PROJECT_ID),
        pool.prepare(UPDATE_STATUS_IF),
        pool.prepare(SUM_BY_STATUS),
    )?;

    Ok(())
}

impl PostgresDb {
    pub async fn insert_project_funding(&self, value: &ProjectFundingModel) -> Result<()> {
        self.execute(
            sqlx::query(INSERT)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.project_id())
                .bind(value.funder_id())
                .bind(value.amount())
                .bind(value.status()),
        )
        .await?;
        Ok(())
    }

    pub async fn select_project_funding(&self, id: &Uuid) -> Result<Option<ProjectFundingModel>> {
        Ok(self.fetch_optional(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_many_project_fundings_by_funder_id(
        &self,
        funder_id: &Uuid,
    ) -> Result<Vec<ProjectFundingModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_FUNDER_ID).bind(funder_id))
            .await?)
    }

    pub async fn select_many_project_fundings_by_project_id(
        &self,
        project_id: &Uuid,
    ) -> Result<Vec<ProjectFundingModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_PROJECT_ID).bind(project_id))
            .await?)
    }

    pub async fn update_project_funding_status_if(
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

    pub async fn sum_project_fundings_by_status(&self, status: &str) -> Result<i64> {
        let (sum,): (i64,) = self
            .fetch_one(sqlx::query_as(SUM_BY_STATUS).bind(status))
            .await?;
        Ok(sum)
    }
}
