use anyhow::Result;
use sqlx::{
    types::chrono::{DateTime, Utc},
    Executor, Pool, Sqlite,
};
use uuid::Uuid;

use crate::{db::SqliteDb, model::project_funding::ProjectFundingModel};

const INSERT: &str = "INSERT INTO \"project_fundings\" (\"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\") VALUES (?, ?, ?, ?, ?, ?, ?)";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\" FROM \"project_fundings\" WHERE \"id\" = ?";
const SELECT_MANY_BY_FUNDER_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\" FROM \"project_fundings\" WHERE \"funder_id\" = ? ORDER BY \"created_at\" DESC";
const SELECT_MANY_BY_PROJECT_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"project_id\", \"funder_id\", \"amount\", \"status\" FROM \"project_fundings\" WHERE \"project_id\" = ? ORDER BY \"created_at\" DESC";
const UPDATE_STATUS_IF: &str = "UPDATE \"project_fundings\" SET \"updated_at\" = ?, \"status\" = ? WHERE \"id\" = ? AND \"status\" = ?";
const SUM_BY_STATUS: &str = "SELECT COALESCE(SUM(\"amount\"), 0) FROM \"project_fundings\" WHERE \"status\" = ?";

pub async fn init(pool: &Pool<Sqlite>) -> Result<()> {
    fb_log::info(Some("🔧"), "[SQLite] Setting up project_fundings table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"project_fundings\" (\"id\" blob, \"created_at\" datetime, \"updated_at\" datetime, \"project_id\" blob NOT NULL, \"funder_id\" blob NOT NULL, \"amount\" integer NOT NULL, \"status\" text NOT NULL, PRIMARY KEY (\"id\"))").await?;

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

impl SqliteDb {
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
