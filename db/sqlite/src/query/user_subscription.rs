use anyhow::Result;
use sqlx::{
    types::chrono::{DateTime, Utc},
    Executor, Pool, Sqlite,
};
use uuid::Uuid;

use crate::{db::SqliteDb, model::user_subscription::UserSubscriptionModel};

const INSERT: &str = "INSERT INTO \"user_subscriptions\" (\"id\", \"created_at\", \"updated_at\", \"user_id\", \"plan_id\", \"status\", \"start_date\", \"end_date\", \"payment_id\") VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"plan_id\", \"status\", \"start_date\", \"end_date\", \"payment_id\" FROM \"user_subscriptions\" WHERE \"id\" = ?";
const SELECT_BY_PAYMENT_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"plan_id\", \"status\", \"start_date\", \"end_date\", \"payment_id\" FROM \"user_subscriptions\" WHERE \"payment_id\" = ?";
const SELECT_MANY_BY_USER_ID: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"plan_id\", \"status\", \"start_date\", \"end_date\", \"payment_id\" FROM \"user_subscriptions\" WHERE \"user_id\" = ? ORDER BY \"created_at\" DESC";
const SELECT_BY_USER_ID_AND_STATUS: &str = "SELECT \"id\", \"created_at\", \"updated_at\", \"user_id\", \"plan_id\", \"status\", \"start_date\", \"end_date\", \"payment_id\" FROM \"user_subscriptions\" WHERE \"user_id\" = ? AND \"status\" = ? ORDER BY \"created_at\" DESC LIMIT 1";
const UPDATE_STATUS: &str = "UPDATE \"user_subscriptions\" SET \"updated_at\" = ?, \"status\" = ? WHERE \"id\" = ?";
const UPDATE_STATUS_BY_USER_ID: &str = "UPDATE \"user_subscriptions\" SET \"updated_at\" = ?, \"status\" = ? WHERE \"user_id\" = ? AND \"status\" = ? AND \"payment_id\" <> ?";

pub async fn init(pool: &Pool<Sqlite>) -> Result<()> {
    fb_log::info(Some("🔧"), "[SQLite] Setting up user_subscriptions table");

    pool.execute("CREATE TABLE IF NOT EXISTS \"user_subscriptions\" (\"id\" blob, \"created_at\" datetime, \"updated_at\" datetime, \"user_id\" blob NOT NULL, \"plan_id\" blob NOT NULL, \"status\" text NOT NULL, \"start_date\" datetime NOT NULL, \"end_date\" datetime NOT NULL, \"payment_id\" text NOT NULL UNIQUE, PRIMARY KEY (\"id\"))").await?;

    tokio::try_join!(
        pool.prepare(INSERT),
        pool.prepare(SELECT),
        pool.prepare(SELECT_BY_PAYMENT_ID),
        pool.prepare(SELECT_MANY_BY_USER_ID),
        pool.prepare(SELECT_BY_USER_ID_AND_STATUS),
        pool.prepare(UPDATE_STATUS),
        pool.prepare(UPDATE_STATUS_BY_USER_ID),
    )?;

    Ok(())
}

impl SqliteDb {
    pub async fn insert_user_subscription(&self, value: &UserSubscriptionModel) -> Result<()> {
        self.execute(
            sqlx::query(INSERT)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.user_id())
                .bind(value.plan_id())
                .bind(value.status())
                .bind(value.start_date())
                .bind(value.end_date())
                .bind(value.payment_id()),
        )
        .await?;
        Ok(())
    }

    pub async fn select_user_subscription(&self, id: &Uuid) -> Result<Option<UserSubscriptionModel>> {
        Ok(self.fetch_optional(sqlx::query_as(SELECT).bind(id)).await?)
    }

    pub async fn select_user_subscription_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<UserSubscriptionModel>> {
        Ok(self
            .fetch_optional(sqlx::query_as(SELECT_BY_PAYMENT_ID).bind(payment_id))
            .await?)
    }

    pub async fn select_many_user_subscriptions_by_user_id(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<UserSubscriptionModel>> {
        Ok(self
            .fetch_all(sqlx::query_as(SELECT_MANY_BY_USER_ID).bind(user_id))
            .await?)
    }

    pub async fn select_user_subscription_by_user_id_and_status(
        &self,
        user_id: &Uuid,
        status: &str,
    ) -> Result<Option<UserSubscriptionModel>> {
        Ok(self
            .fetch_optional(
                sqlx::query_as(SELECT_BY_USER_ID_AND_STATUS)
                    .bind(user_id)
                    .bind(status),
            )
            .await?)
    }

    pub async fn update_user_subscription_status(
        &self,
        id: &Uuid,
        updated_at: &DateTime<Utc>,
        status: &str,
    ) -> Result<()> {
        self.execute(
            sqlx::query(UPDATE_STATUS)
                .bind(updated_at)
                .bind(status)
                .bind(id),
        )
        .await?;
        Ok(())
    }

    /// Moves every subscription of `user_id` in `from_status` to `to_status`,
    /// except the one paid by `keep_payment_id`.
    pub async fn update_user_subscriptions_status_by_user_id(
        &self,
        user_id: &Uuid,
        keep_payment_id: &str,
        updated_at: &DateTime<Utc>,
        from_status: &str,
        to_status: &str,
    ) -> Result<u64> {
        let res = self
            .execute(
                sqlx::query(UPDATE_STATUS_BY_USER_ID)
                    .bind(updated_at)
                    .bind(to_status)
                    .bind(user_id)
                    .bind(from_status)
                    .bind(keep_payment_id),
            )
            .await?;
        Ok(res.rows_affected())
    }
}
