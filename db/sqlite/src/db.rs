use anyhow::Result;
use sqlx::{
    query::{Query, QueryAs},
    sqlite::{SqliteArguments, SqlitePoolOptions, SqliteQueryResult, SqliteRow},
    Error, Pool, Sqlite,
};

use crate::query::{profile, project, project_funding, subscription_plan, user_subscription};

pub struct SqliteDb {
    pool: Pool<Sqlite>,
}

impl SqliteDb {
    pub async fn new(path: &str, max_connections: &u32) -> Result<Self> {
        fb_log::info(Some("⚡"), "[SQLite] Initializing component");

        let url = format!("sqlite:{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(*max_connections)
            .connect(&url)
            .await?;

        Self::init(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn execute<'a>(
        &self,
        query: Query<'a, Sqlite, SqliteArguments<'a>>,
    ) -> Result<SqliteQueryResult, Error> {
        query.execute(&self.pool).await
    }

    pub async fn fetch_one<'a, T: Send + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
    ) -> Result<T, Error> {
        query.fetch_one(&self.pool).await
    }

    pub async fn fetch_optional<'a, T: Send + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
    ) -> Result<Option<T>, Error> {
        query.fetch_optional(&self.pool).await
    }

    pub async fn fetch_all<'a, T: Send + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
    ) -> Result<Vec<T>, Error> {
        query.fetch_all(&self.pool).await
    }

    async fn init(pool: &Pool<Sqlite>) -> Result<()> {
        profile::init(pool).await?;
        subscription_plan::init(pool).await?;
        user_subscription::init(pool).await?;
        project_funding::init(pool).await?;
        project::init(pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::types::chrono::Utc;
    use uuid::Uuid;

    use crate::model::project::ProjectModel;

    use super::SqliteDb;

    async fn project(db: &SqliteDb, target: i64, current: i64) -> Uuid {
        let now = Utc::now();
        let id = Uuid::now_v7();
        db.insert_project(&ProjectModel::new(
            &id,
            &now,
            &now,
            &Uuid::now_v7(),
            "Solar kiosk",
            "A kiosk that sells solar lamps",
            &target,
            &current,
            &6,
            "approved",
        ))
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn funding_never_exceeds_target() {
        let db = SqliteDb::new(":memory:", &1).await.unwrap();
        let id = project(&db, 10000, 9000).await;
        let now = Utc::now();

        let added = db
            .add_project_funding(&id, &now, &2000, "approved", "funded")
            .await
            .unwrap();
        assert!(!added);

        let added = db
            .add_project_funding(&id, &now, &1000, "approved", "funded")
            .await
            .unwrap();
        assert!(added);

        let stored = db.select_project(&id).await.unwrap().unwrap();
        assert_eq!(*stored.current_amount(), 10000);
        assert_eq!(stored.status(), "funded");

        let added = db
            .add_project_funding(&id, &now, &1, "approved", "funded")
            .await
            .unwrap();
        assert!(!added);
    }

    #[tokio::test]
    async fn missing_rows_select_as_none() {
        let db = SqliteDb::new(":memory:", &1).await.unwrap();
        assert!(db.select_profile(&Uuid::now_v7()).await.unwrap().is_none());
        assert!(db
            .select_user_subscription_by_payment_id("cs_missing")
            .await
            .unwrap()
            .is_none());
        assert_eq!(db.sum_project_fundings_by_status("completed").await.unwrap(), 0);
    }
}
