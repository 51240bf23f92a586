use anyhow::Result;
use chrono::{DateTime, Utc};
use fb_db_postgresql::model::subscription_plan::SubscriptionPlanModel as SubscriptionPlanPostgresModel;
use fb_db_sqlite::model::subscription_plan::SubscriptionPlanModel as SubscriptionPlanSqliteModel;
use uuid::Uuid;

use crate::Db;

pub struct SubscriptionPlanDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    description: String,
    price: i64,
    features: Vec<String>,
    max_projects: Option<i32>,
}

impl SubscriptionPlanDao {
    pub fn new(
        name: &str,
        description: &str,
        price: &i64,
        features: &[String],
        max_projects: &Option<i32>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            name: name.to_owned(),
            description: description.to_owned(),
            price: *price,
            features: features.to_vec(),
            max_projects: *max_projects,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> &i64 {
        &self.price
    }

    pub fn features(&self) -> &Vec<String> {
        &self.features
    }

    /// `None` means the plan has no submission limit.
    pub fn max_projects(&self) -> &Option<i32> {
        &self.max_projects
    }

    pub fn allows_another_project(&self, current_count: &i64) -> bool {
        match self.max_projects {
            Some(max) => *current_count < i64::from(max),
            None => true,
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_owned();
    }

    pub fn set_price(&mut self, price: &i64) {
        self.price = *price;
    }

    pub fn set_features(&mut self, features: &[String]) {
        self.features = features.to_vec();
    }

    pub fn set_max_projects(&mut self, max_projects: &Option<i32>) {
        self.max_projects = *max_projects;
    }

    pub async fn db_insert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => {
                db.insert_subscription_plan(&self.to_postgresdb_model())
                    .await
            }
            Db::SqliteDb(db) => db.insert_subscription_plan(&self.to_sqlitedb_model()).await,
        }
    }

    pub async fn db_select(db: &Db, id: &Uuid) -> Result<Option<Self>> {
        match db {
            Db::PostgresqlDb(db) => Ok(db
                .select_subscription_plan(id)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))),
            Db::SqliteDb(db) => Ok(db
                .select_subscription_plan(id)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))),
        }
    }

    /// Plans ordered by price, cheapest first.
    pub async fn db_select_all(db: &Db) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => Ok(db
                .select_all_subscription_plans()
                .await?
                .iter()
                .map(Self::from_postgresdb_model)
                .collect()),
            Db::SqliteDb(db) => Ok(db
                .select_all_subscription_plans()
                .await?
                .iter()
                .map(Self::from_sqlitedb_model)
                .collect()),
        }
    }

    pub async fn db_count(db: &Db) -> Result<i64> {
        match db {
            Db::PostgresqlDb(db) => db.count_subscription_plans().await,
            Db::SqliteDb(db) => db.count_subscription_plans().await,
        }
    }

    /// Inserts `plans` only when no plan exists yet. Returns how many were inserted.
    pub async fn db_seed(db: &Db, plans: &[Self]) -> Result<usize> {
        if Self::db_count(db).await? > 0 {
            return Ok(0);
        }
        for plan in plans {
            plan.db_insert(db).await?;
        }
        Ok(plans.len())
    }

    pub async fn db_update(&mut self, db: &Db) -> Result<()> {
        self.updated_at = Utc::now();
        match db {
            Db::PostgresqlDb(db) => {
                db.update_subscription_plan(&self.to_postgresdb_model())
                    .await
            }
            Db::SqliteDb(db) => db.update_subscription_plan(&self.to_sqlitedb_model()).await,
        }
    }

    pub async fn db_delete(db: &Db, id: &Uuid) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => db.delete_subscription_plan(id).await,
            Db::SqliteDb(db) => db.delete_subscription_plan(id).await,
        }
    }

    fn from_postgresdb_model(model: &SubscriptionPlanPostgresModel) -> Self {
        Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            name: model.name().to_owned(),
            description: model.description().to_owned(),
            price: *model.price(),
            features: model.features().0.clone(),
            max_projects: *model.max_projects(),
        }
    }

    fn to_postgresdb_model(&self) -> SubscriptionPlanPostgresModel {
        SubscriptionPlanPostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.name,
            &self.description,
            &self.price,
            &self.features,
            &self.max_projects,
        )
    }

    fn from_sqlitedb_model(model: &SubscriptionPlanSqliteModel) -> Self {
        Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            name: model.name().to_owned(),
            description: model.description().to_owned(),
            price: *model.price(),
            features: model.features().0.clone(),
            max_projects: *model.max_projects(),
        }
    }

    fn to_sqlitedb_model(&self) -> SubscriptionPlanSqliteModel {
        SubscriptionPlanSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.name,
            &self.description,
            &self.price,
            &self.features,
            &self.max_projects,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionPlanDao;
    use crate::memory_db;

    fn plan(name: &str, price: i64, max_projects: Option<i32>) -> SubscriptionPlanDao {
        SubscriptionPlanDao::new(
            name,
            "For testing",
            &price,
            &["Feature".to_owned()],
            &max_projects,
        )
    }

    #[test]
    fn submission_limit() {
        let basic = plan("Basic Plan", 5000, Some(2));
        assert!(basic.allows_another_project(&0));
        assert!(basic.allows_another_project(&1));
        assert!(!basic.allows_another_project(&2));

        let enterprise = plan("Enterprise Plan", 50000, None);
        assert!(enterprise.allows_another_project(&1000));
    }

    #[tokio::test]
    async fn seed_only_fills_empty_table() {
        let db = memory_db().await;
        let plans = vec![
            plan("Pro Plan", 15000, Some(5)),
            plan("Basic Plan", 5000, Some(2)),
        ];
        assert_eq!(SubscriptionPlanDao::db_seed(&db, &plans).await.unwrap(), 2);
        assert_eq!(SubscriptionPlanDao::db_seed(&db, &plans).await.unwrap(), 0);

        let stored = SubscriptionPlanDao::db_select_all(&db).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name(), "Basic Plan");
        assert_eq!(stored[0].features(), &vec!["Feature".to_owned()]);
        assert_eq!(stored[1].max_projects(), &Some(5));
    }
}
