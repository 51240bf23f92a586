use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use fb_db_postgresql::model::user_subscription::UserSubscriptionModel as UserSubscriptionPostgresModel;
use fb_db_sqlite::model::user_subscription::UserSubscriptionModel as UserSubscriptionSqliteModel;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::Db;

#[derive(EnumString, Display, Clone, Copy, PartialEq, Eq, Debug)]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

pub struct UserSubscriptionDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Uuid,
    plan_id: Uuid,
    status: SubscriptionStatus,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    payment_id: String,
}

impl UserSubscriptionDao {
    pub fn new(user_id: &Uuid, plan_id: &Uuid, payment_id: &str, duration_days: &i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            user_id: *user_id,
            plan_id: *plan_id,
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: now + Duration::days(*duration_days),
            payment_id: payment_id.to_owned(),
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

    pub fn user_id(&self) -> &Uuid {
        &self.user_id
    }

    pub fn plan_id(&self) -> &Uuid {
        &self.plan_id
    }

    pub fn status(&self) -> &SubscriptionStatus {
        &self.status
    }

    pub fn start_date(&self) -> &DateTime<Utc> {
        &self.start_date
    }

    pub fn end_date(&self) -> &DateTime<Utc> {
        &self.end_date
    }

    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Activates the subscription paid by `payment_id`.
    ///
    /// A payment id activates at most one subscription: when a row for it
    /// already exists, that row is returned unchanged. Otherwise every other
    /// active subscription of the user is cancelled before the new row is
    /// inserted. A concurrent insert of the same payment id loses on the
    /// unique column and falls back to the stored row.
    pub async fn activate(
        db: &Db,
        user_id: &Uuid,
        plan_id: &Uuid,
        payment_id: &str,
        duration_days: &i64,
    ) -> Result<Self> {
        if let Some(subscription) = Self::db_select_by_payment_id(db, payment_id).await? {
            return Ok(subscription);
        }

        Self::db_update_status_by_user_id(
            db,
            user_id,
            payment_id,
            &SubscriptionStatus::Active,
            &SubscriptionStatus::Cancelled,
        )
        .await?;

        let subscription = Self::new(user_id, plan_id, payment_id, duration_days);
        match subscription.db_insert(db).await {
            Ok(_) => Ok(subscription),
            Err(err) => match Self::db_select_by_payment_id(db, payment_id).await? {
                Some(subscription) => Ok(subscription),
                None => Err(err),
            },
        }
    }

    pub async fn db_insert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => {
                db.insert_user_subscription(&self.to_postgresdb_model())
                    .await
            }
            Db::SqliteDb(db) => db.insert_user_subscription(&self.to_sqlitedb_model()).await,
        }
    }

    pub async fn db_select(db: &Db, id: &Uuid) -> Result<Option<Self>> {
        let subscription = match db {
            Db::PostgresqlDb(db) => db
                .select_user_subscription(id)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))
                .transpose()?,
            Db::SqliteDb(db) => db
                .select_user_subscription(id)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))
                .transpose()?,
        };
        match subscription {
            Some(mut subscription) => {
                subscription.expire_if_ended(db).await?;
                Ok(Some(subscription))
            }
            None => Ok(None),
        }
    }

    pub async fn db_select_by_payment_id(db: &Db, payment_id: &str) -> Result<Option<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_user_subscription_by_payment_id(payment_id)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))
                .transpose(),
            Db::SqliteDb(db) => db
                .select_user_subscription_by_payment_id(payment_id)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))
                .transpose(),
        }
    }

    /// The user's active subscription. One found past its end date is
    /// marked expired and not returned.
    pub async fn db_select_active_by_user_id(db: &Db, user_id: &Uuid) -> Result<Option<Self>> {
        let status = SubscriptionStatus::Active.to_string();
        let subscription = match db {
            Db::PostgresqlDb(db) => db
                .select_user_subscription_by_user_id_and_status(user_id, &status)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))
                .transpose()?,
            Db::SqliteDb(db) => db
                .select_user_subscription_by_user_id_and_status(user_id, &status)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))
                .transpose()?,
        };
        match subscription {
            Some(mut subscription) => {
                subscription.expire_if_ended(db).await?;
                if subscription.is_active() {
                    Ok(Some(subscription))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    pub async fn db_select_many_by_user_id(db: &Db, user_id: &Uuid) -> Result<Vec<Self>> {
        let mut subscriptions = match db {
            Db::PostgresqlDb(db) => {
                let models = db.select_many_user_subscriptions_by_user_id(user_id).await?;
                let mut subscriptions = Vec::with_capacity(models.len());
                for model in &models {
                    subscriptions.push(Self::from_postgresdb_model(model)?);
                }
                subscriptions
            }
            Db::SqliteDb(db) => {
                let models = db.select_many_user_subscriptions_by_user_id(user_id).await?;
                let mut subscriptions = Vec::with_capacity(models.len());
                for model in &models {
                    subscriptions.push(Self::from_sqlitedb_model(model)?);
                }
                subscriptions
            }
        };
        for subscription in &mut subscriptions {
            subscription.expire_if_ended(db).await?;
        }
        Ok(subscriptions)
    }

    pub async fn db_update_status(&mut self, db: &Db, status: &SubscriptionStatus) -> Result<()> {
        let now = Utc::now();
        let status_str = status.to_string();
        match db {
            Db::PostgresqlDb(db) => {
                db.update_user_subscription_status(&self.id, &now, &status_str)
                    .await?
            }
            Db::SqliteDb(db) => {
                db.update_user_subscription_status(&self.id, &now, &status_str)
                    .await?
            }
        }
        self.status = *status;
        self.updated_at = now;
        Ok(())
    }

    async fn db_update_status_by_user_id(
        db: &Db,
        user_id: &Uuid,
        keep_payment_id: &str,
        from: &SubscriptionStatus,
        to: &SubscriptionStatus,
    ) -> Result<u64> {
        let now = Utc::now();
        let (from, to) = (from.to_string(), to.to_string());
        match db {
            Db::PostgresqlDb(db) => {
                db.update_user_subscriptions_status_by_user_id(
                    user_id,
                    keep_payment_id,
                    &now,
                    &from,
                    &to,
                )
                    .await
            }
            Db::SqliteDb(db) => {
                db.update_user_subscriptions_status_by_user_id(
                    user_id,
                    keep_payment_id,
                    &now,
                    &from,
                    &to,
                )
                    .await
            }
        }
    }

    async fn expire_if_ended(&mut self, db: &Db) -> Result<()> {
        if self.is_active() && self.end_date < Utc::now() {
            self.db_update_status(db, &SubscriptionStatus::Expired)
                .await?;
        }
        Ok(())
    }

    fn from_postgresdb_model(model: &UserSubscriptionPostgresModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            user_id: *model.user_id(),
            plan_id: *model.plan_id(),
            status: SubscriptionStatus::from_str(model.status())?,
            start_date: *model.start_date(),
            end_date: *model.end_date(),
            payment_id: model.payment_id().to_owned(),
        })
    }

    fn to_postgresdb_model(&self) -> UserSubscriptionPostgresModel {
        UserSubscriptionPostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.user_id,
            &self.plan_id,
            &self.status.to_string(),
            &self.start_date,
            &self.end_date,
            &self.payment_id,
        )
    }

    fn from_sqlitedb_model(model: &UserSubscriptionSqliteModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            user_id: *model.user_id(),
            plan_id: *model.plan_id(),
            status: SubscriptionStatus::from_str(model.status())?,
            start_date: *model.start_date(),
            end_date: *model.end_date(),
            payment_id: model.payment_id().to_owned(),
        })
    }

    fn to_sqlitedb_model(&self) -> UserSubscriptionSqliteModel {
        UserSubscriptionSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.user_id,
            &self.plan_id,
            &self.status.to_string(),
            &self.start_date,
            &self.end_date,
            &self.payment_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{SubscriptionStatus, UserSubscriptionDao};
    use crate::memory_db;

    #[tokio::test]
    async fn activating_twice_keeps_one_row() {
        let db = memory_db().await;
        let (user_id, plan_id) = (Uuid::now_v7(), Uuid::now_v7());

        let first = UserSubscriptionDao::activate(&db, &user_id, &plan_id, "cs_test_1", &30)
            .await
            .unwrap();
        let second = UserSubscriptionDao::activate(&db, &user_id, &plan_id, "cs_test_1", &30)
            .await
            .unwrap();

        assert_eq!(first.id(), second.id());
        let all = UserSubscriptionDao::db_select_many_by_user_id(&db, &user_id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_active());
    }

    #[tokio::test]
    async fn new_payment_cancels_previous_active() {
        let db = memory_db().await;
        let user_id = Uuid::now_v7();

        let first = UserSubscriptionDao::activate(&db, &user_id, &Uuid::now_v7(), "cs_a", &30)
            .await
            .unwrap();
        let second = UserSubscriptionDao::activate(&db, &user_id, &Uuid::now_v7(), "cs_b", &30)
            .await
            .unwrap();

        let active = UserSubscriptionDao::db_select_active_by_user_id(&db, &user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.id(), second.id());

        let previous = UserSubscriptionDao::db_select(&db, first.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(previous.status(), &SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn ended_subscription_expires_on_read() {
        let db = memory_db().await;
        let user_id = Uuid::now_v7();
        let subscription = UserSubscriptionDao::new(&user_id, &Uuid::now_v7(), "cs_old", &-1);
        subscription.db_insert(&db).await.unwrap();

        assert!(UserSubscriptionDao::db_select_active_by_user_id(&db, &user_id)
            .await
            .unwrap()
            .is_none());
        let stored = UserSubscriptionDao::db_select(&db, subscription.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), &SubscriptionStatus::Expired);
    }
}
