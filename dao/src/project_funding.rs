use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use fb_db_postgresql::model::project_funding::ProjectFundingModel as ProjectFundingPostgresModel;
use fb_db_sqlite::model::project_funding::ProjectFundingModel as ProjectFundingSqliteModel;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::{project::ProjectDao, Db};

#[derive(EnumString, Display, Clone, Copy, PartialEq, Eq, Debug)]
#[strum(serialize_all = "snake_case")]
pub enum FundingStatus {
    Pending,
    Completed,
    Failed,
}

impl FundingStatus {
    pub fn can_settle_to(&self, to: &Self) -> bool {
        *self == Self::Pending && matches!(to, Self::Completed | Self::Failed)
    }
}

pub struct ProjectFundingDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_id: Uuid,
    funder_id: Uuid,
    amount: i64,
    status: FundingStatus,
}

impl ProjectFundingDao {
    pub fn new(project_id: &Uuid, funder_id: &Uuid, amount: &i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            project_id: *project_id,
            funder_id: *funder_id,
            amount: *amount,
            status: FundingStatus::Pending,
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

    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }

    pub fn funder_id(&self) -> &Uuid {
        &self.funder_id
    }

    pub fn amount(&self) -> &i64 {
        &self.amount
    }

    pub fn status(&self) -> &FundingStatus {
        &self.status
    }

    pub async fn db_insert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => db.insert_project_funding(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.insert_project_funding(&self.to_sqlitedb_model()).await,
        }
    }

    pub async fn db_select(db: &Db, id: &Uuid) -> Result<Option<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_project_funding(id)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))
                .transpose(),
            Db::SqliteDb(db) => db
                .select_project_funding(id)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))
                .transpose(),
        }
    }

    pub async fn db_select_many_by_funder_id(db: &Db, funder_id: &Uuid) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => {
                let fundings = db
                    .select_many_project_fundings_by_funder_id(funder_id)
                    .await?;
                let mut fundings_data = Vec::with_capacity(fundings.len());
                for funding in &fundings {
                    fundings_data.push(Self::from_postgresdb_model(funding)?);
                }
                Ok(fundings_data)
            }
            Db::SqliteDb(db) => {
                let fundings = db
                    .select_many_project_fundings_by_funder_id(funder_id)
                    .await?;
                let mut fundings_data = Vec::with_capacity(fundings.len());
                for funding in &fundings {
                    fundings_data.push(Self::from_sqlitedb_model(funding)?);
                }
                Ok(fundings_data)
            }
        }
    }

    pub async fn db_select_many_by_project_id(db: &Db, project_id: &Uuid) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => {
                let fundings = db
                    .select_many_project_fundings_by_project_id(project_id)
                    .await?;
                let mut fundings_data = Vec::with_capacity(fundings.len());
                for funding in &fundings {
                    fundings_data.push(Self::from_postgresdb_model(funding)?);
                }
                Ok(fundings_data)
            }
            Db::SqliteDb(db) => {
                let fundings = db
                    .select_many_project_fundings_by_project_id(project_id)
                    .await?;
                let mut fundings_data = Vec::with_capacity(fundings.len());
                for funding in &fundings {
                    fundings_data.push(Self::from_sqlitedb_model(funding)?);
                }
                Ok(fundings_data)
            }
        }
    }

    pub async fn db_sum_by_status(db: &Db, status: &FundingStatus) -> Result<i64> {
        let status = status.to_string();
        match db {
            Db::PostgresqlDb(db) => db.sum_project_fundings_by_status(&status).await,
            Db::SqliteDb(db) => db.sum_project_fundings_by_status(&status).await,
        }
    }

    /// Settles a pending funding. Completing it adds the amount to the project;
    /// when the project refuses the amount the funding goes back to pending.
    /// Returns false when nothing changed.
    pub async fn db_settle(&mut self, db: &Db, status: &FundingStatus) -> Result<bool> {
        if !self.status.can_settle_to(status) {
            return Ok(false);
        }
        let from = self.status;
        if !self.db_update_status_if(db, &from, status).await? {
            return Ok(false);
        }
        if *status == FundingStatus::Completed
            && !ProjectDao::db_add_funding(db, &self.project_id, &self.amount).await?
        {
            self.db_update_status_if(db, status, &FundingStatus::Pending)
                .await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn db_update_status_if(
        &mut self,
        db: &Db,
        from: &FundingStatus,
        to: &FundingStatus,
    ) -> Result<bool> {
        let now = Utc::now();
        let (from_str, to_str) = (from.to_string(), to.to_string());
        let updated = match db {
            Db::PostgresqlDb(db) => {
                db.update_project_funding_status_if(&self.id, &now, &from_str, &to_str)
                    .await?
            }
            Db::SqliteDb(db) => {
                db.update_project_funding_status_if(&self.id, &now, &from_str, &to_str)
                    .await?
            }
        };
        if updated {
            self.status = *to;
            self.updated_at = now;
        }
        Ok(updated)
    }

    fn from_postgresdb_model(model: &ProjectFundingPostgresModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            project_id: *model.project_id(),
            funder_id: *model.funder_id(),
            amount: *model.amount(),
            status: FundingStatus::from_str(model.status())?,
        })
    }

    fn to_postgresdb_model(&self) -> ProjectFundingPostgresModel {
        ProjectFundingPostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.project_id,
            &self.funder_id,
            &self.amount,
            &self.status.to_string(),
        )
    }

    fn from_sqlitedb_model(model: &ProjectFundingSqliteModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            project_id: *model.project_id(),
            funder_id: *model.funder_id(),
            amount: *model.amount(),
            status: FundingStatus::from_str(model.status())?,
        })
    }

    fn to_sqlitedb_model(&self) -> ProjectFundingSqliteModel {
        ProjectFundingSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.project_id,
            &self.funder_id,
            &self.amount,
            &self.status.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{FundingStatus, ProjectFundingDao};
    use crate::{
        memory_db,
        project::{ProjectDao, ProjectStatus},
        Db,
    };

    async fn approved_project(db: &Db, target: i64) -> ProjectDao {
        let mut project = ProjectDao::new(
            &Uuid::now_v7(),
            "Bakery oven",
            "A new oven for the neighbourhood bakery",
            &target,
            &6,
        );
        project.db_insert(db).await.unwrap();
        project.db_review(db, &ProjectStatus::Approved).await.unwrap();
        project
    }

    #[tokio::test]
    async fn completing_adds_to_project() {
        let db = memory_db().await;
        let project = approved_project(&db, 10000).await;
        let mut funding = ProjectFundingDao::new(project.id(), &Uuid::now_v7(), &4000);
        funding.db_insert(&db).await.unwrap();

        assert!(funding.db_settle(&db, &FundingStatus::Completed).await.unwrap());
        assert!(!funding.db_settle(&db, &FundingStatus::Failed).await.unwrap());

        let stored = ProjectDao::db_select(&db, project.id()).await.unwrap().unwrap();
        assert_eq!(*stored.current_amount(), 4000);
        assert_eq!(
            ProjectFundingDao::db_sum_by_status(&db, &FundingStatus::Completed)
                .await
                .unwrap(),
            4000
        );
    }

    #[tokio::test]
    async fn overflowing_completion_stays_pending() {
        let db = memory_db().await;
        let project = approved_project(&db, 1000).await;
        let mut funding = ProjectFundingDao::new(project.id(), &Uuid::now_v7(), &1500);
        funding.db_insert(&db).await.unwrap();

        assert!(!funding.db_settle(&db, &FundingStatus::Completed).await.unwrap());
        assert_eq!(funding.status(), &FundingStatus::Pending);

        let stored = ProjectFundingDao::db_select(&db, funding.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), &FundingStatus::Pending);
        assert!(funding.db_settle(&db, &FundingStatus::Failed).await.unwrap());
    }
}
