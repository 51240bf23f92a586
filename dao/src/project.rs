use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use fb_db_postgresql::model::project::ProjectModel as ProjectPostgresModel;
use fb_db_sqlite::model::project::ProjectModel as ProjectSqliteModel;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::Db;

#[derive(EnumString, Display, Clone, Copy, PartialEq, Eq, Debug)]
#[strum(serialize_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    Approved,
    Rejected,
    Funded,
}

impl ProjectStatus {
    /// Review decisions only move a project out of `Pending`. `Funded` is
    /// reached through completed fundings, never by review.
    pub fn can_review_to(&self, to: &Self) -> bool {
        *self == Self::Pending && matches!(to, Self::Approved | Self::Rejected)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Approved | Self::Funded)
    }
}

pub struct ProjectDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Uuid,
    title: String,
    description: String,
    target_amount: i64,
    current_amount: i64,
    duration_months: i32,
    status: ProjectStatus,
}

impl ProjectDao {
    pub fn new(
        user_id: &Uuid,
        title: &str,
        description: &str,
        target_amount: &i64,
        duration_months: &i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            user_id: *user_id,
            title: title.to_owned(),
            description: description.to_owned(),
            target_amount: *target_amount,
            current_amount: 0,
            duration_months: *duration_months,
            status: ProjectStatus::Pending,
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

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_amount(&self) -> &i64 {
        &self.target_amount
    }

    pub fn current_amount(&self) -> &i64 {
        &self.current_amount
    }

    pub fn duration_months(&self) -> &i32 {
        &self.duration_months
    }

    pub fn status(&self) -> &ProjectStatus {
        &self.status
    }

    pub fn remaining_amount(&self) -> i64 {
        (self.target_amount - self.current_amount).max(0)
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_owned();
    }

    pub async fn db_insert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => db.insert_project(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.insert_project(&self.to_sqlitedb_model()).await,
        }
    }

    pub async fn db_select(db: &Db, id: &Uuid) -> Result<Option<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_project(id)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))
                .transpose(),
            Db::SqliteDb(db) => db
                .select_project(id)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))
                .transpose(),
        }
    }

    /// Newest first.
    pub async fn db_select_many_by_user_id(db: &Db, user_id: &Uuid) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => {
                let projects = db.select_many_projects_by_user_id(user_id).await?;
                let mut projects_data = Vec::with_capacity(projects.len());
                for project in &projects {
                    projects_data.push(Self::from_postgresdb_model(project)?);
                }
                Ok(projects_data)
            }
            Db::SqliteDb(db) => {
                let projects = db.select_many_projects_by_user_id(user_id).await?;
                let mut projects_data = Vec::with_capacity(projects.len());
                for project in &projects {
                    projects_data.push(Self::from_sqlitedb_model(project)?);
                }
                Ok(projects_data)
            }
        }
    }

    /// Newest first.
    pub async fn db_select_many_by_status(db: &Db, status: &ProjectStatus) -> Result<Vec<Self>> {
        let status = status.to_string();
        match db {
            Db::PostgresqlDb(db) => {
                let projects = db.select_many_projects_by_status(&status).await?;
                let mut projects_data = Vec::with_capacity(projects.len());
                for project in &projects {
                    projects_data.push(Self::from_postgresdb_model(project)?);
                }
                Ok(projects_data)
            }
            Db::SqliteDb(db) => {
                let projects = db.select_many_projects_by_status(&status).await?;
                let mut projects_data = Vec::with_capacity(projects.len());
                for project in &projects {
                    projects_data.push(Self::from_sqlitedb_model(project)?);
                }
                Ok(projects_data)
            }
        }
    }

    pub async fn db_count_by_user_id(db: &Db, user_id: &Uuid) -> Result<i64> {
        match db {
            Db::PostgresqlDb(db) => db.count_projects_by_user_id(user_id).await,
            Db::SqliteDb(db) => db.count_projects_by_user_id(user_id).await,
        }
    }

    /// Saves title and description of a pending project. Returns false when
    /// the stored project has left `Pending` since it was read.
    pub async fn db_update(&mut self, db: &Db) -> Result<bool> {
        if self.status != ProjectStatus::Pending {
            return Ok(false);
        }
        let updated_at = self.updated_at;
        self.updated_at = Utc::now();
        let updated = match db {
            Db::PostgresqlDb(db) => {
                db.update_project_if_status(&self.to_postgresdb_model())
                    .await?
            }
            Db::SqliteDb(db) => db.update_project_if_status(&self.to_sqlitedb_model()).await?,
        };
        if !updated {
            self.updated_at = updated_at;
        }
        Ok(updated)
    }

    /// Applies a review decision. Returns false when the stored project was
    /// no longer in the status this one was read with.
    pub async fn db_review(&mut self, db: &Db, status: &ProjectStatus) -> Result<bool> {
        if !self.status.can_review_to(status) {
            return Ok(false);
        }
        let now = Utc::now();
        let (from, to) = (self.status.to_string(), status.to_string());
        let updated = match db {
            Db::PostgresqlDb(db) => {
                db.update_project_status_if(&self.id, &now, &from, &to)
                    .await?
            }
            Db::SqliteDb(db) => {
                db.update_project_status_if(&self.id, &now, &from, &to)
                    .await?
            }
        };
        if updated {
            self.status = *status;
            self.updated_at = now;
        }
        Ok(updated)
    }

    /// Adds a completed funding to an approved project. Returns false when the
    /// project is not approved or the amount would exceed the target.
    pub async fn db_add_funding(db: &Db, id: &Uuid, amount: &i64) -> Result<bool> {
        let now = Utc::now();
        let (open, funded) = (
            ProjectStatus::Approved.to_string(),
            ProjectStatus::Funded.to_string(),
        );
        match db {
            Db::PostgresqlDb(db) => {
                db.add_project_funding(id, &now, amount, &open, &funded)
                    .await
            }
            Db::SqliteDb(db) => {
                db.add_project_funding(id, &now, amount, &open, &funded)
                    .await
            }
        }
    }

    /// Projects that received any funding are kept so funding totals stay
    /// attached to a project. Returns false when nothing was deleted.
    pub async fn db_delete(db: &Db, id: &Uuid) -> Result<bool> {
        match db {
            Db::PostgresqlDb(db) => db.delete_project_if_unfunded(id).await,
            Db::SqliteDb(db) => db.delete_project_if_unfunded(id).await,
        }
    }

    fn from_postgresdb_model(model: &ProjectPostgresModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            user_id: *model.user_id(),
            title: model.title().to_owned(),
            description: model.description().to_owned(),
            target_amount: *model.target_amount(),
            current_amount: *model.current_amount(),
            duration_months: *model.duration_months(),
            status: ProjectStatus::from_str(model.status())?,
        })
    }

    fn to_postgresdb_model(&self) -> ProjectPostgresModel {
        ProjectPostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.user_id,
            &self.title,
            &self.description,
            &self.target_amount,
            &self.current_amount,
            &self.duration_months,
            &self.status.to_string(),
        )
    }

    fn from_sqlitedb_model(model: &ProjectSqliteModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            user_id: *model.user_id(),
            title: model.title().to_owned(),
            description: model.description().to_owned(),
            target_amount: *model.target_amount(),
            current_amount: *model.current_amount(),
            duration_months: *model.duration_months(),
            status: ProjectStatus::from_str(model.status())?,
        })
    }

    fn to_sqlitedb_model(&self) -> ProjectSqliteModel {
        ProjectSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.user_id,
            &self.title,
            &self.description,
            &self.target_amount,
            &self.current_amount,
            &self.duration_months,
            &self.status.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{ProjectDao, ProjectStatus};
    use crate::memory_db;

    #[test]
    fn review_transitions() {
        use ProjectStatus::*;
        assert!(Pending.can_review_to(&Approved));
        assert!(Pending.can_review_to(&Rejected));
        assert!(!Pending.can_review_to(&Funded));
        assert!(!Pending.can_review_to(&Pending));
        assert!(!Approved.can_review_to(&Rejected));
        assert!(!Rejected.can_review_to(&Approved));
        assert!(!Funded.can_review_to(&Pending));
    }

    #[tokio::test]
    async fn review_then_fund_to_target() {
        let db = memory_db().await;
        let mut project = ProjectDao::new(
            &Uuid::now_v7(),
            "Community well",
            "Drilling a well for the whole village",
            &5000,
            &12,
        );
        project.db_insert(&db).await.unwrap();

        assert!(!ProjectDao::db_add_funding(&db, project.id(), &1000).await.unwrap());
        assert!(project.db_review(&db, &ProjectStatus::Approved).await.unwrap());
        assert!(!project.db_review(&db, &ProjectStatus::Rejected).await.unwrap());

        assert!(ProjectDao::db_add_funding(&db, project.id(), &3000).await.unwrap());
        assert!(!ProjectDao::db_add_funding(&db, project.id(), &3000).await.unwrap());
        assert!(ProjectDao::db_add_funding(&db, project.id(), &2000).await.unwrap());

        let stored = ProjectDao::db_select(&db, project.id()).await.unwrap().unwrap();
        assert_eq!(*stored.current_amount(), 5000);
        assert_eq!(stored.status(), &ProjectStatus::Funded);
        assert_eq!(stored.remaining_amount(), 0);
    }

    #[tokio::test]
    async fn stale_review_is_rejected() {
        let db = memory_db().await;
        let mut project = ProjectDao::new(
            &Uuid::now_v7(),
            "Library books",
            "Buying books for the school library",
            &2000,
            &3,
        );
        project.db_insert(&db).await.unwrap();
        let mut stale = ProjectDao::db_select(&db, project.id()).await.unwrap().unwrap();

        assert!(project.db_review(&db, &ProjectStatus::Rejected).await.unwrap());
        assert!(!stale.db_review(&db, &ProjectStatus::Approved).await.unwrap());
        assert_eq!(stale.status(), &ProjectStatus::Pending);
    }

    #[tokio::test]
    async fn edit_never_reverts_a_review() {
        let db = memory_db().await;
        let mut project = ProjectDao::new(
            &Uuid::now_v7(),
            "Market stalls",
            "Covered stalls for the weekly market",
            &4000,
            &6,
        );
        project.db_insert(&db).await.unwrap();
        let mut owner_copy = ProjectDao::db_select(&db, project.id()).await.unwrap().unwrap();

        assert!(project.db_review(&db, &ProjectStatus::Approved).await.unwrap());

        owner_copy.set_title("Market stalls v2");
        assert!(!owner_copy.db_update(&db).await.unwrap());

        let stored = ProjectDao::db_select(&db, project.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), &ProjectStatus::Approved);
        assert_eq!(stored.title(), "Market stalls");

        let mut approved = stored;
        approved.set_title("Market stalls v3");
        assert!(!approved.db_update(&db).await.unwrap());
    }
}
