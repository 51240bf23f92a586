use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use fb_db_postgresql::model::profile::ProfileModel as ProfilePostgresModel;
use fb_db_sqlite::model::profile::ProfileModel as ProfileSqliteModel;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::Db;

#[derive(EnumString, Display, Clone, Copy, PartialEq, Eq, Debug)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

pub struct ProfileDao {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: String,
    password_hash: String,
    full_name: String,
    role: Role,
}

impl ProfileDao {
    pub fn new(email: &str, password_hash: &str, full_name: &str, role: &Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            full_name: full_name.to_owned(),
            role: *role,
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

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn set_password_hash(&mut self, password_hash: &str) {
        self.password_hash = password_hash.to_owned();
    }

    pub fn set_full_name(&mut self, full_name: &str) {
        self.full_name = full_name.to_owned();
    }

    pub fn set_role(&mut self, role: &Role) {
        self.role = *role;
    }

    pub async fn db_insert(&self, db: &Db) -> Result<()> {
        match db {
            Db::PostgresqlDb(db) => db.insert_profile(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.insert_profile(&self.to_sqlitedb_model()).await,
        }
    }

    pub async fn db_select(db: &Db, id: &Uuid) -> Result<Option<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_profile(id)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))
                .transpose(),
            Db::SqliteDb(db) => db
                .select_profile(id)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))
                .transpose(),
        }
    }

    pub async fn db_select_by_email(db: &Db, email: &str) -> Result<Option<Self>> {
        match db {
            Db::PostgresqlDb(db) => db
                .select_profile_by_email(email)
                .await?
                .map(|m| Self::from_postgresdb_model(&m))
                .transpose(),
            Db::SqliteDb(db) => db
                .select_profile_by_email(email)
                .await?
                .map(|m| Self::from_sqlitedb_model(&m))
                .transpose(),
        }
    }

    pub async fn db_select_many(db: &Db) -> Result<Vec<Self>> {
        match db {
            Db::PostgresqlDb(db) => {
                let profiles = db.select_many_profiles().await?;
                let mut profiles_data = Vec::with_capacity(profiles.len());
                for profile in &profiles {
                    profiles_data.push(Self::from_postgresdb_model(profile)?);
                }
                Ok(profiles_data)
            }
            Db::SqliteDb(db) => {
                let profiles = db.select_many_profiles().await?;
                let mut profiles_data = Vec::with_capacity(profiles.len());
                for profile in &profiles {
                    profiles_data.push(Self::from_sqlitedb_model(profile)?);
                }
                Ok(profiles_data)
            }
        }
    }

    pub async fn db_count(db: &Db) -> Result<i64> {
        match db {
            Db::PostgresqlDb(db) => db.count_profiles().await,
            Db::SqliteDb(db) => db.count_profiles().await,
        }
    }

    pub async fn db_update(&mut self, db: &Db) -> Result<()> {
        self.updated_at = Utc::now();
        match db {
            Db::PostgresqlDb(db) => db.update_profile(&self.to_postgresdb_model()).await,
            Db::SqliteDb(db) => db.update_profile(&self.to_sqlitedb_model()).await,
        }
    }

    fn from_postgresdb_model(model: &ProfilePostgresModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            email: model.email().to_owned(),
            password_hash: model.password_hash().to_owned(),
            full_name: model.full_name().to_owned(),
            role: Role::from_str(model.role())?,
        })
    }

    fn to_postgresdb_model(&self) -> ProfilePostgresModel {
        ProfilePostgresModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.email,
            &self.password_hash,
            &self.full_name,
            &self.role.to_string(),
        )
    }

    fn from_sqlitedb_model(model: &ProfileSqliteModel) -> Result<Self> {
        Ok(Self {
            id: *model.id(),
            created_at: *model.created_at(),
            updated_at: *model.updated_at(),
            email: model.email().to_owned(),
            password_hash: model.password_hash().to_owned(),
            full_name: model.full_name().to_owned(),
            role: Role::from_str(model.role())?,
        })
    }

    fn to_sqlitedb_model(&self) -> ProfileSqliteModel {
        ProfileSqliteModel::new(
            &self.id,
            &self.created_at,
            &self.updated_at,
            &self.email,
            &self.password_hash,
            &self.full_name,
            &self.role.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ProfileDao, Role};
    use crate::memory_db;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert!(Role::from_str("owner").is_err());
    }

    #[tokio::test]
    async fn email_is_unique() {
        let db = memory_db().await;
        ProfileDao::new("ada@example.com", "hash", "Ada", &Role::User)
            .db_insert(&db)
            .await
            .unwrap();
        let duplicate = ProfileDao::new("ada@example.com", "hash", "Ada Two", &Role::User);
        assert!(duplicate.db_insert(&db).await.is_err());
        assert_eq!(ProfileDao::db_count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_changes_role() {
        let db = memory_db().await;
        let mut profile = ProfileDao::new("root@example.com", "hash", "Root", &Role::User);
        profile.db_insert(&db).await.unwrap();
        profile.set_role(&Role::Admin);
        profile.db_update(&db).await.unwrap();

        let stored = ProfileDao::db_select_by_email(&db, "root@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_admin());
    }
}
