use fb_db_postgresql::db::PostgresDb;
use fb_db_sqlite::db::SqliteDb;

pub mod profile;
pub mod project;
pub mod project_funding;
pub mod subscription_plan;
pub mod user_subscription;

pub enum Db {
    PostgresqlDb(PostgresDb),
    SqliteDb(SqliteDb),
}

impl Db {
    pub fn driver_name(&self) -> &'static str {
        match self {
            Db::PostgresqlDb(_) => "postgres",
            Db::SqliteDb(_) => "sqlite",
        }
    }
}

#[cfg(test)]
pub(crate) async fn memory_db() -> Db {
    Db::SqliteDb(SqliteDb::new(":memory:", &1).await.unwrap())
}
