use sqlx::{
    prelude::FromRow,
    types::chrono::{DateTime, Utc},
};
use uuid::Uuid;

#[derive(FromRow)]
pub struct ProjectModel {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Uuid,
    title: String,
    description: String,
    target_amount: i64,
    current_amount: i64,
    duration_months: i32,
    status: String,
}

impl ProjectModel {
    pub fn new(
        id: &Uuid,
        created_at: &DateTime<Utc>,
        updated_at: &DateTime<Utc>,
        user_id: &Uuid,
        title: &str,
        description: &str,
        target_amount: &i64,
        current_amount: &i64,
        duration_months: &i32,
        status: &str,
    ) -> Self {
        Self {
            id: *id,
            created_at: *created_at,
            updated_at: *updated_at,
            user_id: *user_id,
            title: title.to_owned(),
            description: description.to_owned(),
            target_amount: *target_amount,
            current_amount: *current_amount,
            duration_months: *duration_months,
            status: status.to_owned(),
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

    pub fn status(&self) -> &str {
        &self.status
    }
}
