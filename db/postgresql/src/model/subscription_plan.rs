use sqlx::{
    prelude::FromRow,
    types::{
        chrono::{DateTime, Utc},
        Json,
    },
};
use uuid::Uuid;

#[derive(FromRow)]
pub struct SubscriptionPlanModel {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    description: String,
    price: i64,
    features: Json<Vec<String>>,
    max_projects: Option<i32>,
}

impl SubscriptionPlanModel {
    pub fn new(
        id: &Uuid,
        created_at: &DateTime<Utc>,
        updated_at: &DateTime<Utc>,
        name: &str,
        description: &str,
        price: &i64,
        features: &[String],
        max_projects: &Option<i32>,
    ) -> Self {
        Self {
            id: *id,
            created_at: *created_at,
            updated_at: *updated_at,
            name: name.to_owned(),
            description: description.to_owned(),
            price: *price,
            features: Json(features.to_vec()),
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

    pub fn features(&self) -> &Json<Vec<String>> {
        &self.features
    }

    pub fn max_projects(&self) -> &Option<i32> {
        &self.max_projects
    }
}
