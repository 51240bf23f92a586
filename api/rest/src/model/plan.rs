use chrono::{DateTime, Utc};
use fb_dao::subscription_plan::SubscriptionPlanDao;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::util::format::format_amount;

#[derive(Deserialize)]
pub struct PlanReqPath {
    plan_id: Uuid,
}

impl PlanReqPath {
    pub fn plan_id(&self) -> &Uuid {
        &self.plan_id
    }
}

#[derive(Deserialize, Validate)]
pub struct InsertOnePlanReqJson {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[serde(default)]
    description: String,
    #[validate(range(min = 1))]
    price: i64,
    #[serde(default)]
    features: Vec<String>,
    #[validate(range(min = 1))]
    max_projects: Option<i32>,
}

impl InsertOnePlanReqJson {
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

    pub fn max_projects(&self) -> &Option<i32> {
        &self.max_projects
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdateOnePlanReqJson {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    description: Option<String>,
    #[validate(range(min = 1))]
    price: Option<i64>,
    features: Option<Vec<String>>,
    /// `null` clears the limit, an absent field leaves it unchanged.
    #[serde(default, deserialize_with = "double_option")]
    max_projects: Option<Option<i32>>,
}

impl UpdateOnePlanReqJson {
    pub fn name(&self) -> &Option<String> {
        &self.name
    }

    pub fn description(&self) -> &Option<String> {
        &self.description
    }

    pub fn price(&self) -> &Option<i64> {
        &self.price
    }

    pub fn features(&self) -> &Option<Vec<String>> {
        &self.features
    }

    pub fn max_projects(&self) -> &Option<Option<i32>> {
        &self.max_projects
    }

    pub fn is_all_none(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.features.is_none()
            && self.max_projects.is_none()
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Serialize)]
pub struct PlanResJson {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    description: String,
    price: i64,
    formatted_price: String,
    features: Vec<String>,
    max_projects: Option<i32>,
}

impl PlanResJson {
    pub fn from_dao(data: &SubscriptionPlanDao, currency: &str) -> Self {
        Self {
            id: *data.id(),
            created_at: *data.created_at(),
            updated_at: *data.updated_at(),
            name: data.name().to_owned(),
            description: data.description().to_owned(),
            price: *data.price(),
            formatted_price: format_amount(data.price(), currency),
            features: data.features().clone(),
            max_projects: *data.max_projects(),
        }
    }
}

#[derive(Serialize)]
pub struct DeletePlanResJson {
    id: Uuid,
}

impl DeletePlanResJson {
    pub fn new(id: &Uuid) -> Self {
        Self { id: *id }
    }
}
