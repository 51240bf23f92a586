use chrono::{DateTime, Utc};
use fb_dao::project::ProjectDao;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{trimmed, trimmed_option},
    util::format::{format_amount, format_percentage, funding_percentage},
};

#[derive(Deserialize, Validate)]
pub struct InsertOneProjectReqJson {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 5, max = 100, message = "Title must be between 5 and 100 characters"))]
    title: String,
    #[validate(length(
        min = 20,
        max = 1000,
        message = "Description must be between 20 and 1000 characters"
    ))]
    #[serde(deserialize_with = "trimmed")]
    description: String,
    #[validate(range(min = 1000, message = "Target amount must be at least 1000"))]
    target_amount: i64,
    #[validate(range(min = 1, max = 60, message = "Duration must be between 1 and 60 months"))]
    duration_months: i32,
}

impl InsertOneProjectReqJson {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_amount(&self) -> &i64 {
        &self.target_amount
    }

    pub fn duration_months(&self) -> &i32 {
        &self.duration_months
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdateOneProjectReqJson {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 5, max = 100, message = "Title must be between 5 and 100 characters"))]
    title: Option<String>,
    #[validate(length(
        min = 20,
        max = 1000,
        message = "Description must be between 20 and 1000 characters"
    ))]
    #[serde(default, deserialize_with = "trimmed_option")]
    description: Option<String>,
}

impl UpdateOneProjectReqJson {
    pub fn title(&self) -> &Option<String> {
        &self.title
    }

    pub fn description(&self) -> &Option<String> {
        &self.description
    }
}

#[derive(Deserialize)]
pub struct ProjectReqPath {
    project_id: Uuid,
}

impl ProjectReqPath {
    pub fn project_id(&self) -> &Uuid {
        &self.project_id
    }
}

#[derive(Deserialize)]
pub struct UpdateProjectStatusReqJson {
    status: String,
}

impl UpdateProjectStatusReqJson {
    pub fn status(&self) -> &str {
        &self.status
    }
}

#[derive(Serialize)]
pub struct ProjectResJson {
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
    funding_percentage: f64,
    formatted_percentage: String,
    formatted_target_amount: String,
    formatted_current_amount: String,
}

impl ProjectResJson {
    pub fn from_dao(data: &ProjectDao, currency: &str) -> Self {
        let percentage = funding_percentage(data.current_amount(), data.target_amount());
        Self {
            id: *data.id(),
            created_at: *data.created_at(),
            updated_at: *data.updated_at(),
            user_id: *data.user_id(),
            title: data.title().to_owned(),
            description: data.description().to_owned(),
            target_amount: *data.target_amount(),
            current_amount: *data.current_amount(),
            duration_months: *data.duration_months(),
            status: data.status().to_string(),
            funding_percentage: percentage,
            formatted_percentage: format_percentage(&percentage),
            formatted_target_amount: format_amount(data.target_amount(), currency),
            formatted_current_amount: format_amount(data.current_amount(), currency),
        }
    }
}

#[derive(Serialize)]
pub struct DeleteProjectResJson {
    id: Uuid,
}

impl DeleteProjectResJson {
    pub fn new(id: &Uuid) -> Self {
        Self { id: *id }
    }
}
