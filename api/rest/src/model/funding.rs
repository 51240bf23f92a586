use chrono::{DateTime, Utc};
use fb_dao::project_funding::ProjectFundingDao;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::util::format::format_amount;

#[derive(Deserialize, Validate)]
pub struct InsertOneFundingReqJson {
    #[validate(range(min = 1, message = "Amount must be greater than zero"))]
    amount: i64,
}

impl InsertOneFundingReqJson {
    pub fn amount(&self) -> &i64 {
        &self.amount
    }
}

#[derive(Deserialize)]
pub struct FundingReqPath {
    funding_id: Uuid,
}

impl FundingReqPath {
    pub fn funding_id(&self) -> &Uuid {
        &self.funding_id
    }
}

#[derive(Deserialize)]
pub struct UpdateFundingStatusReqJson {
    status: String,
}

impl UpdateFundingStatusReqJson {
    pub fn status(&self) -> &str {
        &self.status
    }
}

#[derive(Serialize)]
pub struct FundingResJson {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_id: Uuid,
    funder_id: Uuid,
    amount: i64,
    formatted_amount: String,
    status: String,
}

impl FundingResJson {
    pub fn from_dao(data: &ProjectFundingDao, currency: &str) -> Self {
        Self {
            id: *data.id(),
            created_at: *data.created_at(),
            updated_at: *data.updated_at(),
            project_id: *data.project_id(),
            funder_id: *data.funder_id(),
            amount: *data.amount(),
            formatted_amount: format_amount(data.amount(), currency),
            status: data.status().to_string(),
        }
    }
}
