use chrono::{DateTime, Utc};
use fb_dao::profile::ProfileDao;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::trimmed;

#[derive(Deserialize, Validate)]
pub struct UpdateOneProfileReqJson {
    #[validate(length(min = 1, max = 100))]
    #[serde(deserialize_with = "trimmed")]
    full_name: String,
}

impl UpdateOneProfileReqJson {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

#[derive(Deserialize, Validate)]
pub struct UpdatePasswordReqJson {
    old_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    new_password: String,
}

impl UpdatePasswordReqJson {
    pub fn old_password(&self) -> &str {
        &self.old_password
    }

    pub fn new_password(&self) -> &str {
        &self.new_password
    }
}

#[derive(Deserialize)]
pub struct ProfileReqPath {
    profile_id: Uuid,
}

impl ProfileReqPath {
    pub fn profile_id(&self) -> &Uuid {
        &self.profile_id
    }
}

#[derive(Deserialize)]
pub struct UpdateProfileRoleReqJson {
    role: String,
}

impl UpdateProfileRoleReqJson {
    pub fn role(&self) -> &str {
        &self.role
    }
}

#[derive(Serialize)]
pub struct ProfileResJson {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: String,
    full_name: String,
    role: String,
}

impl ProfileResJson {
    pub fn from_dao(data: &ProfileDao) -> Self {
        Self {
            id: *data.id(),
            created_at: *data.created_at(),
            updated_at: *data.updated_at(),
            email: data.email().to_owned(),
            full_name: data.full_name().to_owned(),
            role: data.role().to_string(),
        }
    }
}
