use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::trimmed;

#[derive(Deserialize, Validate)]
pub struct RegisterReqJson {
    #[validate(email)]
    email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    password: String,
    #[validate(length(min = 1, max = 100))]
    #[serde(deserialize_with = "trimmed")]
    full_name: String,
}

impl RegisterReqJson {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

#[derive(Deserialize, Validate)]
pub struct PasswordBasedReqJson {
    #[validate(email)]
    email: String,
    password: String,
}

impl PasswordBasedReqJson {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

#[derive(Deserialize)]
pub struct AdminSessionReqJson {
    password: String,
}

impl AdminSessionReqJson {
    pub fn password(&self) -> &str {
        &self.password
    }
}

#[derive(Serialize)]
pub struct AuthTokenResJson {
    token: String,
}

impl AuthTokenResJson {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_owned(),
        }
    }
}

#[derive(Deserialize)]
pub struct TokenReqQuery {
    token: String,
}

impl TokenReqQuery {
    pub fn token(&self) -> &str {
        &self.token
    }
}
