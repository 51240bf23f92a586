//! Flat camelCase bodies of the payment relay endpoints. These do not use the
//! REST envelope.

use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder};
use fb_payment::CheckoutSession;
use serde::{Deserialize, Serialize};

use super::subscription::SubscriptionResJson;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionReqJson {
    plan_id: Option<String>,
    user_id: Option<String>,
    user_email: Option<String>,
}

impl CreateCheckoutSessionReqJson {
    pub fn plan_id(&self) -> Option<&str> {
        non_empty(&self.plan_id)
    }

    pub fn user_id(&self) -> Option<&str> {
        non_empty(&self.user_id)
    }

    pub fn user_email(&self) -> Option<&str> {
        non_empty(&self.user_email)
    }
}

#[derive(Serialize)]
pub struct CheckoutSessionResJson {
    id: String,
}

impl CheckoutSessionResJson {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_owned() }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentReqJson {
    session_id: Option<String>,
}

impl VerifyPaymentReqJson {
    pub fn session_id(&self) -> Option<&str> {
        non_empty(&self.session_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResJson {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<CheckoutSession>,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription: Option<SubscriptionResJson>,
}

impl VerifyPaymentResJson {
    pub fn paid(
        session: CheckoutSession,
        receipt_url: &str,
        subscription: SubscriptionResJson,
    ) -> Self {
        Self {
            success: true,
            session: Some(session),
            receipt_url: Some(receipt_url.to_owned()),
            subscription: Some(subscription),
        }
    }

    pub fn unpaid() -> Self {
        Self {
            success: false,
            session: None,
            receipt_url: None,
            subscription: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugEnvResJson {
    database_driver: String,
    stripe_key: &'static str,
    frontend_url: String,
    admin_password: &'static str,
    mailer: &'static str,
}

impl DebugEnvResJson {
    pub fn new(
        database_driver: &str,
        stripe_key: &bool,
        frontend_url: &str,
        admin_password: &bool,
        mailer: &bool,
    ) -> Self {
        Self {
            database_driver: database_driver.to_owned(),
            stripe_key: presence(stripe_key),
            frontend_url: frontend_url.to_owned(),
            admin_password: presence(admin_password),
            mailer: presence(mailer),
        }
    }
}

#[derive(Serialize)]
struct RelayErrorJson<'a> {
    error: &'a str,
}

pub fn relay_data<T: Serialize>(data: &T) -> HttpResponse {
    HttpResponse::Ok().json(data)
}

pub fn relay_error(status_code: &StatusCode, message: &str) -> HttpResponse {
    if status_code.is_server_error() {
        fb_log::error(None, format!("[ApiRestServer] Relay: {message}"));
    }
    HttpResponseBuilder::new(*status_code).json(RelayErrorJson { error: message })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn presence(set: &bool) -> &'static str {
    if *set {
        "set"
    } else {
        "missing"
    }
}
