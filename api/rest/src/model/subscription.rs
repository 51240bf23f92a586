use chrono::{DateTime, Utc};
use fb_dao::user_subscription::UserSubscriptionDao;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::PlanResJson;

#[derive(Deserialize)]
pub struct SubscriptionReqPath {
    subscription_id: Uuid,
}

impl SubscriptionReqPath {
    pub fn subscription_id(&self) -> &Uuid {
        &self.subscription_id
    }
}

#[derive(Serialize)]
pub struct SubscriptionResJson {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Uuid,
    plan_id: Uuid,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<PlanResJson>,
}

impl SubscriptionResJson {
    pub fn from_dao(data: &UserSubscriptionDao, plan: Option<PlanResJson>) -> Self {
        Self {
            id: *data.id(),
            created_at: *data.created_at(),
            updated_at: *data.updated_at(),
            user_id: *data.user_id(),
            plan_id: *data.plan_id(),
            status: data.status().to_string(),
            start_date: *data.start_date(),
            end_date: *data.end_date(),
            payment_id: data.payment_id().to_owned(),
            plan,
        }
    }
}

#[derive(Serialize)]
pub struct ReceiptResJson {
    date: String,
    receipt_number: Uuid,
    customer_email: String,
    customer_name: String,
    plan_name: String,
    amount: i64,
    formatted_amount: String,
    status: &'static str,
    valid_until: String,
}

impl ReceiptResJson {
    pub fn new(
        date: &DateTime<Utc>,
        receipt_number: &Uuid,
        customer_email: &str,
        customer_name: &str,
        plan_name: &str,
        amount: &i64,
        formatted_amount: &str,
        valid_until: &DateTime<Utc>,
    ) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            receipt_number: *receipt_number,
            customer_email: customer_email.to_owned(),
            customer_name: customer_name.to_owned(),
            plan_name: plan_name.to_owned(),
            amount: *amount,
            formatted_amount: formatted_amount.to_owned(),
            status: "Paid",
            valid_until: valid_until.format("%Y-%m-%d").to_string(),
        }
    }
}
