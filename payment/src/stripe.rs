//! Stripe Checkout over the HTTP API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{CheckoutParams, CheckoutSession, PaymentError, PaymentProvider};

pub struct StripeProvider {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeProvider {
    pub fn new(api_base: &str, secret_key: &str) -> Result<Self, PaymentError> {
        fb_log::info(Some("⚡"), "[StripeProvider] Initializing component");

        if secret_key.is_empty() {
            return Err(PaymentError::InvalidParameters(
                "Stripe secret key is missing".to_owned(),
            ));
        }

        Ok(Self {
            client: Client::builder().build()?,
            api_base: api_base.trim_end_matches('/').to_owned(),
            secret_key: secret_key.to_owned(),
        })
    }

    async fn parse_response(
        res: reqwest::Response,
        session_id: Option<&str>,
    ) -> Result<CheckoutSession, PaymentError> {
        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(session_id) = session_id {
                return Err(PaymentError::NotFound(session_id.to_owned()));
            }
        }

        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .map(|body| body.error.message)
            .unwrap_or_else(|_| format!("Stripe responded with status {status}"));
        Err(PaymentError::Provider(message))
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_checkout_session(
        &self,
        params: CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let res = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&checkout_form(&params)?)
            .send()
            .await?;

        Self::parse_response(res, None).await
    }

    async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, PaymentError> {
        if !is_session_id(id) {
            return Err(PaymentError::InvalidParameters(format!(
                "Invalid checkout session id '{id}'"
            )));
        }

        let res = self
            .client
            .get(format!("{}/v1/checkout/sessions/{id}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        Self::parse_response(res, Some(id)).await
    }
}

/// Checkout session ids are interpolated into the request path, so only
/// the characters Stripe uses for them are allowed.
fn is_session_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

/// Flattens the parameters into Stripe's bracketed form encoding.
pub fn checkout_form(params: &CheckoutParams) -> Result<Vec<(String, String)>, PaymentError> {
    if params.unit_amount <= 0 {
        return Err(PaymentError::InvalidParameters(
            "Amount must be greater than zero".to_owned(),
        ));
    }

    let mut form = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("payment_method_types[0]".to_owned(), "card".to_owned()),
        (
            "line_items[0][price_data][currency]".to_owned(),
            params.currency.to_lowercase(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_owned(),
            params.product_name.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_owned(),
            params.unit_amount.to_string(),
        ),
        ("line_items[0][quantity]".to_owned(), "1".to_owned()),
        ("success_url".to_owned(), params.success_url.clone()),
        ("cancel_url".to_owned(), params.cancel_url.clone()),
        ("customer_email".to_owned(), params.customer_email.clone()),
    ];

    // Stripe rejects an empty description
    if !params.product_description.is_empty() {
        form.push((
            "line_items[0][price_data][product_data][description]".to_owned(),
            params.product_description.clone(),
        ));
    }

    let mut metadata = params.metadata.iter().collect::<Vec<_>>();
    metadata.sort();
    for (key, value) in metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use ahash::{HashMap, HashMapExt};

    use super::*;
    use crate::PaymentStatus;

    fn params() -> CheckoutParams {
        let mut metadata = HashMap::new();
        metadata.insert("userId".to_owned(), "u-1".to_owned());
        metadata.insert("planId".to_owned(), "p-1".to_owned());
        CheckoutParams {
            currency: "XAF".to_owned(),
            product_name: "Basic Plan".to_owned(),
            product_description: String::new(),
            unit_amount: 5000,
            customer_email: "funder@example.com".to_owned(),
            success_url: "http://localhost:5173/subscription-plans?session_id={CHECKOUT_SESSION_ID}"
                .to_owned(),
            cancel_url: "http://localhost:5173/subscription-plans".to_owned(),
            metadata,
        }
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn encodes_single_line_item() {
        let form = checkout_form(&params()).unwrap();

        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(value(&form, "line_items[0][price_data][currency]"), Some("xaf"));
        assert_eq!(value(&form, "line_items[0][price_data][unit_amount]"), Some("5000"));
        assert_eq!(value(&form, "line_items[0][quantity]"), Some("1"));
        assert_eq!(value(&form, "metadata[userId]"), Some("u-1"));
        assert_eq!(value(&form, "metadata[planId]"), Some("p-1"));
        assert_eq!(
            value(&form, "line_items[0][price_data][product_data][description]"),
            None
        );
    }

    #[test]
    fn rejects_non_positive_amount() {
        let mut params = params();
        params.unit_amount = 0;
        assert!(matches!(
            checkout_form(&params),
            Err(PaymentError::InvalidParameters(_))
        ));
    }

    #[test]
    fn parses_session_payload() {
        let session: CheckoutSession = serde_json::from_str(
            r#"{
                "id": "cs_test_a1",
                "object": "checkout.session",
                "url": null,
                "payment_status": "paid",
                "status": "complete",
                "customer_email": "funder@example.com",
                "amount_total": 5000,
                "currency": "xaf",
                "metadata": {"userId": "u-1", "planId": "p-1"}
            }"#,
        )
        .unwrap();

        assert!(session.is_paid());
        assert_eq!(session.payment_status, PaymentStatus::Paid);
        assert_eq!(session.metadata_value("planId"), Some("p-1"));
    }

    #[test]
    fn session_ids_stay_in_their_path_segment() {
        assert!(is_session_id("cs_test_a1B2c3"));
        for id in ["", "cs_1/..", "cs_1?expand[]=customer", "cs_1#x", "cs 1", "cs_1%2F", "cs-1"] {
            assert!(!is_session_id(id), "{id}");
        }
    }

    #[tokio::test]
    async fn retrieve_rejects_ids_that_change_the_url() {
        let provider = StripeProvider::new("http://127.0.0.1:9", "sk_test_1").unwrap();
        for id in ["cs_1?expand[]=customer", "cs_1#fragment"] {
            assert!(matches!(
                provider.retrieve_checkout_session(id).await,
                Err(PaymentError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn requires_secret_key() {
        assert!(StripeProvider::new("https://api.stripe.com", "").is_err());
    }
}
