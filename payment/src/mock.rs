//! In-memory provider for tests and local development.

use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{CheckoutParams, CheckoutSession, PaymentError, PaymentProvider, PaymentStatus};

#[derive(Clone, Default)]
pub struct MockPaymentProvider {
    sessions: Arc<RwLock<HashMap<String, CheckoutSession>>>,
    fail_next: Arc<RwLock<bool>>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        fb_log::info(Some("⚡"), "[MockPaymentProvider] Initializing component");

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            fail_next: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().await = fail;
    }

    /// Simulates the customer completing the hosted checkout.
    pub async fn mark_paid(&self, id: &str) -> Result<(), PaymentError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| PaymentError::NotFound(id.to_owned()))?;
        session.payment_status = PaymentStatus::Paid;
        session.status = Some("complete".to_owned());
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn check_fail(&self) -> Result<(), PaymentError> {
        let mut fail_next = self.fail_next.write().await;
        if *fail_next {
            *fail_next = false;
            return Err(PaymentError::Provider("Mock configured to fail".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_checkout_session(
        &self,
        params: CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError> {
        self.check_fail().await?;

        if params.unit_amount <= 0 {
            return Err(PaymentError::InvalidParameters(
                "Amount must be greater than zero".to_owned(),
            ));
        }

        let id = format!("cs_mock_{}", Uuid::now_v7().simple());
        let session = CheckoutSession {
            id: id.clone(),
            url: Some(format!("https://checkout.invalid/pay/{id}")),
            payment_status: PaymentStatus::Unpaid,
            status: Some("open".to_owned()),
            customer_email: Some(params.customer_email),
            amount_total: Some(params.unit_amount),
            currency: Some(params.currency.to_lowercase()),
            metadata: params.metadata,
        };

        self.sessions.write().await.insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, PaymentError> {
        self.check_fail().await?;

        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::NotFound(id.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CheckoutParams {
        CheckoutParams {
            currency: "xaf".to_owned(),
            product_name: "Pro Plan".to_owned(),
            product_description: "Ideal for growing projects".to_owned(),
            unit_amount: 15000,
            customer_email: "funder@example.com".to_owned(),
            success_url: "http://localhost/ok".to_owned(),
            cancel_url: "http://localhost/cancel".to_owned(),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn sessions_start_unpaid_until_marked() {
        let provider = MockPaymentProvider::new();
        let session = provider.create_checkout_session(params()).await.unwrap();
        assert!(!session.is_paid());

        provider.mark_paid(&session.id).await.unwrap();
        let session = provider.retrieve_checkout_session(&session.id).await.unwrap();
        assert!(session.is_paid());
        assert_eq!(provider.session_count().await, 1);
    }

    #[tokio::test]
    async fn fail_next_applies_once() {
        let provider = MockPaymentProvider::new();
        provider.set_fail_next(true).await;

        assert!(matches!(
            provider.create_checkout_session(params()).await,
            Err(PaymentError::Provider(_))
        ));
        assert!(provider.create_checkout_session(params()).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let provider = MockPaymentProvider::new();
        assert!(matches!(
            provider.retrieve_checkout_session("cs_missing").await,
            Err(PaymentError::NotFound(_))
        ));
    }
}
