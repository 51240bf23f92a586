use async_trait::async_trait;

use crate::{CheckoutParams, CheckoutSession, PaymentError};

/// A payment processor able to host checkout pages.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_checkout_session(
        &self,
        params: CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, PaymentError>;
}
