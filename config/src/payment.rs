use serde::Deserialize;

#[derive(Deserialize)]
pub struct PaymentConfig {
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default)]
    frontend_url: String,
    #[serde(default = "default_subscription_days")]
    subscription_days: u32,
    stripe: Option<StripePaymentConfig>,
}

impl PaymentConfig {
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }

    pub fn subscription_days(&self) -> &u32 {
        &self.subscription_days
    }

    pub fn stripe(&self) -> &Option<StripePaymentConfig> {
        &self.stripe
    }

    pub(crate) fn set_frontend_url(&mut self, frontend_url: String) {
        self.frontend_url = frontend_url;
    }

    pub(crate) fn set_stripe_secret_key(&mut self, secret_key: String) {
        match &mut self.stripe {
            Some(stripe) => stripe.secret_key = secret_key,
            None => {
                self.stripe = Some(StripePaymentConfig {
                    secret_key,
                    api_base: default_stripe_api_base(),
                })
            }
        }
    }
}

#[derive(Deserialize)]
pub struct StripePaymentConfig {
    #[serde(default)]
    secret_key: String,
    #[serde(default = "default_stripe_api_base")]
    api_base: String,
}

impl StripePaymentConfig {
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

fn default_currency() -> String {
    "xaf".to_owned()
}

fn default_subscription_days() -> u32 {
    30
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_owned()
}
