use std::fs::File;

use anyhow::Result;
use serde::Deserialize;

use self::{
    api::ApiConfig, app::AppConfig, auth::AuthConfig, db::DbConfig, hash::HashConfig,
    log::LogConfig, mailer::MailerConfig, payment::PaymentConfig, plan::PlanConfig,
    token::TokenConfig,
};

pub mod api;
pub mod app;
pub mod auth;
pub mod db;
pub mod hash;
pub mod log;
pub mod mailer;
pub mod payment;
pub mod plan;
pub mod token;

pub const ENV_STRIPE_SECRET_KEY: &str = "STRIPE_SECRET_KEY";
pub const ENV_FRONTEND_URL: &str = "FRONTEND_URL";
pub const ENV_ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";

#[derive(Deserialize)]
pub struct Config {
    app: AppConfig,
    log: LogConfig,
    hash: HashConfig,
    token: TokenConfig,
    mailer: Option<MailerConfig>,
    db: DbConfig,
    api: ApiConfig,
    auth: AuthConfig,
    payment: PaymentConfig,
    #[serde(default)]
    plans: Vec<PlanConfig>,
}

impl Config {
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    pub fn hash(&self) -> &HashConfig {
        &self.hash
    }

    pub fn token(&self) -> &TokenConfig {
        &self.token
    }

    pub fn mailer(&self) -> &Option<MailerConfig> {
        &self.mailer
    }

    pub fn db(&self) -> &DbConfig {
        &self.db
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn payment(&self) -> &PaymentConfig {
        &self.payment
    }

    pub fn plans(&self) -> &Vec<PlanConfig> {
        &self.plans
    }

    /// Secrets present in the environment take precedence over the file.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(secret_key) = lookup(ENV_STRIPE_SECRET_KEY) {
            self.payment.set_stripe_secret_key(secret_key);
        }
        if let Some(frontend_url) = lookup(ENV_FRONTEND_URL) {
            self.payment.set_frontend_url(frontend_url);
        }
        if let Some(admin_password) = lookup(ENV_ADMIN_PASSWORD) {
            self.auth.set_admin_password(admin_password);
        }
    }
}

pub fn from_path(path: &str) -> Result<Config> {
    let file = File::open(path)?;
    let mut config = serde_yaml::from_reader::<_, Config>(file)?;
    config.apply_env();
    Ok(config)
}

pub fn from_str(yaml: &str) -> Result<Config> {
    Ok(serde_yaml::from_str::<Config>(yaml)?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::AppConfigMode;

    const YAML: &str = r#"
app:
  mode: development
log:
  display_level: true
  level_filter: info
hash:
  argon2:
    algorithm: Argon2id
token:
  jwt:
    secret: change-me
    expiry_duration: 86400
db:
  sqlite:
    path: fundbase.db
api:
  rest:
    host: 0.0.0.0
    port: 5001
    allowed_origin: http://localhost:5173
  websocket:
    heartbeat_interval: 5s
    client_timeout: 10s
auth:
  admin_password: ""
payment:
  frontend_url: http://localhost:5173
plans:
  - name: Basic Plan
    price: 5000
    max_projects: 2
  - name: Enterprise Plan
    price: 50000
"#;

    #[test]
    fn parses_file_with_defaults() {
        let config = from_str(YAML).unwrap();

        assert_eq!(config.app().mode(), &AppConfigMode::Development);
        assert_eq!(config.hash().argon2().version(), "V0x13");
        assert_eq!(config.db().sqlite().as_ref().unwrap().path(), "fundbase.db");
        assert_eq!(config.api().rest().port(), &5001);
        assert_eq!(
            config.api().websocket().heartbeat_interval(),
            &Duration::from_secs(5)
        );
        assert_eq!(config.payment().currency(), "xaf");
        assert_eq!(config.payment().subscription_days(), &30);
        assert!(config.payment().stripe().is_none());
        assert!(config.mailer().is_none());
        assert_eq!(config.plans().len(), 2);
        assert_eq!(config.plans()[0].max_projects(), &Some(2));
        assert_eq!(config.plans()[1].max_projects(), &None);
    }

    #[test]
    fn environment_overrides_secrets() {
        let mut config = from_str(YAML).unwrap();
        config.apply_env_with(|key| match key {
            ENV_STRIPE_SECRET_KEY => Some("sk_test_123".to_owned()),
            ENV_ADMIN_PASSWORD => Some("hunter2".to_owned()),
            ENV_FRONTEND_URL => Some(String::new()),
            _ => None,
        });

        let stripe = config.payment().stripe().as_ref().unwrap();
        assert_eq!(stripe.secret_key(), "sk_test_123");
        assert_eq!(stripe.api_base(), "https://api.stripe.com");
        assert_eq!(config.auth().admin_password(), "hunter2");
        assert_eq!(config.payment().frontend_url(), "http://localhost:5173");
    }
}
