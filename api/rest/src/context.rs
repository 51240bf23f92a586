use std::sync::Arc;

use fb_api_websocket::{broadcaster::WebSocketBroadcaster, handler::WebSocketHandler};
use fb_dao::Db;
use fb_hash_argon2::argon2::Argon2Hash;
use fb_mailer::{MailPayload, MailSender};
use fb_payment::PaymentProvider;
use fb_token_jwt::token::JwtToken;

pub struct ApiRestCtx {
    hash: ApiRestHashCtx,
    token: ApiRestTokenCtx,
    mailer: Option<ApiRestMailerCtx>,
    dao: ApiRestDaoCtx,
    websocket: ApiRestWsCtx,
    payment: ApiRestPaymentCtx,
    admin_password: String,
}

impl ApiRestCtx {
    pub fn new(
        hash: ApiRestHashCtx,
        token: ApiRestTokenCtx,
        mailer: Option<ApiRestMailerCtx>,
        dao: ApiRestDaoCtx,
        websocket: ApiRestWsCtx,
        payment: ApiRestPaymentCtx,
        admin_password: &str,
    ) -> Self {
        Self {
            hash,
            token,
            mailer,
            dao,
            websocket,
            payment,
            admin_password: admin_password.to_owned(),
        }
    }

    pub fn hash(&self) -> &ApiRestHashCtx {
        &self.hash
    }

    pub fn token(&self) -> &ApiRestTokenCtx {
        &self.token
    }

    pub fn mailer(&self) -> &Option<ApiRestMailerCtx> {
        &self.mailer
    }

    pub fn dao(&self) -> &ApiRestDaoCtx {
        &self.dao
    }

    pub fn websocket(&self) -> &ApiRestWsCtx {
        &self.websocket
    }

    pub fn payment(&self) -> &ApiRestPaymentCtx {
        &self.payment
    }

    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }

    /// Queues a notification when a mailer is configured. Failures are logged,
    /// never surfaced to the caller.
    pub fn notify(&self, to: &str, subject: &str, body: &str) {
        if let Some(mailer) = &self.mailer {
            if let Err(err) = mailer.sender().send(MailPayload::new(to, subject, body)) {
                fb_log::warn(None, format!("[ApiRestServer] Failed to queue mail: {err}"));
            }
        }
    }
}

pub struct ApiRestHashCtx {
    argon2: Argon2Hash,
}

impl ApiRestHashCtx {
    pub fn new(argon2: Argon2Hash) -> Self {
        Self { argon2 }
    }

    pub fn argon2(&self) -> &Argon2Hash {
        &self.argon2
    }
}

pub struct ApiRestTokenCtx {
    jwt: JwtToken,
}

impl ApiRestTokenCtx {
    pub fn new(jwt: JwtToken) -> Self {
        Self { jwt }
    }

    pub fn jwt(&self) -> &JwtToken {
        &self.jwt
    }
}

pub struct ApiRestMailerCtx {
    sender: MailSender,
}

impl ApiRestMailerCtx {
    pub fn new(sender: MailSender) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &MailSender {
        &self.sender
    }
}

pub struct ApiRestDaoCtx {
    db: Arc<Db>,
}

impl ApiRestDaoCtx {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

pub struct ApiRestWsCtx {
    handler: WebSocketHandler,
    broadcaster: WebSocketBroadcaster,
}

impl ApiRestWsCtx {
    pub fn new(handler: WebSocketHandler, broadcaster: WebSocketBroadcaster) -> Self {
        Self {
            handler,
            broadcaster,
        }
    }

    pub fn handler(&self) -> &WebSocketHandler {
        &self.handler
    }

    pub fn broadcaster(&self) -> &WebSocketBroadcaster {
        &self.broadcaster
    }
}

pub struct ApiRestPaymentCtx {
    provider: Arc<dyn PaymentProvider>,
    currency: String,
    frontend_url: String,
    subscription_days: i64,
    stripe_key_set: bool,
}

impl ApiRestPaymentCtx {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        currency: &str,
        frontend_url: &str,
        subscription_days: &i64,
        stripe_key_set: &bool,
    ) -> Self {
        Self {
            provider,
            currency: currency.to_lowercase(),
            frontend_url: frontend_url.trim_end_matches('/').to_owned(),
            subscription_days: *subscription_days,
            stripe_key_set: *stripe_key_set,
        }
    }

    pub fn provider(&self) -> &dyn PaymentProvider {
        self.provider.as_ref()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }

    pub fn subscription_days(&self) -> &i64 {
        &self.subscription_days
    }

    pub fn stripe_key_set(&self) -> &bool {
        &self.stripe_key_set
    }

    pub fn success_url(&self) -> String {
        format!(
            "{}/subscription-plans?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/subscription-plans", self.frontend_url)
    }
}
