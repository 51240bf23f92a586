use std::{sync::Arc, time::Duration};

use actix_web::web;
use fb_api_websocket::ApiWebSocketServer;
use fb_dao::{
    profile::{ProfileDao, Role},
    subscription_plan::SubscriptionPlanDao,
    user_subscription::UserSubscriptionDao,
    Db,
};
use fb_db_sqlite::db::SqliteDb;
use fb_hash_argon2::argon2::Argon2Hash;
use fb_payment::mock::MockPaymentProvider;
use fb_token_jwt::{kind::JwtTokenKind, token::JwtToken};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::context::{
    ApiRestCtx, ApiRestDaoCtx, ApiRestHashCtx, ApiRestPaymentCtx, ApiRestTokenCtx, ApiRestWsCtx,
};

pub(crate) const ADMIN_PASSWORD: &str = "admin-secret";

/// Builds the service under test from a [`TestApp`].
macro_rules! init_app {
    ($app:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($app.ctx.clone())
                .configure(crate::configure::configure),
        )
        .await
    };
}
pub(crate) use init_app;

pub(crate) struct TestApp {
    pub ctx: web::Data<ApiRestCtx>,
    pub payment: MockPaymentProvider,
    cancel_token: CancellationToken,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Arc::new(Db::SqliteDb(SqliteDb::new(":memory:", &1).await.unwrap()));
        let payment = MockPaymentProvider::new();

        let (websocket_server, websocket_handler, websocket_broadcaster) =
            ApiWebSocketServer::new(
                db.clone(),
                &Duration::from_secs(5),
                &Duration::from_secs(10),
            );
        let cancel_token = CancellationToken::new();
        websocket_server.run(cancel_token.clone());

        let ctx = ApiRestCtx::new(
            ApiRestHashCtx::new(Argon2Hash::new("Argon2id", "V0x13").unwrap()),
            ApiRestTokenCtx::new(JwtToken::new("test-secret", &3600)),
            None,
            ApiRestDaoCtx::new(db),
            ApiRestWsCtx::new(websocket_handler, websocket_broadcaster),
            ApiRestPaymentCtx::new(
                Arc::new(payment.clone()),
                "xaf",
                "http://localhost:5173/",
                &30,
                &false,
            ),
            ADMIN_PASSWORD,
        );

        Self {
            ctx: web::Data::new(ctx),
            payment,
            cancel_token,
        }
    }

    pub fn db(&self) -> &Db {
        self.ctx.dao().db()
    }

    /// Inserts a profile and returns it with a user token. The stored hash
    /// never verifies; log in through `/auth/register` when a password matters.
    pub async fn profile(&self, email: &str, role: &Role) -> (ProfileDao, String) {
        let profile = ProfileDao::new(email, "not-a-hash", "Test Person", role);
        profile.db_insert(self.db()).await.unwrap();
        let token = self.token(profile.id(), &JwtTokenKind::User);
        (profile, token)
    }

    pub fn token(&self, id: &Uuid, kind: &JwtTokenKind) -> String {
        self.ctx.token().jwt().encode(id, kind).unwrap()
    }

    pub async fn plan(
        &self,
        name: &str,
        price: &i64,
        max_projects: &Option<i32>,
    ) -> SubscriptionPlanDao {
        let plan = SubscriptionPlanDao::new(name, "Test plan", price, &[], max_projects);
        plan.db_insert(self.db()).await.unwrap();
        plan
    }

    pub async fn subscribe(&self, user_id: &Uuid, plan_id: &Uuid) -> UserSubscriptionDao {
        let payment_id = format!("cs_test_{}", Uuid::now_v7().simple());
        UserSubscriptionDao::activate(self.db(), user_id, plan_id, &payment_id, &30)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
