use std::sync::Arc;

use fb_api_rest::{
    context::{
        ApiRestCtx, ApiRestDaoCtx, ApiRestHashCtx, ApiRestMailerCtx, ApiRestPaymentCtx,
        ApiRestTokenCtx, ApiRestWsCtx,
    },
    ApiRestServer,
};
use fb_api_websocket::ApiWebSocketServer;
use fb_config::app::AppConfigMode;
use fb_dao::Db;
use fb_db_postgresql::db::PostgresDb;
use fb_db_sqlite::db::SqliteDb;
use fb_hash_argon2::argon2::Argon2Hash;
use fb_mailer::Mailer;
use fb_payment::{mock::MockPaymentProvider, stripe::StripeProvider, PaymentProvider};
use fb_token_jwt::token::JwtToken;
use tokio_util::sync::CancellationToken;

mod config_path;
mod seed;

#[tokio::main]
async fn main() {
    let config_path = config_path::get();
    let config = match fb_config::from_path(&config_path) {
        Ok(config) => config,
        Err(err) => fb_log::panic(
            None,
            format!("[Fundbase] Failed to read '{config_path}': {err}"),
        ),
    };

    if let Err(err) = fb_log::init(config.log().display_level(), config.log().level_filter()) {
        fb_log::panic(None, format!("[Fundbase] Failed to initialize logger: {err}"));
    }

    fb_log::info(Some("🚀"), "[Fundbase] Starting");

    let argon2_hash = match Argon2Hash::new(
        config.hash().argon2().algorithm(),
        config.hash().argon2().version(),
    ) {
        Ok(hash) => hash,
        Err(err) => fb_log::panic(None, format!("[Fundbase] Invalid argon2 config: {err}")),
    };

    let jwt_token = JwtToken::new(
        config.token().jwt().secret(),
        config.token().jwt().expiry_duration(),
    );

    let (mailer, mailer_sender) = match config.mailer() {
        Some(config_mailer) => match Mailer::new(
            config_mailer.smtp_host(),
            config_mailer.smtp_username(),
            config_mailer.smtp_password(),
            &config_mailer.sender(),
        ) {
            Ok((mailer, mailer_sender)) => (Some(mailer), Some(mailer_sender)),
            Err(err) => fb_log::panic(None, format!("[Fundbase] Invalid mailer config: {err}")),
        },
        None => (None, None),
    };

    let db = if let Some(postgres) = config.db().postgres() {
        fb_log::info(
            None,
            format!(
                "[Fundbase] Using PostgreSQL database '{}' on {}",
                postgres.db_name(),
                postgres.host()
            ),
        );
        match PostgresDb::new(&postgres.url(), postgres.max_connections()).await {
            Ok(db) => Arc::new(Db::PostgresqlDb(db)),
            Err(err) => fb_log::panic(
                None,
                format!("[Fundbase] Failed to connect to PostgreSQL: {err}"),
            ),
        }
    } else if let Some(sqlite) = config.db().sqlite() {
        match SqliteDb::new(sqlite.path(), sqlite.max_connections()).await {
            Ok(db) => Arc::new(Db::SqliteDb(db)),
            Err(err) => fb_log::panic(None, format!("[Fundbase] Failed to open SQLite: {err}")),
        }
    } else {
        fb_log::panic(None, "[Fundbase] No database configuration is specified")
    };

    if let Some(initial_admin) = config.auth().initial_admin() {
        if let Err(err) = seed::initial_admin(&db, &argon2_hash, initial_admin).await {
            fb_log::panic(
                None,
                format!("[Fundbase] Failed to create initial admin: {err}"),
            );
        }
    }

    if let Err(err) = seed::plans(&db, config.plans()).await {
        fb_log::panic(None, format!("[Fundbase] Failed to seed plans: {err}"));
    }

    let payment_provider: Arc<dyn PaymentProvider> = match config.payment().stripe() {
        Some(stripe) => match StripeProvider::new(stripe.api_base(), stripe.secret_key()) {
            Ok(provider) => Arc::new(provider),
            Err(err) => fb_log::panic(None, format!("[Fundbase] Invalid Stripe config: {err}")),
        },
        None => match config.app().mode() {
            AppConfigMode::Development => {
                fb_log::warn(
                    None,
                    "[Fundbase] No Stripe secret key, checkout sessions are simulated in memory",
                );
                Arc::new(MockPaymentProvider::new())
            }
            AppConfigMode::Production => fb_log::panic(
                None,
                "[Fundbase] A Stripe secret key is required in production mode",
            ),
        },
    };

    fb_log::info(
        None,
        format!(
            "[Fundbase] Using {} payment provider",
            payment_provider.name()
        ),
    );

    let (api_websocket_server, websocket_handler, websocket_broadcaster) = ApiWebSocketServer::new(
        db.clone(),
        config.api().websocket().heartbeat_interval(),
        config.api().websocket().client_timeout(),
    );

    let api_rest_server = ApiRestServer::new(
        config.api().rest().host(),
        config.api().rest().port(),
        config.api().rest().allowed_origin(),
        ApiRestCtx::new(
            ApiRestHashCtx::new(argon2_hash),
            ApiRestTokenCtx::new(jwt_token),
            mailer_sender.map(ApiRestMailerCtx::new),
            ApiRestDaoCtx::new(db),
            ApiRestWsCtx::new(websocket_handler, websocket_broadcaster),
            ApiRestPaymentCtx::new(
                payment_provider,
                config.payment().currency(),
                config.payment().frontend_url(),
                &i64::from(*config.payment().subscription_days()),
                &config.payment().stripe().is_some(),
            ),
            config.auth().admin_password(),
        ),
    );

    let cancel_token = CancellationToken::new();

    tokio::spawn({
        let cancel_token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                fb_log::info(None, "[Fundbase] Received shutdown signal");
                cancel_token.cancel();
            }
        }
    });

    match tokio::try_join!(
        match mailer {
            Some(mailer) => mailer.run(cancel_token.clone()),
            None => Mailer::run_none(),
        },
        api_rest_server.run(cancel_token.clone()),
        api_websocket_server.run(cancel_token.clone())
    ) {
        Ok(_) => fb_log::info(Some("👋"), "[Fundbase] Turned off"),
        Err(err) => {
            fb_log::warn(None, "[Fundbase] Shutting down all running components");
            cancel_token.cancel();
            fb_log::warn(
                Some("👋"),
                format!("[Fundbase] Turned off with error: {err}"),
            );
        }
    }
}
