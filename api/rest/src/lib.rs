use actix_cors::Cors;
use actix_web::{
    middleware::{ErrorHandlers, Logger},
    web, App, HttpServer,
};
use configure::configure;
use context::ApiRestCtx;
use error_handler::default_error_handler;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod configure;
pub mod context;
mod error_handler;
mod guard;
mod model;
mod service;
mod util;

const LOGGER_FORMAT: &str = "%a \"%r\" %s %b %Dms";

pub struct ApiRestServer {
    address: String,
    allowed_origin: Option<String>,
    context: web::Data<ApiRestCtx>,
}

impl ApiRestServer {
    pub fn new(host: &str, port: &u16, allowed_origin: &Option<String>, ctx: ApiRestCtx) -> Self {
        fb_log::info(Some("⚡"), "[ApiRestServer] Initializing component");

        Self {
            address: format!("{host}:{port}"),
            allowed_origin: allowed_origin.clone(),
            context: web::Data::new(ctx),
        }
    }

    pub fn run(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        fb_log::info(Some("💫"), "[ApiRestServer] Running component");

        tokio::spawn(async move {
            let context = self.context;
            let allowed_origin = self.allowed_origin;
            let server = match HttpServer::new(move || {
                App::new()
                    .wrap(Logger::new(LOGGER_FORMAT))
                    .wrap(cors(&allowed_origin))
                    .wrap(ErrorHandlers::new().default_handler(default_error_handler))
                    .app_data(context.clone())
                    .configure(configure)
            })
            .disable_signals()
            .bind(&self.address)
            {
                Ok(server) => server.run(),
                Err(err) => fb_log::panic(
                    None,
                    format!("[ApiRestServer] Failed to bind {}: {err}", self.address),
                ),
            };
            let server_handle = server.handle();

            tokio::select! {
                _ = cancel_token.cancelled() => {}
                res = server => {
                    if let Err(err) = res {
                        fb_log::panic(None, format!("[ApiRestServer] Server error: {err}"));
                    }
                }
            }

            fb_log::info(None, "[ApiRestServer] Shutting down component");
            server_handle.stop(true).await;
        })
    }
}

fn cors(allowed_origin: &Option<String>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials(),
        None => Cors::permissive(),
    }
}

#[cfg(test)]
pub(crate) mod test_util;
