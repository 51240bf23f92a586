use std::time::{Duration, Instant};

use anyhow::Result;
use futures::StreamExt;
use tokio::{select, sync::mpsc, time::interval};
use uuid::Uuid;

use crate::{command::HubSender, message::Target, session::UserSession};

/// Drives a single websocket connection: registers it with the hub, keeps it
/// alive with pings and forwards hub messages as JSON text frames.
#[derive(Clone)]
pub struct WebSocketHandler {
    pub(crate) hub: HubSender,

    heartbeat_interval: Duration,
    client_timeout: Duration,
}

impl WebSocketHandler {
    pub(crate) fn new(
        hub: HubSender,
        heartbeat_interval: &Duration,
        client_timeout: &Duration,
    ) -> Self {
        Self {
            hub,
            heartbeat_interval: *heartbeat_interval,
            client_timeout: *client_timeout,
        }
    }

    pub async fn connection(
        self,
        user_session: UserSession,
        target: Target,
        mut session: actix_ws_ng::Session,
        mut msg_stream: actix_ws_ng::MessageStream,
    ) -> Result<()> {
        let connection_id = Uuid::now_v7();
        let (connection_tx, mut connection_rx) = mpsc::unbounded_channel();

        self.hub
            .connect(user_session, target, connection_id, connection_tx)?;

        let mut last_heartbeat = Instant::now();
        let mut heartbeat = interval(self.heartbeat_interval);

        let close_reason = loop {
            select! {
                _ = heartbeat.tick() => {
                    if Instant::now().duration_since(last_heartbeat) > self.client_timeout {
                        fb_log::info(
                            None,
                            format!(
                                "[ApiWebSocketServer] Dropping connection {connection_id}: no heartbeat for {:?}",
                                self.client_timeout
                            ),
                        );
                        break None;
                    }
                    if session.ping(b"").await.is_err() {
                        break None;
                    }
                }
                msg = msg_stream.next() => {
                    match msg {
                        Some(Ok(actix_ws_ng::Message::Ping(bytes))) => {
                            last_heartbeat = Instant::now();
                            let _ = session.pong(&bytes).await;
                        }
                        Some(Ok(actix_ws_ng::Message::Pong(_))) => last_heartbeat = Instant::now(),
                        Some(Ok(actix_ws_ng::Message::Close(reason))) => break reason,
                        Some(Ok(actix_ws_ng::Message::Text(_) | actix_ws_ng::Message::Binary(_))) => {
                            last_heartbeat = Instant::now();
                        }
                        Some(Ok(_)) | None => break None,
                        Some(Err(err)) => {
                            fb_log::warn(
                                None,
                                format!("[ApiWebSocketServer] Connection {connection_id} stream failed: {err}"),
                            );
                            break None;
                        }
                    }
                }
                Some(msg) = connection_rx.recv() => {
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(err) => {
                            fb_log::error(
                                None,
                                format!("[ApiWebSocketServer] Failed to serialize message: {err}"),
                            );
                            continue;
                        }
                    };
                    if session.text(text).await.is_err() {
                        break None;
                    }
                }
            }
        };

        fb_log::debug(
            None,
            format!("[ApiWebSocketServer] Connection {connection_id} closed"),
        );
        self.hub.disconnect(connection_id)?;
        session.close(close_reason).await?;

        Ok(())
    }
}
