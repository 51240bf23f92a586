use std::{sync::Arc, time::Duration};

use ahash::{HashMap, HashMapExt, HashSet};
use anyhow::Result;
use broadcaster::WebSocketBroadcaster;
use command::{Command, HubSender};
use fb_dao::{profile::ProfileDao, Db};
use handler::WebSocketHandler;
use message::{Message, Target};
use session::UserSession;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

mod command;

pub mod broadcaster;
pub mod handler;
pub mod message;
pub mod session;

pub type ConnectionId = Uuid;
pub type ProfileId = Uuid;

/// Realtime hub. Owns every open connection and fans broadcast messages out
/// to the subscribers of their target.
pub struct ApiWebSocketServer {
    db: Arc<Db>,

    sessions: HashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    user_sessions: HashMap<ConnectionId, UserSession>,
    subscribers: HashMap<Target, HashSet<ConnectionId>>,

    command_rx: mpsc::UnboundedReceiver<Command>,
}

impl ApiWebSocketServer {
    pub fn new(
        db: Arc<Db>,
        heartbeat_interval: &Duration,
        client_timeout: &Duration,
    ) -> (Self, WebSocketHandler, WebSocketBroadcaster) {
        fb_log::info(Some("⚡"), "[ApiWebSocketServer] Initializing component");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let hub = HubSender::new(command_tx);

        (
            Self {
                db,

                sessions: HashMap::new(),
                user_sessions: HashMap::new(),
                subscribers: HashMap::new(),

                command_rx,
            },
            WebSocketHandler::new(hub.clone(), heartbeat_interval, client_timeout),
            WebSocketBroadcaster::new(hub),
        )
    }

    pub fn run(mut self, cancel_token: CancellationToken) -> JoinHandle<()> {
        fb_log::info(Some("💫"), "[ApiWebSocketServer] Running component");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    command = self.command_rx.recv() => match command {
                        Some(Command::Connect {
                            user_session,
                            target,
                            connection_id,
                            connection_tx,
                        }) => self.insert_connection(user_session, target, connection_id, connection_tx),
                        Some(Command::Disconnect(connection_id)) => self.disconnect(&connection_id),
                        Some(Command::Broadcast(message)) => {
                            if let Err(err) = self.broadcast(message).await {
                                fb_log::error(None, format!("[ApiWebSocketServer] Broadcast failed: {err}"));
                            }
                        }
                        None => break,
                    }
                }
            }

            fb_log::info(None, "[ApiWebSocketServer] Shutting down component");
        })
    }

    fn insert_connection(
        &mut self,
        user_session: UserSession,
        target: Target,
        connection_id: ConnectionId,
        connection_tx: mpsc::UnboundedSender<Message>,
    ) {
        self.sessions.insert(connection_id, connection_tx);
        self.user_sessions.insert(connection_id, user_session);
        self.subscribers
            .entry(target)
            .or_default()
            .insert(connection_id);
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.sessions.remove(connection_id);
        self.user_sessions.remove(connection_id);
        for connection_ids in self.subscribers.values_mut() {
            connection_ids.remove(connection_id);
        }
    }

    // The role is read again for every message so a demoted admin stops
    // receiving events without reconnecting.
    async fn broadcast(&self, message: Message) -> Result<()> {
        let Some(connection_ids) = self.subscribers.get(&message.target) else {
            return Ok(());
        };
        for connection_id in connection_ids {
            let Some(user_session) = self.user_sessions.get(connection_id) else {
                continue;
            };
            let is_admin = ProfileDao::db_select(&self.db, user_session.profile_id())
                .await?
                .is_some_and(|profile| profile.is_admin());
            if !is_admin {
                continue;
            }
            if let Some(connection_tx) = self.sessions.get(connection_id) {
                let _ = connection_tx.send(message.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use fb_dao::{
        profile::{ProfileDao, Role},
        Db,
    };
    use fb_db_sqlite::db::SqliteDb;
    use serde_json::json;
    use tokio::{sync::mpsc, time::timeout};
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    use crate::{
        message::{MessageKind, Target},
        session::UserSession,
        ApiWebSocketServer,
    };

    #[tokio::test]
    async fn only_admins_receive_project_events() {
        let db = Arc::new(Db::SqliteDb(SqliteDb::new(":memory:", &1).await.unwrap()));
        let admin = ProfileDao::new("admin@example.com", "hash", "Admin", &Role::Admin);
        admin.db_insert(&db).await.unwrap();
        let user = ProfileDao::new("user@example.com", "hash", "User", &Role::User);
        user.db_insert(&db).await.unwrap();

        let (server, handler, broadcaster) = ApiWebSocketServer::new(
            db.clone(),
            &Duration::from_secs(5),
            &Duration::from_secs(10),
        );
        let cancel_token = CancellationToken::new();
        let hub_task = server.run(cancel_token.clone());

        let (admin_tx, mut admin_rx) = mpsc::unbounded_channel();
        handler
            .hub
            .connect(
                UserSession::Admin(*admin.id()),
                Target::Projects,
                Uuid::now_v7(),
                admin_tx,
            )
            .unwrap();
        let (user_tx, mut user_rx) = mpsc::unbounded_channel();
        handler
            .hub
            .connect(
                UserSession::Admin(*user.id()),
                Target::Projects,
                Uuid::now_v7(),
                user_tx,
            )
            .unwrap();

        broadcaster
            .project_inserted(&json!({"title": "Solar kiosk"}))
            .unwrap();

        let received = timeout(Duration::from_secs(1), admin_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.kind(), &MessageKind::InsertOne);
        assert_eq!(received.data()["title"], "Solar kiosk");
        assert!(timeout(Duration::from_millis(100), user_rx.recv())
            .await
            .is_err());

        cancel_token.cancel();
        hub_task.await.unwrap();
    }
}
