use anyhow::{Error, Result};
use tokio::sync::mpsc;

use crate::{
    message::{Message, Target},
    session::UserSession,
    ConnectionId,
};

pub(crate) enum Command {
    Connect {
        user_session: UserSession,
        target: Target,
        connection_id: ConnectionId,
        connection_tx: mpsc::UnboundedSender<Message>,
    },
    Disconnect(ConnectionId),
    Broadcast(Message),
}

/// Sending half of the hub's command queue.
#[derive(Clone)]
pub(crate) struct HubSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl HubSender {
    pub fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    pub fn connect(
        &self,
        user_session: UserSession,
        target: Target,
        connection_id: ConnectionId,
        connection_tx: mpsc::UnboundedSender<Message>,
    ) -> Result<()> {
        self.send(Command::Connect {
            user_session,
            target,
            connection_id,
            connection_tx,
        })
    }

    pub fn disconnect(&self, connection_id: ConnectionId) -> Result<()> {
        self.send(Command::Disconnect(connection_id))
    }

    pub fn broadcast(&self, message: Message) -> Result<()> {
        self.send(Command::Broadcast(message))
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| Error::msg("Websocket hub is not running"))
    }
}
