use anyhow::Result;
use serde::Serialize;

use crate::{
    command::HubSender,
    message::{Message, MessageKind, Target},
};

/// Publishes project events to every subscribed admin connection.
#[derive(Clone)]
pub struct WebSocketBroadcaster {
    hub: HubSender,
}

impl WebSocketBroadcaster {
    pub(crate) fn new(hub: HubSender) -> Self {
        Self { hub }
    }

    pub fn broadcast(&self, message: Message) -> Result<()> {
        self.hub.broadcast(message)
    }

    pub fn project_inserted<T: Serialize>(&self, project: &T) -> Result<()> {
        self.broadcast(Message::new(
            Target::Projects,
            MessageKind::InsertOne,
            serde_json::to_value(project)?,
        ))
    }

    pub fn project_updated<T: Serialize>(&self, project: &T) -> Result<()> {
        self.broadcast(Message::new(
            Target::Projects,
            MessageKind::UpdateOne,
            serde_json::to_value(project)?,
        ))
    }
}
