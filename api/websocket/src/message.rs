use serde::Serialize;

#[derive(Serialize, Clone)]
pub struct Message {
    #[serde(skip_serializing)]
    pub target: Target,

    kind: MessageKind,
    data: serde_json::Value,
}

impl Message {
    pub fn new(target: Target, kind: MessageKind, data: serde_json::Value) -> Self {
        Self { target, kind, data }
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }
}

#[derive(Eq, Hash, PartialEq, Clone, Copy, Debug)]
pub enum Target {
    Projects,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    InsertOne,
    UpdateOne,
}
