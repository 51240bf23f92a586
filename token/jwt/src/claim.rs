use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kind::JwtTokenKind;

#[derive(Deserialize, Serialize, Debug)]
pub struct Claim {
    id: Uuid,
    kind: JwtTokenKind,
    exp: u64,
}

impl Claim {
    pub fn new(id: &Uuid, kind: &JwtTokenKind, exp: &u64) -> Self {
        Self {
            id: *id,
            kind: *kind,
            exp: *exp,
        }
    }

    /// Profile id of the session owner.
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn kind(&self) -> &JwtTokenKind {
        &self.kind
    }

    pub fn exp(&self) -> &u64 {
        &self.exp
    }

    pub fn is_admin_session(&self) -> bool {
        self.kind == JwtTokenKind::AdminSession
    }
}
