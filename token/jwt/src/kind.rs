use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum JwtTokenKind {
    User,
    /// Issued after the admin password has been re-entered.
    AdminSession,
}
