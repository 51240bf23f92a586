use crate::ProfileId;

/// Who is behind a websocket connection. Only admin sessions may subscribe.
pub enum UserSession {
    Admin(ProfileId),
}

impl UserSession {
    pub fn profile_id(&self) -> &ProfileId {
        match self {
            UserSession::Admin(profile_id) => profile_id,
        }
    }
}
