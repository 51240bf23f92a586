use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct GuardReqQuery {
    path: String,
}

impl GuardReqQuery {
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Serialize)]
pub struct GuardResJson {
    allow: bool,
    redirect_to: Option<String>,
}

impl GuardResJson {
    pub fn new(redirect_to: Option<&str>) -> Self {
        Self {
            allow: redirect_to.is_none(),
            redirect_to: redirect_to.map(str::to_owned),
        }
    }
}
