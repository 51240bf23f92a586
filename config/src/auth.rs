use serde::Deserialize;

#[derive(Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    admin_password: String,
    initial_admin: Option<InitialAdminConfig>,
}

impl AuthConfig {
    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }

    pub fn initial_admin(&self) -> &Option<InitialAdminConfig> {
        &self.initial_admin
    }

    pub(crate) fn set_admin_password(&mut self, admin_password: String) {
        self.admin_password = admin_password;
    }
}

#[derive(Deserialize)]
pub struct InitialAdminConfig {
    email: String,
    password: String,
    full_name: String,
}

impl InitialAdminConfig {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}
