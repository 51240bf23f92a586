use serde::Deserialize;

#[derive(Deserialize)]
pub struct HashConfig {
    argon2: Argon2HashConfig,
}

impl HashConfig {
    pub fn argon2(&self) -> &Argon2HashConfig {
        &self.argon2
    }
}

#[derive(Deserialize)]
pub struct Argon2HashConfig {
    #[serde(default = "default_algorithm")]
    algorithm: String,
    #[serde(default = "default_version")]
    version: String,
}

impl Argon2HashConfig {
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

fn default_algorithm() -> String {
    "Argon2id".to_owned()
}

fn default_version() -> String {
    "V0x13".to_owned()
}
