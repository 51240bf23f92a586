use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};

pub struct Argon2Hash {
    argon2: Argon2<'static>,
}

impl Argon2Hash {
    pub fn new(algorithm: &str, version: &str) -> Result<Self> {
        fb_log::info(Some("⚡"), "[Argon2Hash] Initializing component");

        let algorithm = match algorithm {
            "Argon2d" => Algorithm::Argon2d,
            "Argon2i" => Algorithm::Argon2i,
            "Argon2id" => Algorithm::Argon2id,
            _ => return Err(anyhow!("Unknown argon2 algorithm '{algorithm}'")),
        };

        let version = match version {
            "V0x10" => Version::V0x10,
            "V0x13" => Version::V0x13,
            _ => return Err(anyhow!("Unknown argon2 version '{version}'")),
        };

        Ok(Self {
            argon2: Argon2::new(algorithm, version, Params::DEFAULT),
        })
    }

    /// Hashes with a fresh random salt and returns the PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| anyhow!("{err}"))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(hash) => self
                .argon2
                .verify_password(password.as_bytes(), &hash)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let hasher = Argon2Hash::new("Argon2id", "V0x13").unwrap();
        let hash = hasher.hash_password("correct horse").unwrap();

        assert!(hasher.verify_password("correct horse", &hash));
        assert!(!hasher.verify_password("battery staple", &hash));
        assert!(!hasher.verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn salts_every_hash() {
        let hasher = Argon2Hash::new("Argon2id", "V0x13").unwrap();
        assert_ne!(
            hasher.hash_password("secret").unwrap(),
            hasher.hash_password("secret").unwrap()
        );
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(Argon2Hash::new("Bcrypt", "V0x13").is_err());
    }
}
