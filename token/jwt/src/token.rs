use std::time;

use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{claim::Claim, kind::JwtTokenKind};

pub struct JwtToken {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_duration: u64,
}

impl JwtToken {
    pub fn new(secret: &str, expiry_duration: &u64) -> Self {
        fb_log::info(Some("⚡"), "[JwtToken] Initializing component");

        let secret = secret.as_bytes();
        Self {
            header: Header::default(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_duration: *expiry_duration,
        }
    }

    pub fn encode(&self, id: &Uuid, kind: &JwtTokenKind) -> Result<String> {
        let expiration_time = now_secs()? + self.expiry_duration;

        Ok(encode(
            &self.header,
            &Claim::new(id, kind, &expiration_time),
            &self.encoding_key,
        )?)
    }

    pub fn decode(&self, token: &str) -> Result<Claim> {
        Ok(decode::<Claim>(token, &self.decoding_key, &Validation::default())?.claims)
    }

    pub fn need_renew(&self, claim: &Claim) -> Result<bool> {
        Ok(claim.exp().saturating_sub(self.expiry_duration / 2) < now_secs()?)
    }

    pub fn renew(&self, claim: &Claim) -> Result<String> {
        self.encode(claim.id(), claim.kind())
    }
}

fn now_secs() -> Result<u64> {
    Ok(time::SystemTime::now()
        .duration_since(time::UNIX_EPOCH)?
        .as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_session_kind() {
        let jwt = JwtToken::new("secret", &3600);
        let id = Uuid::now_v7();

        let token = jwt.encode(&id, &JwtTokenKind::AdminSession).unwrap();
        let claim = jwt.decode(&token).unwrap();

        assert_eq!(claim.id(), &id);
        assert!(claim.is_admin_session());
        assert!(!jwt.need_renew(&claim).unwrap());
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let token = JwtToken::new("one", &3600)
            .encode(&Uuid::now_v7(), &JwtTokenKind::User)
            .unwrap();

        assert!(JwtToken::new("two", &3600).decode(&token).is_err());
    }

    #[test]
    fn renews_past_half_lifetime() {
        let jwt = JwtToken::new("secret", &3600);
        let claim = Claim::new(
            &Uuid::now_v7(),
            &JwtTokenKind::User,
            &(now_secs().unwrap() + 60),
        );

        assert!(jwt.need_renew(&claim).unwrap());
    }
}
