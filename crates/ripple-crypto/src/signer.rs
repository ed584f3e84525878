use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};

/// Signs and verifies small claim sets with HMAC-SHA256.
///
/// Every cookie Ripple sets goes through here, so a client can read its
/// cookies but cannot forge or alter them. Claims must carry an `exp`
/// (seconds since the epoch); expired tokens fail verification.
#[derive(Clone)]
pub struct Signer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Signer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    /// `None` for anything tampered, signed with another secret, or expired.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        decode::<T>(token, &self.decoding, &Validation::default())
            .ok()
            .map(|data| data.claims)
    }
}

/// Expiry timestamp `duration` from now, in the form `exp` claims use.
pub fn expires_in(duration: chrono::Duration) -> usize {
    (chrono::Utc::now() + duration).timestamp().max(0) as usize
}
