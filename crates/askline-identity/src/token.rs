//! Signed bearer tokens.
//!
//! Token format: `base64url(user_id|expires_unix_secs|hmac_hex)`, where the
//! HMAC-SHA256 covers `user_id|expires_unix_secs`. A token is bound to one
//! account and a time window; there is no server-side session state.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::IdentityError;

type HmacSha256 = Hmac<Sha256>;

/// Issues and verifies bearer tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenSigner {
    key: Key<HmacSha256>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: [u8; 32], ttl: Duration) -> Self {
        // Zero-padded to the SHA-256 block size, as HMAC pads short keys.
        let mut key = Key::<HmacSha256>::default();
        key[..secret.len()].copy_from_slice(&secret);
        Self { key, ttl }
    }

    /// Derives the signing key from a configured passphrase, so tokens stay
    /// valid across restarts.
    pub fn from_passphrase(passphrase: &str, ttl: Duration) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"askline-token-v1:");
        hasher.update(passphrase.as_bytes());
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&hasher.finalize());
        Self::new(secret, ttl)
    }

    /// Random per-process key. Every token is invalidated by a restart.
    pub fn random(ttl: Duration) -> Self {
        let mut secret = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self::new(secret, ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` valid for the configured TTL.
    pub fn issue(&self, user_id: i64) -> String {
        self.issue_at(user_id, unix_now())
    }

    /// Returns the user id the token was issued for.
    pub fn verify(&self, token: &str) -> Result<i64, IdentityError> {
        self.verify_at(token, unix_now())
    }

    fn issue_at(&self, user_id: i64, now: u64) -> String {
        let expires = now + self.ttl.as_secs();
        let payload = format!("{}|{}", user_id, expires);
        let signature = self.mac(&payload).finalize().into_bytes();

        let token = format!("{}|{}", payload, hex::encode(signature));
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token.as_bytes())
    }

    fn verify_at(&self, token: &str, now: u64) -> Result<i64, IdentityError> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(token.trim().as_bytes())
            .map_err(|_| IdentityError::InvalidToken)?;
        let decoded = String::from_utf8(decoded).map_err(|_| IdentityError::InvalidToken)?;

        // user_id|expires|signature_hex
        let mut parts = decoded.splitn(3, '|');
        let (Some(user_id), Some(expires), Some(sig_hex)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(IdentityError::InvalidToken);
        };

        let provided = hex::decode(sig_hex).map_err(|_| IdentityError::InvalidToken)?;
        self.mac(&format!("{}|{}", user_id, expires))
            .verify_slice(&provided)
            .map_err(|_| IdentityError::InvalidToken)?;

        let expires: u64 = expires.parse().map_err(|_| IdentityError::InvalidToken)?;
        if now > expires {
            return Err(IdentityError::InvalidToken);
        }

        user_id.parse().map_err(|_| IdentityError::InvalidToken)
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = <HmacSha256 as KeyInit>::new(&self.key);
        mac.update(payload.as_bytes());
        mac
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
