//! Time-limited form tokens.

use chrono::Utc;
use keymagic_core::ports::NonceVerifier;
use sha2::{Digest, Sha256};

/// Length of one nonce tick in seconds. A token is accepted during the tick
/// it was issued in and the following one.
pub const NONCE_TICK_SECS: i64 = 12 * 60 * 60;

const TOKEN_LEN: usize = 10;

/// Nonces derived from a site secret: the first hex digits of
/// SHA-256(secret | action | tick).
pub struct HashNonces {
    secret: String,
}

impl HashNonces {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn tick_at(unix_secs: i64) -> i64 {
        unix_secs.div_euclid(NONCE_TICK_SECS)
    }

    fn token(&self, action: &str, tick: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..TOKEN_LEN].to_string()
    }

    pub fn create_at(&self, action: &str, unix_secs: i64) -> String {
        self.token(action, Self::tick_at(unix_secs))
    }

    pub fn verify_at(&self, action: &str, token: &str, unix_secs: i64) -> bool {
        if token.len() != TOKEN_LEN {
            return false;
        }
        let tick = Self::tick_at(unix_secs);
        [tick, tick - 1]
            .into_iter()
            .any(|t| constant_time_eq(self.token(action, t).as_bytes(), token.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl NonceVerifier for HashNonces {
    fn create(&self, action: &str) -> String {
        self.create_at(action, Utc::now().timestamp())
    }

    fn verify(&self, action: &str, token: &str) -> bool {
        self.verify_at(action, token, Utc::now().timestamp())
    }
}
