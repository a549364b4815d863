//! Admin session tokens and credential checks
//!
//! A session token is `<expiry>.<signature>` where `expiry` is a Unix time in
//! seconds and `signature` is the SHA-256 of the per-process secret followed
//! by the expiry, as 64 hex characters. Tokens die with the process that
//! issued them and when they expire.

use crate::config::AdminConfig;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Name of the admin session cookie
pub const SESSION_COOKIE: &str = "humn_admin";

/// Session validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Token does not have the `<expiry>.<signature>` shape
    Malformed,
    /// Signature does not match
    BadSignature,
    /// Token is past its expiry
    Expired { expired_at: i64, now: i64 },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Malformed => write!(f, "Malformed session token"),
            SessionError::BadSignature => write!(f, "Invalid session signature"),
            SessionError::Expired { expired_at, now } => {
                write!(f, "Session expired {}s ago", now - expired_at)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Issues and validates admin session tokens
#[derive(Clone)]
pub struct SessionSigner {
    secret: [u8; 32],
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Signer with a fresh random secret
    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// Signer with a fixed secret (tests, multi-process deployments)
    pub fn with_secret(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Issue a token valid until `now + ttl_secs`
    pub fn issue(&self, now: i64, ttl_secs: u64) -> String {
        let expiry = now.saturating_add(ttl_secs as i64);
        format!("{}.{}", expiry, self.sign(expiry))
    }

    /// Validate a token at time `now`
    pub fn validate(&self, token: &str, now: i64) -> Result<(), SessionError> {
        let (expiry, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let expiry: i64 = expiry.parse().map_err(|_| SessionError::Malformed)?;

        if signature.len() != 64 {
            return Err(SessionError::Malformed);
        }
        if !constant_time_eq(signature.as_bytes(), self.sign(expiry).as_bytes()) {
            return Err(SessionError::BadSignature);
        }
        if now >= expiry {
            return Err(SessionError::Expired {
                expired_at: expiry,
                now,
            });
        }
        Ok(())
    }

    fn sign(&self, expiry: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(expiry.to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Check login credentials against configuration.
///
/// Always false when either configured credential is missing.
pub fn verify_credentials(config: &AdminConfig, email: &str, password: &str) -> bool {
    match (&config.email, &config.password) {
        (Some(expected_email), Some(expected_password)) => {
            constant_time_eq(email.as_bytes(), expected_email.as_bytes())
                & constant_time_eq(password.as_bytes(), expected_password.as_bytes())
        }
        _ => false,
    }
}

/// `Set-Cookie` header value for a session token
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Find a cookie's value in a `Cookie` request header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
