//! Login and session handling.
//!
//! The clinic logs in with a chosen username mapped to an email-style
//! identity (`username@clinicdesk.local`) plus a password. Doctors get a
//! secondary 4-digit PIN gate for their per-doctor dashboard. Passwords
//! and PINs are stored as PBKDF2 PHC strings; session tokens are random
//! bearer tokens held server-side as SHA-256 hashes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;

use crate::config;

/// Sessions idle out after 12 hours.
const SESSION_TTL_SECS: u64 = 12 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Deliberately covers both unknown username and wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid PIN")]
    InvalidPin,

    #[error("Hashing error: {0}")]
    Hash(String),
}

// ═══════════════════════════════════════════════════════════
// Identity and credential hashing
// ═══════════════════════════════════════════════════════════

/// Map a clinic-chosen username to its login identity,
/// e.g. `frontdesk` → `frontdesk@clinicdesk.local`.
pub fn login_identity(username: &str) -> String {
    format!("{}@{}", username.trim().to_lowercase(), config::LOGIN_DOMAIN)
}

/// PBKDF2 hash of a password, as a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC hash. Uniform error: callers
/// cannot distinguish a bad hash from a wrong password.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::InvalidCredentials)?;
    Pbkdf2
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Hash a doctor's 4-digit PIN. The format is validated upstream;
/// storage is the same PBKDF2 scheme as passwords.
pub fn hash_pin(pin: &str) -> Result<String, AuthError> {
    hash_password(pin)
}

pub fn verify_pin(pin: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::InvalidPin)?;
    Pbkdf2
        .verify_password(pin.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidPin)
}

// ═══════════════════════════════════════════════════════════
// Bearer tokens
// ═══════════════════════════════════════════════════════════

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Session store
// ═══════════════════════════════════════════════════════════

/// A live login session, keyed by token hash.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub issued_at: Instant,
}

/// In-memory session store. Tokens live only as SHA-256 hashes; expired
/// sessions are swept on access.
pub struct SessionStore {
    sessions: HashMap<[u8; 32], Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            ttl: Duration::from_secs(SESSION_TTL_SECS),
        }
    }

    /// Issue a new session for a logged-in user. Returns the raw token,
    /// which is never stored.
    pub fn issue(&mut self, username: &str) -> String {
        self.cleanup();
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            Session {
                username: username.to_string(),
                issued_at: Instant::now(),
            },
        );
        token
    }

    /// Look up a bearer token. Returns the session if valid and unexpired.
    pub fn validate(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(&hash_token(token))?;
        if session.issued_at.elapsed() >= self.ttl {
            return None;
        }
        Some(session.clone())
    }

    /// Drop a session (logout). Unknown tokens are a no-op.
    pub fn revoke(&mut self, token: &str) {
        self.sessions.remove(&hash_token(token));
    }

    fn cleanup(&mut self) {
        let ttl = self.ttl;
        self.sessions.retain(|_, s| s.issued_at.elapsed() < ttl);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_identity_appends_domain() {
        assert_eq!(login_identity("frontdesk"), "frontdesk@clinicdesk.local");
        assert_eq!(login_identity("  Clinic1 "), "clinic1@clinicdesk.local");
    }

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("hunter2-but-longer").unwrap();
        assert!(hash.starts_with("$pbkdf2"));
        verify_password("hunter2-but-longer", &hash).unwrap();
    }

    #[test]
    fn wrong_password_rejected_uniformly() {
        let hash = hash_password("correct horse").unwrap();
        let err = verify_password("battery staple", &hash).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        // Garbage stored hash yields the same error shape
        let err = verify_password("anything", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn pin_roundtrip() {
        let hash = hash_pin("4321").unwrap();
        verify_pin("4321", &hash).unwrap();
        assert!(matches!(
            verify_pin("1234", &hash).unwrap_err(),
            AuthError::InvalidPin
        ));
    }

    #[test]
    fn tokens_are_unique_and_urlsafe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.len() >= 40);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn session_issue_and_validate() {
        let mut store = SessionStore::new();
        let token = store.issue("frontdesk");

        let session = store.validate(&token).unwrap();
        assert_eq!(session.username, "frontdesk");

        assert!(store.validate("not-a-token").is_none());
    }

    #[test]
    fn revoked_session_is_gone() {
        let mut store = SessionStore::new();
        let token = store.issue("frontdesk");
        store.revoke(&token);
        assert!(store.validate(&token).is_none());
    }

    #[test]
    fn expired_session_rejected() {
        let mut store = SessionStore::new();
        store.ttl = Duration::from_secs(0);
        let token = store.issue("frontdesk");
        assert!(store.validate(&token).is_none());
    }
}
