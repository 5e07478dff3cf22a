//! Stateless, HMAC-signed session tokens.
//!
//! A token is two base64url segments joined by a dot:
//!
//! ```text
//! base64url(claims JSON) "." base64url(HMAC-SHA256(signing_key, first segment))
//! ```
//!
//! The claims bind a principal id, a username and an expiry.  A token
//! says *who* is asking; it never unlocks vault contents by itself.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use super::signing_key::SigningKey;
use crate::errors::{LockerError, Result};

/// Tokens larger than this are rejected before any decoding.
const MAX_TOKEN_LEN: usize = 4_096;

/// The authenticated identity carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// An issued bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates session tokens.
#[derive(Debug, Clone)]
pub struct SessionGate {
    key: SigningKey,
    ttl: Duration,
}

impl SessionGate {
    /// Build a gate.  `ttl` must be positive.
    pub fn new(key: SigningKey, ttl: Duration) -> Result<Self> {
        if ttl <= Duration::zero() {
            return Err(LockerError::Configuration(
                "session lifetime must be positive".into(),
            ));
        }
        Ok(Self { key, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `principal_id` valid for the configured lifetime.
    pub fn issue(&self, principal_id: &str, username: &str) -> Result<SessionToken> {
        self.issue_at(principal_id, username, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        principal_id: &str,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionToken> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            LockerError::Configuration("session expiry is out of range".into())
        })?;
        let claims = Claims {
            sub: principal_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| LockerError::Serialization(format!("session claims: {e}")))?;
        let payload = B64URL.encode(claims_json);
        let signature = B64URL.encode(self.sign(payload.as_bytes())?);

        Ok(SessionToken {
            token: format!("{payload}.{signature}"),
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    /// Validate `token` and return the principal it names.
    ///
    /// Malformed, forged and expired tokens all yield `Unauthorized`.
    pub fn validate(&self, token: &str) -> Result<Principal> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` as if the current time were `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        if token.is_empty() || token.len() > MAX_TOKEN_LEN {
            return Err(reject("bad length"));
        }

        let (payload, signature) = token.split_once('.').ok_or_else(|| reject("malformed"))?;
        let signature = B64URL
            .decode(signature)
            .map_err(|_| reject("signature encoding"))?;

        // Signature first; claims are untrusted until it checks out.
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| reject("signature mismatch"))?;

        let claims_json = B64URL
            .decode(payload)
            .map_err(|_| reject("payload encoding"))?;
        let claims: Claims =
            serde_json::from_slice(&claims_json).map_err(|_| reject("claims shape"))?;

        if claims.sub.is_empty() {
            return Err(reject("empty subject"));
        }
        if now.timestamp() >= claims.exp {
            return Err(reject("expired"));
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| reject("expiry out of range"))?;

        Ok(Principal {
            id: claims.sub,
            username: claims.username,
            expires_at,
        })
    }

    fn mac(&self) -> Result<Hmac<Sha256>> {
        Hmac::<Sha256>::new_from_slice(self.key.as_bytes())
            .map_err(|e| LockerError::SessionKey(format!("invalid HMAC key: {e}")))
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn reject(reason: &str) -> LockerError {
    debug!(reason, "session token rejected");
    LockerError::Unauthorized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> SessionGate {
        SessionGate::new(SigningKey::new([7u8; 32]), Duration::minutes(30)).unwrap()
    }

    #[test]
    fn issue_then_validate() {
        let gate = gate();
        let token = gate.issue("u1", "alice").unwrap();
        let principal = gate.validate(token.as_str()).unwrap();
        assert_eq!(principal.id, "u1");
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.expires_at, token.expires_at());
    }

    #[test]
    fn bearer_prefix_is_accepted() {
        let gate = gate();
        let token = gate.issue("u1", "alice").unwrap();
        let header = format!("Bearer {}", token.as_str());
        assert!(gate.validate(&header).is_ok());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let result = SessionGate::new(SigningKey::new([7u8; 32]), Duration::zero());
        assert!(matches!(result, Err(LockerError::Configuration(_))));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = gate().issue("u1", "alice").unwrap();
        assert!(!format!("{token:?}").contains(token.as_str()));
    }

    #[test]
    fn expiry_past_the_calendar_is_an_error() {
        let gate = gate();
        let result = gate.issue_at("u1", "alice", DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(LockerError::Configuration(_))));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let gate = gate();
        let now = Utc::now();
        let token = gate.issue_at("u1", "alice", now).unwrap();
        let exp = token.expires_at();
        assert!(gate
            .validate_at(token.as_str(), exp - Duration::seconds(1))
            .is_ok());
        assert!(matches!(
            gate.validate_at(token.as_str(), exp),
            Err(LockerError::Unauthorized)
        ));
    }
}
