//! Session credential issuance and validation (HS256 JWT).

use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, get_current_timestamp};
use serde::{Deserialize, Serialize};

use repair_domain::user::UserRole;

/// Default session lifetime in seconds (72 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 72 * 60 * 60;

/// Identity recovered from a validated session credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    pub expires_at: u64,
}

/// Errors returned by [`SessionIssuer::validate`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | username |
/// | `uid` | custom | numeric user id |
/// | `role` | custom | [`UserRole`] as lowercase string |
/// | `iat` | `iat` | issued-at, seconds since epoch |
/// | `exp` | `exp` | expiration, seconds since epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub uid: i64,
    pub role: UserRole,
    pub iat: u64,
    pub exp: u64,
}

/// A freshly minted credential and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: u64,
}

/// Signs and validates bearer credentials with a process-wide secret.
///
/// Construct once at startup and share via application state. There is no
/// revocation list: a credential stays valid until its `exp`.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Mint a credential for `username` carrying `role`.
    pub fn issue(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
    ) -> Result<IssuedSession, jsonwebtoken::errors::Error> {
        let iat = get_current_timestamp();
        let exp = iat + self.ttl_secs;
        let claims = SessionClaims {
            sub: username.to_owned(),
            uid: user_id,
            role,
            iat,
            exp,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &self.encoding,
        )?;
        Ok(IssuedSession {
            token,
            expires_at: exp,
        })
    }

    /// Validate a credential: HS256 signature, `exp` with no leeway,
    /// required `exp` + `sub`.
    pub fn validate(&self, token: &str) -> Result<SessionIdentity, AuthError> {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;

        let claims = data.claims;
        Ok(SessionIdentity {
            user_id: claims.uid,
            username: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        })
    }
}
