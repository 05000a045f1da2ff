//! Mock session helpers for router-level tests.
//!
//! Mints real bearer credentials with a test secret so requests pass through
//! the same `BearerSession` extractor as production traffic.

use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};

use repair_auth_types::token::SessionIssuer;
use repair_domain::user::UserRole;

/// Signing secret shared by test app state and [`MockSession`].
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable identity presented by test requests.
pub struct MockSession {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl MockSession {
    pub fn new(user_id: i64, username: &str, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.to_owned(),
            role,
        }
    }

    pub fn user(user_id: i64) -> Self {
        Self::new(user_id, &format!("user{user_id}"), UserRole::User)
    }

    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, &format!("admin{user_id}"), UserRole::Admin)
    }

    /// Issuer matching [`TEST_JWT_SECRET`], for building test app state.
    pub fn issuer() -> SessionIssuer {
        SessionIssuer::new(TEST_JWT_SECRET, 3600)
    }

    /// `Authorization: Bearer <token>` header for this identity.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let issued = Self::issuer()
            .issue(self.user_id, &self.username, self.role)
            .expect("failed to sign test session");
        let value = HeaderValue::from_str(&format!("Bearer {}", issued.token))
            .expect("bearer token is a valid header value");
        (AUTHORIZATION, value)
    }
}
