use anyhow::anyhow;
use tracing::{info, warn};

use crate::domain::repository::{Notifier, UserRepository, VerificationTokenRepository};
use crate::domain::types::{NewToken, VerificationPolicy, normalize_email};
use crate::error::ApiServiceError;
use crate::usecase::code::generate_code;
use crate::usecase::notify::deliver_code;

// ── RequestCode (resend) ─────────────────────────────────────────────────────

pub struct RequestCodeInput {
    pub email: String,
}

pub struct RequestCodeUseCase<U, T, N>
where
    U: UserRepository,
    T: VerificationTokenRepository,
    N: Notifier,
{
    pub users: U,
    pub tokens: T,
    pub notifier: N,
    pub policy: VerificationPolicy,
}

impl<U, T, N> RequestCodeUseCase<U, T, N>
where
    U: UserRepository,
    T: VerificationTokenRepository,
    N: Notifier,
{
    pub async fn execute(&self, input: RequestCodeInput) -> Result<(), ApiServiceError> {
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(ApiServiceError::invalid_input("email is required"));
        }

        // 1. Find user by email → 404 if not found
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ApiServiceError::UserNotFound)?;

        // 2. Supersede every outstanding code with a fresh one (one transaction)
        let new_token = NewToken::issued_now(generate_code(), self.policy.token_ttl);
        let token = self.tokens.replace_for_user(user.id, &new_token).await?;
        info!(user_id = user.id, "verification code reissued");

        // 3. Deliver
        deliver_code(
            &self.notifier,
            self.policy.notify_timeout,
            &user.email,
            &token.token,
        )
        .await
    }
}

// ── RedeemCode (verify email) ────────────────────────────────────────────────

pub struct RedeemCodeInput {
    pub email: String,
    pub code: String,
}

pub struct RedeemCodeUseCase<U: UserRepository, T: VerificationTokenRepository> {
    pub users: U,
    pub tokens: T,
}

impl<U: UserRepository, T: VerificationTokenRepository> RedeemCodeUseCase<U, T> {
    /// Missing, expired, and foreign codes all yield `InvalidCode`; none of
    /// them consume the token.
    pub async fn execute(&self, input: RedeemCodeInput) -> Result<(), ApiServiceError> {
        let email = normalize_email(&input.email);
        let code = input.code.trim();
        if email.is_empty() || code.is_empty() {
            return Err(ApiServiceError::invalid_input("email and code are required"));
        }

        let token = self
            .tokens
            .find_live(code)
            .await?
            .ok_or(ApiServiceError::InvalidCode)?;

        let user = self
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or_else(|| {
                ApiServiceError::Internal(anyhow!(
                    "token {} references missing user {}",
                    token.id,
                    token.user_id
                ))
            })?;

        if normalize_email(&user.email) != email {
            return Err(ApiServiceError::InvalidCode);
        }

        self.users.mark_verified(user.id).await?;
        info!(user_id = user.id, "email verified");

        // Verification already committed; a leftover token expires and is swept.
        if let Err(e) = self.tokens.delete(token.id).await {
            warn!(error = %e, token_id = token.id, "failed to delete redeemed token");
        }
        Ok(())
    }
}
