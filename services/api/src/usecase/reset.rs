use anyhow::anyhow;
use tracing::info;

use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::domain::types::{MIN_PASSWORD_LEN, normalize_email, validate_password};
use crate::error::ApiServiceError;
use crate::usecase::password::PasswordHasher;

pub struct ResetPasswordInput {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U: UserRepository, T: VerificationTokenRepository> {
    pub users: U,
    pub tokens: T,
    pub hasher: PasswordHasher,
}

impl<U: UserRepository, T: VerificationTokenRepository> ResetPasswordUseCase<U, T> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), ApiServiceError> {
        let email = normalize_email(&input.email);
        let code = input.token.trim();
        if email.is_empty() || code.is_empty() {
            return Err(ApiServiceError::invalid_input("email and token are required"));
        }
        if !validate_password(&input.new_password) {
            return Err(ApiServiceError::invalid_input(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
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

        let password_hash = self.hasher.hash(&input.new_password).await?;
        self.users
            .update_password_hash(user.id, &password_hash)
            .await?;

        // Unlike verification, a reset token must not outlive its use.
        self.tokens.delete(token.id).await?;
        info!(user_id = user.id, "password reset");
        Ok(())
    }
}
