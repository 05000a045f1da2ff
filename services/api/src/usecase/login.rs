use tracing::info;

use repair_auth_types::token::SessionIssuer;
use repair_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::normalize_email;
use crate::error::ApiServiceError;
use crate::usecase::password::PasswordHasher;

pub struct LoginInput {
    /// Username, or email when it contains `@`.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user_id: i64,
    pub role: UserRole,
    pub token: String,
    pub expires_at: u64,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub hasher: PasswordHasher,
    pub sessions: SessionIssuer,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiServiceError> {
        let identifier = input.identifier.trim();
        if identifier.is_empty() || input.password.is_empty() {
            return Err(ApiServiceError::invalid_input(
                "identifier and password are required",
            ));
        }

        let user = if identifier.contains('@') {
            self.users.find_by_email(&normalize_email(identifier)).await?
        } else {
            self.users.find_by_username(identifier).await?
        }
        .ok_or(ApiServiceError::InvalidCredentials)?;

        if !user.is_verified {
            return Err(ApiServiceError::EmailNotVerified);
        }

        if !self
            .hasher
            .verify(&input.password, &user.password_hash)
            .await?
        {
            return Err(ApiServiceError::InvalidCredentials);
        }

        let issued = self
            .sessions
            .issue(user.id, &user.username, user.role)
            .map_err(|e| ApiServiceError::Internal(e.into()))?;
        info!(user_id = user.id, "session issued");

        Ok(LoginOutput {
            user_id: user.id,
            role: user.role,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}
