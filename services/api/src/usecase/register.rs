use tracing::info;

use repair_domain::user::UserRole;

use crate::domain::repository::{Notifier, UserRepository};
use crate::domain::types::{
    MIN_PASSWORD_LEN, NewToken, NewUser, VerificationPolicy, normalize_email, validate_email,
    validate_password, validate_username,
};
use crate::error::ApiServiceError;
use crate::usecase::code::generate_code;
use crate::usecase::notify::deliver_code;
use crate::usecase::password::PasswordHasher;

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub invite_code: Option<String>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user_id: i64,
    pub role: UserRole,
}

pub struct RegisterUseCase<U: UserRepository, N: Notifier> {
    pub users: U,
    pub notifier: N,
    pub hasher: PasswordHasher,
    pub policy: VerificationPolicy,
    /// Invite code that grants `admin` at registration. Empty disables it.
    pub admin_invite_code: String,
}

impl<U: UserRepository, N: Notifier> RegisterUseCase<U, N> {
    /// Create an unverified account plus its first code, then email the code.
    ///
    /// A delivery failure is returned to the caller, but the account stays:
    /// the client recovers through `send_verification_code`.
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, ApiServiceError> {
        let username = input.username.trim();
        let email = normalize_email(&input.email);
        if !validate_username(username) {
            return Err(ApiServiceError::invalid_input("invalid username"));
        }
        if !validate_email(&email) {
            return Err(ApiServiceError::invalid_input("invalid email"));
        }
        if !validate_password(&input.password) {
            return Err(ApiServiceError::invalid_input(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self
            .users
            .exists_by_username_or_email(username, &email)
            .await?
        {
            return Err(ApiServiceError::UserAlreadyExists);
        }

        let role = match input.invite_code.as_deref() {
            Some(code) if !self.admin_invite_code.is_empty() && code == self.admin_invite_code => {
                UserRole::Admin
            }
            _ => UserRole::User,
        };

        let password_hash = self.hasher.hash(&input.password).await?;
        let new_user = NewUser {
            username: username.to_owned(),
            email,
            password_hash,
            role,
        };
        let new_token = NewToken::issued_now(generate_code(), self.policy.token_ttl);

        let (user, token) = self.users.create_with_token(&new_user, &new_token).await?;
        info!(user_id = user.id, role = %user.role, "user registered");

        deliver_code(
            &self.notifier,
            self.policy.notify_timeout,
            &user.email,
            &token.token,
        )
        .await?;

        Ok(RegisterOutput {
            user_id: user.id,
            role: user.role,
        })
    }
}
