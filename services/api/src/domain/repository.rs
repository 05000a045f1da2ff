#![allow(async_fn_in_trait)]

use crate::domain::types::{
    Feedback, NewFeedback, NewRepairRequest, NewToken, NewUser, RepairFilter, RepairRequest, User,
    VerificationToken,
};
use crate::error::ApiServiceError;

/// Store of accounts. Lookups only see rows that are not soft-deleted.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiServiceError>;

    /// `true` if a live account already holds `username` or `email`.
    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, ApiServiceError>;

    /// Insert an unverified user and its first verification token atomically
    /// (same transaction). Fails with `UserAlreadyExists` on a uniqueness race.
    async fn create_with_token(
        &self,
        user: &NewUser,
        token: &NewToken,
    ) -> Result<(User, VerificationToken), ApiServiceError>;

    async fn mark_verified(&self, id: i64) -> Result<(), ApiServiceError>;

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<(), ApiServiceError>;
}

/// Store of verification / password-reset tokens.
pub trait VerificationTokenRepository: Send + Sync {
    /// Find a token by code whose `expires_at` is still in the future.
    async fn find_live(&self, code: &str) -> Result<Option<VerificationToken>, ApiServiceError>;

    /// Delete every token of `user_id` and insert `token`, atomically (same
    /// transaction), leaving exactly one outstanding token.
    async fn replace_for_user(
        &self,
        user_id: i64,
        token: &NewToken,
    ) -> Result<VerificationToken, ApiServiceError>;

    /// Delete one token. Returns `true` if a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, ApiServiceError>;

    /// Delete every token with `expires_at <= now`. Returns the number removed.
    async fn delete_expired(&self) -> Result<u64, ApiServiceError>;
}

/// Out-of-band delivery of a verification code (email today).
pub trait Notifier: Send + Sync {
    async fn send(&self, address: &str, code: &str) -> anyhow::Result<()>;
}

pub trait RepairRequestRepository: Send + Sync {
    async fn create(&self, request: &NewRepairRequest) -> Result<RepairRequest, ApiServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<RepairRequest>, ApiServiceError>;
    async fn list(&self, filter: RepairFilter) -> Result<Vec<RepairRequest>, ApiServiceError>;

    /// Persist every mutable column of `request` (matched by id).
    async fn update(&self, request: &RepairRequest) -> Result<(), ApiServiceError>;
}

pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, feedback: &NewFeedback) -> Result<Feedback, ApiServiceError>;
    async fn list_by_repair(&self, repair_id: i64) -> Result<Vec<Feedback>, ApiServiceError>;
}
