use tracing::info;

use crate::domain::repository::VerificationTokenRepository;
use crate::error::ApiServiceError;

/// Reclaims tokens past `expires_at`; nothing else removes unredeemed codes.
pub struct DeleteExpiredTokensUseCase<T: VerificationTokenRepository> {
    pub tokens: T,
}

impl<T: VerificationTokenRepository> DeleteExpiredTokensUseCase<T> {
    pub async fn execute(&self) -> Result<u64, ApiServiceError> {
        let deleted = self.tokens.delete_expired().await?;
        if deleted > 0 {
            info!(deleted, "expired verification tokens swept");
        }
        Ok(deleted)
    }
}
