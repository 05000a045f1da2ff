use std::time::Duration;

use anyhow::anyhow;
use tracing::info;

use crate::domain::repository::Notifier;
use crate::error::ApiServiceError;

/// Send `code` to `address`, bounded by `timeout`.
///
/// Both a delivery error and an elapsed timeout surface as
/// [`ApiServiceError::Notification`].
pub async fn deliver_code<N: Notifier>(
    notifier: &N,
    timeout: Duration,
    address: &str,
    code: &str,
) -> Result<(), ApiServiceError> {
    match tokio::time::timeout(timeout, notifier.send(address, code)).await {
        Ok(Ok(())) => {
            info!("verification code dispatched");
            Ok(())
        }
        Ok(Err(e)) => Err(ApiServiceError::Notification(e)),
        Err(_) => Err(ApiServiceError::Notification(anyhow!(
            "notifier timed out after {}s",
            timeout.as_secs_f32()
        ))),
    }
}
