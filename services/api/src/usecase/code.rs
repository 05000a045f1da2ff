use rand::RngExt;

use crate::domain::types::VERIFICATION_CODE_BYTES;

/// Generate a verification code: `VERIFICATION_CODE_BYTES` from the thread-local
/// CSPRNG, lowercase hex.
pub fn generate_code() -> String {
    let bytes: [u8; VERIFICATION_CODE_BYTES] = rand::rng().random();
    hex::encode(bytes)
}
